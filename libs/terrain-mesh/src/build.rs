//! # Build Coordinator
//!
//! Drives one conversion through its states and runs the three meshers in
//! parallel.
//!
//! ```text
//! Idle → Validating → Meshing → Assembling → Done
//!   └──────────┴──────────┴──────────┴──────→ Failed
//! ```
//!
//! `Meshing` spawns the top, bottom and wall meshers on a `rayon::scope`
//! over the same read-only grid and waits for all three before anything is
//! assembled. A [`BuildControl`] is consulted before entering `Validating`,
//! `Meshing` and `Assembling`; a running task is never interrupted.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use config::constants::TerrainConfig;
use tracing::{debug, field, info, info_span, warn, Span};

use crate::assembler::{MeshAssembler, MeshStats};
use crate::error::{MeshTask, TerrainError, TerrainResult};
use crate::grid::HeightGrid;
use crate::mesh::{Mesh, MeshPart};
use crate::surface::{BottomSurfaceMesher, TopSurfaceMesher};
use crate::wall::WallMesher;

// =============================================================================
// STATES
// =============================================================================

/// Lifecycle state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Not started.
    Idle,
    /// Checking grid invariants.
    Validating,
    /// Meshers running.
    Meshing,
    /// Joining parts and checking the result.
    Assembling,
    /// Mesh produced.
    Done,
    /// Build aborted; no mesh is produced.
    Failed,
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cancellation flag plus optional deadline shared with a running build.
///
/// Clones share the flag, so a clone handed to another thread can stop the
/// build at its next state boundary.
///
/// ## Example
///
/// ```rust
/// use terrain_mesh::{BuildControl, BuildCoordinator, BuildState, TerrainError};
/// use config::constants::TerrainConfig;
///
/// let control = BuildControl::new();
/// let mut coordinator = BuildCoordinator::new(TerrainConfig::default()).with_control(control.clone());
/// control.cancel();
///
/// let err = coordinator.build(vec![vec![0.0; 2]; 2]).unwrap_err();
/// assert!(matches!(err, TerrainError::Cancelled { state: BuildState::Validating }));
/// assert_eq!(coordinator.state(), BuildState::Failed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl BuildControl {
    /// Creates a control with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the build at the first boundary reached after `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops the build at the first boundary reached after `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True if the build must not enter another state.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// The closed solid.
    pub mesh: Mesh,
    /// Statistics of `mesh`.
    pub stats: MeshStats,
}

/// Runs builds and records the states each one visits.
#[derive(Debug, Clone)]
pub struct BuildCoordinator {
    config: TerrainConfig,
    control: BuildControl,
    state: BuildState,
    history: Vec<BuildState>,
}

impl BuildCoordinator {
    /// Creates an idle coordinator.
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            control: BuildControl::new(),
            state: BuildState::Idle,
            history: vec![BuildState::Idle],
        }
    }

    /// Attaches a cancellation control.
    #[must_use]
    pub fn with_control(mut self, control: BuildControl) -> Self {
        self.control = control;
        self
    }

    /// Current state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// States visited by the last build, starting with `Idle`.
    pub fn history(&self) -> &[BuildState] {
        &self.history
    }

    /// Builds a solid from raw rows, applying the coordinator's
    /// configuration while validating.
    ///
    /// # Errors
    ///
    /// Any [`TerrainError`]; the coordinator ends in [`BuildState::Failed`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use terrain_mesh::{BuildCoordinator, BuildState};
    /// use config::constants::TerrainConfig;
    ///
    /// let mut coordinator = BuildCoordinator::new(TerrainConfig::new(1.0, 1.0).unwrap());
    /// let output = coordinator.build(vec![vec![0.0; 3]; 3]).unwrap();
    /// assert_eq!(output.mesh.triangle_count(), 32);
    /// assert_eq!(
    ///     coordinator.history(),
    ///     &[BuildState::Idle, BuildState::Validating, BuildState::Meshing, BuildState::Assembling, BuildState::Done]
    /// );
    /// ```
    pub fn build(&mut self, rows: Vec<Vec<f64>>) -> TerrainResult<BuildOutput> {
        let config = self.config;
        self.run(move || HeightGrid::new(rows, &config).map(Cow::Owned), mesh_parts)
    }

    /// Builds a solid from an existing grid. The grid is re-validated.
    ///
    /// # Errors
    ///
    /// Any [`TerrainError`]; the coordinator ends in [`BuildState::Failed`].
    pub fn build_grid(&mut self, grid: &HeightGrid) -> TerrainResult<BuildOutput> {
        self.run(|| grid.validate().map(|()| Cow::Borrowed(grid)), mesh_parts)
    }

    fn run<'g, V, M>(&mut self, validate: V, mesh: M) -> TerrainResult<BuildOutput>
    where
        V: FnOnce() -> TerrainResult<Cow<'g, HeightGrid>>,
        M: FnOnce(&HeightGrid) -> TerrainResult<Parts>,
    {
        self.state = BuildState::Idle;
        self.history = vec![BuildState::Idle];

        let span = info_span!("terrain_build", width = field::Empty, height = field::Empty);
        let _enter = span.enter();

        match self.run_states(validate, mesh, &span) {
            Ok(output) => {
                self.transition(BuildState::Done);
                info!(
                    vertices = output.stats.vertex_count,
                    triangles = output.stats.triangle_count,
                    volume = output.stats.volume,
                    "terrain build complete"
                );
                Ok(output)
            }
            Err(err) => {
                self.transition(BuildState::Failed);
                warn!(error = %err, "terrain build failed");
                Err(err)
            }
        }
    }

    fn run_states<'g, V, M>(&mut self, validate: V, mesh: M, span: &Span) -> TerrainResult<BuildOutput>
    where
        V: FnOnce() -> TerrainResult<Cow<'g, HeightGrid>>,
        M: FnOnce(&HeightGrid) -> TerrainResult<Parts>,
    {
        self.checkpoint(BuildState::Validating)?;
        let grid = validate()?;
        span.record("width", grid.width());
        span.record("height", grid.height());

        self.checkpoint(BuildState::Meshing)?;
        let (top, bottom, walls) = mesh(&*grid)?;

        self.checkpoint(BuildState::Assembling)?;
        let (mesh, stats) =
            MeshAssembler::new(grid.lattice(), self.config.validate_manifold).assemble(top, bottom, walls)?;
        Ok(BuildOutput { mesh, stats })
    }

    fn checkpoint(&mut self, next: BuildState) -> TerrainResult<()> {
        if self.control.should_stop() {
            return Err(TerrainError::Cancelled { state: next });
        }
        self.transition(next);
        Ok(())
    }

    fn transition(&mut self, next: BuildState) {
        debug!(from = ?self.state, to = ?next, "build state transition");
        self.state = next;
        self.history.push(next);
    }
}

// =============================================================================
// TASK DISPATCH
// =============================================================================

/// Top surface, bottom surface and the four walls, in assembly order.
type Parts = (MeshPart, MeshPart, Vec<MeshPart>);

fn mesh_parts(grid: &HeightGrid) -> TerrainResult<Parts> {
    dispatch(
        || TopSurfaceMesher.mesh(grid),
        || BottomSurfaceMesher.mesh(grid),
        || WallMesher.mesh(grid),
    )
}

/// Runs the three meshers concurrently and waits for all of them.
///
/// Results are inspected in top, bottom, walls order after the barrier, so
/// the reported error does not depend on which task finished first.
fn dispatch<FT, FB, FW>(top: FT, bottom: FB, walls: FW) -> TerrainResult<Parts>
where
    FT: FnOnce() -> TerrainResult<MeshPart> + Send,
    FB: FnOnce() -> TerrainResult<MeshPart> + Send,
    FW: FnOnce() -> TerrainResult<Vec<MeshPart>> + Send,
{
    let mut top_result = None;
    let mut bottom_result = None;
    let mut walls_result = None;

    rayon::scope(|s| {
        s.spawn(|_| top_result = Some(run_task(MeshTask::Top, top)));
        s.spawn(|_| bottom_result = Some(run_task(MeshTask::Bottom, bottom)));
        s.spawn(|_| walls_result = Some(run_task(MeshTask::Walls, walls)));
    });

    let top = collect(MeshTask::Top, top_result)?;
    debug!(task = %MeshTask::Top, triangles = top.triangle_count(), "mesher finished");
    let bottom = collect(MeshTask::Bottom, bottom_result)?;
    debug!(task = %MeshTask::Bottom, triangles = bottom.triangle_count(), "mesher finished");
    let walls = collect(MeshTask::Walls, walls_result)?;
    debug!(
        task = %MeshTask::Walls,
        triangles = walls.iter().map(MeshPart::triangle_count).sum::<usize>(),
        "mesher finished"
    );
    Ok((top, bottom, walls))
}

/// Runs one task, turning a panic into [`TerrainError::Task`].
fn run_task<T, F>(task: MeshTask, f: F) -> TerrainResult<T>
where
    F: FnOnce() -> TerrainResult<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TerrainError::task(task, panic_message(payload.as_ref()))),
    }
}

fn collect<T>(task: MeshTask, result: Option<TerrainResult<T>>) -> TerrainResult<T> {
    result.unwrap_or_else(|| Err(TerrainError::task(task, "task did not report a result")))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PartKind;

    fn config() -> TerrainConfig {
        TerrainConfig::new(1.0, 1.0).unwrap()
    }

    fn flat(width: usize, height: usize) -> Vec<Vec<f64>> {
        vec![vec![0.0; width]; height]
    }

    #[test]
    fn test_build_visits_all_states() {
        let mut coordinator = BuildCoordinator::new(config());
        assert_eq!(coordinator.state(), BuildState::Idle);

        let output = coordinator.build(flat(4, 3)).unwrap();
        assert_eq!(output.mesh.triangle_count(), 4 * 3 * 2 + 4 * 3 + 4 * 2);
        assert_eq!(
            coordinator.history(),
            &[
                BuildState::Idle,
                BuildState::Validating,
                BuildState::Meshing,
                BuildState::Assembling,
                BuildState::Done,
            ]
        );
    }

    #[test]
    fn test_validation_failure_never_meshes() {
        let mut coordinator = BuildCoordinator::new(config());
        let err = coordinator.build(vec![vec![0.0]]).unwrap_err();
        assert!(matches!(err, TerrainError::Validation { .. }));
        assert_eq!(
            coordinator.history(),
            &[BuildState::Idle, BuildState::Validating, BuildState::Failed]
        );
    }

    #[test]
    fn test_cancelled_before_start() {
        let control = BuildControl::new();
        control.cancel();
        let mut coordinator = BuildCoordinator::new(config()).with_control(control);
        let err = coordinator.build(flat(2, 2)).unwrap_err();
        assert!(matches!(err, TerrainError::Cancelled { state: BuildState::Validating }));
        assert_eq!(coordinator.history(), &[BuildState::Idle, BuildState::Failed]);
    }

    #[test]
    fn test_expired_deadline() {
        let control = BuildControl::new().with_deadline(Instant::now());
        assert!(control.should_stop());
        assert!(!control.is_cancelled());

        let mut coordinator = BuildCoordinator::new(config()).with_control(control);
        assert!(matches!(
            coordinator.build(flat(3, 3)),
            Err(TerrainError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_cancel_during_meshing_stops_before_assembly() {
        let control = BuildControl::new();
        let mut coordinator = BuildCoordinator::new(config()).with_control(control.clone());
        let grid = HeightGrid::new(flat(3, 3), &config()).unwrap();

        let err = coordinator
            .run(
                || Ok(Cow::Borrowed(&grid)),
                |grid| {
                    let parts = mesh_parts(grid);
                    control.cancel();
                    parts
                },
            )
            .unwrap_err();

        assert!(matches!(err, TerrainError::Cancelled { state: BuildState::Assembling }));
        assert_eq!(
            coordinator.history(),
            &[
                BuildState::Idle,
                BuildState::Validating,
                BuildState::Meshing,
                BuildState::Failed,
            ]
        );
    }

    #[test]
    fn test_generous_timeout_completes() {
        let control = BuildControl::new().with_timeout(Duration::from_secs(3600));
        let mut coordinator = BuildCoordinator::new(config()).with_control(control);
        assert!(coordinator.build(flat(3, 3)).is_ok());
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let control = BuildControl::new();
        let clone = control.clone();
        clone.cancel();
        assert!(control.is_cancelled());
    }

    #[test]
    fn test_coordinator_is_reusable() {
        let mut coordinator = BuildCoordinator::new(config());
        assert!(coordinator.build(vec![vec![0.0]]).is_err());
        assert!(coordinator.build(flat(2, 2)).is_ok());
        assert_eq!(coordinator.state(), BuildState::Done);
        assert_eq!(coordinator.history().len(), 5);
    }

    #[test]
    fn test_build_grid_matches_build() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]];
        let grid = HeightGrid::new(rows.clone(), &config()).unwrap();
        let mut coordinator = BuildCoordinator::new(config());
        let from_grid = coordinator.build_grid(&grid).unwrap();
        let from_rows = coordinator.build(rows).unwrap();
        assert_eq!(from_grid, from_rows);
    }

    #[test]
    fn test_dispatch_reports_panicking_task() {
        let err = dispatch(
            || Ok(MeshPart::new(PartKind::Top)),
            || Ok(MeshPart::new(PartKind::Bottom)),
            || -> TerrainResult<Vec<MeshPart>> { panic!("strip index out of bounds") },
        )
        .unwrap_err();
        match err {
            TerrainError::Task { task, message } => {
                assert_eq!(task, MeshTask::Walls);
                assert!(message.contains("strip index"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_reports_first_failure_in_fixed_order() {
        let err = dispatch(
            || Ok(MeshPart::new(PartKind::Top)),
            || Err(TerrainError::validation("bottom failed")),
            || Err(TerrainError::validation("walls failed")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bottom failed"));
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "task panicked");
    }
}
