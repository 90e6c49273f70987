//! # Height Grid
//!
//! The validated input of one conversion: a rectangular W×H matrix of
//! elevations plus the thickness of the solid below the z = 0 plane.
//!
//! ## Layout
//!
//! Samples are stored row-major. Row `y` (0..H) runs along the x axis, so the
//! sample `rows[y][x]` sits at model-space `(x, y)`.
//!
//! ```text
//!  y=H-1  ● ● ● ●      North (xy)
//!         ● ● ● ●
//!  y=0    ● ● ● ●      South (yx)
//!        x=0   x=W-1
//!      West (xx)  East (yy)
//! ```

use config::constants::{TerrainConfig, MAX_TRIANGLES, MAX_VERTICES, MIN_GRID_DIMENSION};
use glam::DVec3;

use crate::error::{TerrainError, TerrainResult};

// =============================================================================
// LATTICE
// =============================================================================

/// Index space of a W×H grid and the global vertex numbering shared by every
/// mesher.
///
/// Top vertices occupy ids `[0, W·H)`, bottom vertices `[W·H, 2·W·H)`. Wall
/// strips reference these ids and never create vertices of their own, so the
/// corners of the solid are the same vertex records in every part.
///
/// ## Example
///
/// ```rust
/// use terrain_mesh::Lattice;
///
/// let lattice = Lattice::new(3, 2);
/// assert_eq!(lattice.top_id(2, 1), 5);
/// assert_eq!(lattice.bottom_id(0, 0), 6);
/// assert_eq!(lattice.vertex_count(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lattice {
    width: usize,
    height: usize,
}

impl Lattice {
    /// Creates the lattice for a `width × height` grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of samples along x (W).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along y (H).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Vertices in one face block (W·H).
    #[inline]
    pub fn block_len(&self) -> usize {
        self.width * self.height
    }

    /// Total vertices of the assembled solid (2·W·H).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        2 * self.block_len()
    }

    /// Number of grid cells, `(W-1)·(H-1)`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width.saturating_sub(1) * self.height.saturating_sub(1)
    }

    /// Id of the top-face vertex at `(x, y)`.
    #[inline]
    pub fn top_id(&self, x: usize, y: usize) -> u32 {
        (y * self.width + x) as u32
    }

    /// Id of the bottom-face vertex at `(x, y)`.
    #[inline]
    pub fn bottom_id(&self, x: usize, y: usize) -> u32 {
        (self.block_len() + y * self.width + x) as u32
    }

    /// Expected triangle count of the closed solid:
    /// `4(W-1)(H-1) + 4(W-1) + 4(H-1)`.
    #[must_use]
    pub fn solid_triangle_count(&self) -> usize {
        let cells_x = self.width.saturating_sub(1);
        let cells_y = self.height.saturating_sub(1);
        4 * cells_x * cells_y + 4 * cells_x + 4 * cells_y
    }
}

// =============================================================================
// HEIGHT GRID
// =============================================================================

/// Validated, immutable elevation matrix plus thickness.
///
/// ## Example
///
/// ```rust
/// use terrain_mesh::HeightGrid;
/// use config::constants::TerrainConfig;
///
/// let config = TerrainConfig::new(1.0, 1.0).unwrap();
/// let grid = HeightGrid::new(vec![vec![0.0, 1.0], vec![2.0, 3.0]], &config).unwrap();
/// assert_eq!(grid.width(), 2);
/// assert_eq!(grid.elevation(1, 0), 1.0);
/// assert_eq!(grid.bottom_z(), -1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    samples: Vec<f64>,
    thickness: f64,
}

impl HeightGrid {
    /// Builds a grid from row-major rows, applying the configured vertical
    /// scale and optional row flip.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Validation`] if the grid is empty, smaller than
    /// 2×2, not rectangular, too large, contains non-finite samples or samples
    /// at or below the bottom plane, and [`TerrainError::Config`] if the
    /// configuration is invalid.
    ///
    /// Every sample must lie strictly above `-thickness`. Terrain that dips
    /// below sea level needs a `thickness` larger than its deepest sample.
    pub fn new(rows: Vec<Vec<f64>>, config: &TerrainConfig) -> TerrainResult<Self> {
        let config = TerrainConfig::new(config.thickness, config.vertical_scale)?
            .with_flip_rows(config.flip_rows);

        if rows.is_empty() || rows.iter().all(Vec::is_empty) {
            return Err(TerrainError::validation("height grid is empty"));
        }

        let height = rows.len();
        let width = rows[0].len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(TerrainError::validation(format!(
                "height grid is not rectangular: row {index} has {} samples, expected {width}",
                row.len()
            )));
        }

        let mut rows = rows;
        if config.flip_rows {
            rows.reverse();
        }
        let samples: Vec<f64> = rows
            .iter()
            .flatten()
            .map(|z| z * config.vertical_scale)
            .collect();

        Self::from_samples(width, height, samples, config.thickness)
    }

    /// Builds a grid from an already scaled row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`HeightGrid::new`], plus a sample buffer whose
    /// length is not `width * height`.
    pub fn from_samples(
        width: usize,
        height: usize,
        samples: Vec<f64>,
        thickness: f64,
    ) -> TerrainResult<Self> {
        let grid = Self {
            width,
            height,
            samples,
            thickness,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Checks every grid invariant.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Validation`] describing the first violation.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.width < MIN_GRID_DIMENSION || self.height < MIN_GRID_DIMENSION {
            return Err(TerrainError::validation(format!(
                "height grid must be at least {MIN_GRID_DIMENSION}x{MIN_GRID_DIMENSION} samples, got {}x{}",
                self.width, self.height
            )));
        }
        let vertex_count = self
            .width
            .checked_mul(self.height)
            .and_then(|block| block.checked_mul(2))
            .filter(|&count| count <= MAX_VERTICES)
            .ok_or_else(|| {
                TerrainError::validation(format!(
                    "height grid {}x{} exceeds the limit of {MAX_VERTICES} solid vertices",
                    self.width, self.height
                ))
            })?;
        // Bounded by the vertex limit, so the lattice arithmetic cannot overflow
        if self.lattice().solid_triangle_count() > MAX_TRIANGLES {
            return Err(TerrainError::validation(format!(
                "height grid {}x{} exceeds the limit of {MAX_TRIANGLES} solid triangles",
                self.width, self.height
            )));
        }
        if self.samples.len() != vertex_count / 2 {
            return Err(TerrainError::validation(format!(
                "sample buffer holds {} values, expected {}x{}",
                self.samples.len(),
                self.width,
                self.height
            )));
        }
        if !self.thickness.is_finite() || self.thickness <= 0.0 {
            return Err(TerrainError::validation(format!(
                "thickness must be positive and finite, got {}",
                self.thickness
            )));
        }

        let floor = self.bottom_z();
        for (index, &z) in self.samples.iter().enumerate() {
            let (x, y) = (index % self.width, index / self.width);
            if !z.is_finite() {
                return Err(TerrainError::validation(format!(
                    "elevation at ({x}, {y}) is not finite: {z}"
                )));
            }
            if z <= floor {
                return Err(TerrainError::validation(format!(
                    "elevation {z} at ({x}, {y}) does not lie above the bottom plane z = {floor}"
                )));
            }
        }
        Ok(())
    }

    /// Number of samples along x (W).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along y (H).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth of the solid below z = 0.
    #[inline]
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// z coordinate of the flat bottom face.
    #[inline]
    pub fn bottom_z(&self) -> f64 {
        -self.thickness
    }

    /// Elevation sample at `(x, y)`.
    #[inline]
    pub fn elevation(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.width + x]
    }

    /// Row-major sample buffer.
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Vertex numbering for this grid.
    #[inline]
    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.width, self.height)
    }

    /// Top-face position of the sample at `(x, y)`.
    #[inline]
    pub fn top_position(&self, x: usize, y: usize) -> DVec3 {
        DVec3::new(x as f64, y as f64, self.elevation(x, y))
    }

    /// Bottom-face position below the sample at `(x, y)`.
    #[inline]
    pub fn bottom_position(&self, x: usize, y: usize) -> DVec3 {
        DVec3::new(x as f64, y as f64, self.bottom_z())
    }

    /// Lowest and highest elevation.
    pub fn elevation_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| {
                (lo.min(z), hi.max(z))
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_config() -> TerrainConfig {
        TerrainConfig::new(1.0, 1.0).unwrap()
    }

    #[test]
    fn test_lattice_numbering() {
        let lattice = Lattice::new(4, 3);
        assert_eq!(lattice.block_len(), 12);
        assert_eq!(lattice.top_id(0, 0), 0);
        assert_eq!(lattice.top_id(3, 2), 11);
        assert_eq!(lattice.bottom_id(0, 0), 12);
        assert_eq!(lattice.bottom_id(3, 2), 23);
        assert_eq!(lattice.cell_count(), 6);
    }

    #[test]
    fn test_solid_triangle_count() {
        assert_eq!(Lattice::new(2, 2).solid_triangle_count(), 12);
        assert_eq!(Lattice::new(3, 3).solid_triangle_count(), 32);
        assert_eq!(Lattice::new(5, 2).solid_triangle_count(), 16 + 16 + 4);
    }

    #[test]
    fn test_grid_row_major() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]];
        let grid = HeightGrid::new(rows, &unit_config()).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.elevation(2, 0), 2.0);
        assert_eq!(grid.elevation(0, 1), 3.0);
        assert_eq!(grid.top_position(1, 1), DVec3::new(1.0, 1.0, 4.0));
        assert_eq!(grid.bottom_position(1, 1), DVec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_grid_vertical_scale_and_flip() {
        let config = TerrainConfig::new(2.0, 0.5).unwrap().with_flip_rows(true);
        let rows = vec![vec![2.0, 4.0], vec![6.0, 8.0]];
        let grid = HeightGrid::new(rows, &config).unwrap();
        assert_eq!(grid.samples(), &[3.0, 4.0, 1.0, 2.0]);
        assert_eq!(grid.thickness(), 2.0);
    }

    #[test]
    fn test_grid_rejects_empty() {
        assert!(matches!(
            HeightGrid::new(Vec::new(), &unit_config()),
            Err(TerrainError::Validation { .. })
        ));
        assert!(matches!(
            HeightGrid::new(vec![Vec::new(), Vec::new()], &unit_config()),
            Err(TerrainError::Validation { .. })
        ));
    }

    #[test]
    fn test_grid_rejects_small() {
        let err = HeightGrid::new(vec![vec![0.0, 0.0]], &unit_config()).unwrap_err();
        assert!(err.to_string().contains("at least 2x2"));
        let err = HeightGrid::new(vec![vec![0.0], vec![0.0]], &unit_config()).unwrap_err();
        assert!(err.to_string().contains("got 1x2"));
    }

    #[test]
    fn test_grid_rejects_ragged_rows() {
        let rows = vec![vec![0.0, 0.0], vec![0.0, 0.0, 0.0]];
        let err = HeightGrid::new(rows, &unit_config()).unwrap_err();
        assert!(err.to_string().contains("row 1 has 3 samples"));
    }

    #[test]
    fn test_grid_rejects_bad_thickness() {
        let err = HeightGrid::from_samples(2, 2, vec![0.0; 4], 0.0).unwrap_err();
        assert!(matches!(err, TerrainError::Validation { .. }));

        let config = TerrainConfig {
            thickness: -1.0,
            ..TerrainConfig::default()
        };
        let err = HeightGrid::new(vec![vec![0.0; 2]; 2], &config).unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)));
    }

    #[test]
    fn test_grid_rejects_non_finite_samples() {
        let rows = vec![vec![0.0, f64::NAN], vec![0.0, 0.0]];
        let err = HeightGrid::new(rows, &unit_config()).unwrap_err();
        assert!(err.to_string().contains("(1, 0)"));
    }

    #[test]
    fn test_grid_rejects_samples_below_floor() {
        let rows = vec![vec![0.0, 0.0], vec![-1.0, 0.0]];
        let err = HeightGrid::new(rows, &unit_config()).unwrap_err();
        assert!(err.to_string().contains("bottom plane"));

        // Negative elevations above the floor are fine
        let rows = vec![vec![0.0, 0.0], vec![-0.5, 0.0]];
        assert!(HeightGrid::new(rows, &unit_config()).is_ok());
    }

    #[test]
    fn test_grid_rejects_mismatched_buffer() {
        let err = HeightGrid::from_samples(3, 3, vec![0.0; 8], 1.0).unwrap_err();
        assert!(err.to_string().contains("expected 3x3"));
    }

    #[test]
    fn test_grid_rejects_oversized() {
        let side = 2300;
        let err = HeightGrid::from_samples(side, side, vec![0.0; side * side], 1.0).unwrap_err();
        assert!(err.to_string().contains("solid vertices"));
    }

    #[test]
    fn test_grid_rejects_overflowing_dimensions() {
        let side = 1usize << (usize::BITS / 2 + 1);
        let err = HeightGrid::from_samples(side, side, Vec::new(), 1.0).unwrap_err();
        assert!(matches!(err, TerrainError::Validation { .. }));
        assert!(err.to_string().contains("solid vertices"));

        // W·H fits but 2·W·H does not
        let err = HeightGrid::from_samples(usize::MAX / 4 + 1, 2, Vec::new(), 1.0).unwrap_err();
        assert!(err.to_string().contains("solid vertices"));
    }

    #[test]
    fn test_elevation_range() {
        let rows = vec![vec![3.0, -0.25], vec![7.5, 0.0]];
        let grid = HeightGrid::new(rows, &unit_config()).unwrap();
        assert_eq!(grid.elevation_range(), (-0.25, 7.5));
    }
}
