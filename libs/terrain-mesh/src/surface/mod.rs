//! # Surface Meshers
//!
//! Top and bottom faces of the solid. Both share one topology generator over
//! the grid lattice and differ only in their z-function, vertex block and
//! winding:
//!
//! | Face   | z                | ids          | Winding    | Normal |
//! |--------|------------------|--------------|------------|--------|
//! | Top    | elevation(x, y)  | `[0, W·H)`   | `Forward`  | +z     |
//! | Bottom | `-thickness`     | `[W·H, 2WH)` | `Reversed` | -z     |
//!
//! ## Diagonal Rule
//!
//! Every cell is split along the same diagonal, `(x,y)`–`(x+1,y+1)`:
//!
//! ```text
//! (x,y+1) ●───● (x+1,y+1)
//!         │ ╱ │
//!         │╱  │
//! (x,y)   ●───● (x+1,y)
//! ```
//!
//! A fixed rule keeps the output identical across runs and platforms; flat
//! regions never hit floating-point ties.

use glam::DVec3;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::{HeightGrid, Lattice};
use crate::mesh::{MeshPart, PartKind};

// =============================================================================
// WINDING
// =============================================================================

/// Vertex order applied to generated triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winding {
    /// Keep the generator's order.
    Forward,
    /// Swap the last two vertices, flipping the normal.
    Reversed,
}

impl Winding {
    /// Applies this winding to a triangle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use terrain_mesh::surface::Winding;
    ///
    /// assert_eq!(Winding::Forward.orient([0, 1, 2]), [0, 1, 2]);
    /// assert_eq!(Winding::Reversed.orient([0, 1, 2]), [0, 2, 1]);
    /// ```
    #[inline]
    pub fn orient(self, [a, b, c]: [u32; 3]) -> [u32; 3] {
        match self {
            Winding::Forward => [a, b, c],
            Winding::Reversed => [a, c, b],
        }
    }
}

// =============================================================================
// TOPOLOGY GENERATOR
// =============================================================================

/// Emits the two triangles of every lattice cell, using `id` to number the
/// vertex at `(x, y)`.
///
/// Triangles come out cell by cell, row-major, as
/// `(x,y)-(x+1,y)-(x+1,y+1)` then `(x,y)-(x+1,y+1)-(x,y+1)` before winding.
pub fn cell_triangles<F>(lattice: Lattice, winding: Winding, id: F) -> Vec<[u32; 3]>
where
    F: Fn(usize, usize) -> u32,
{
    let mut triangles = Vec::with_capacity(2 * lattice.cell_count());
    for y in 0..lattice.height().saturating_sub(1) {
        for x in 0..lattice.width().saturating_sub(1) {
            let v00 = id(x, y);
            let v10 = id(x + 1, y);
            let v01 = id(x, y + 1);
            let v11 = id(x + 1, y + 1);
            triangles.push(winding.orient([v00, v10, v11]));
            triangles.push(winding.orient([v00, v11, v01]));
        }
    }
    triangles
}

/// Builds one face: the vertex block lifted by `z` plus the cell triangles.
fn mesh_surface<Z, I>(grid: &HeightGrid, kind: PartKind, winding: Winding, z: Z, id: I) -> TerrainResult<MeshPart>
where
    Z: Fn(usize, usize) -> f64,
    I: Fn(&Lattice, usize, usize) -> u32,
{
    let lattice = grid.lattice();
    if lattice.cell_count() == 0 {
        return Err(TerrainError::validation(format!(
            "cannot triangulate a {}x{} grid",
            lattice.width(),
            lattice.height()
        )));
    }

    let mut vertices = Vec::with_capacity(lattice.block_len());
    for y in 0..lattice.height() {
        for x in 0..lattice.width() {
            vertices.push(DVec3::new(x as f64, y as f64, z(x, y)));
        }
    }

    Ok(MeshPart {
        kind,
        vertices,
        triangles: cell_triangles(lattice, winding, |x, y| id(&lattice, x, y)),
    })
}

// =============================================================================
// FACES
// =============================================================================

/// Triangulates the terrain-shaped top face with upward normals.
///
/// Produces `W·H` vertices and `2(W-1)(H-1)` triangles.
///
/// # Errors
///
/// Returns [`TerrainError::Validation`] if W or H is below 2.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{surface, HeightGrid};
/// use config::constants::TerrainConfig;
///
/// let grid = HeightGrid::new(vec![vec![0.0; 3]; 3], &TerrainConfig::default()).unwrap();
/// let top = surface::top_surface(&grid).unwrap();
/// assert_eq!(top.triangle_count(), 8);
/// ```
pub fn top_surface(grid: &HeightGrid) -> TerrainResult<MeshPart> {
    mesh_surface(
        grid,
        PartKind::Top,
        Winding::Forward,
        |x, y| grid.elevation(x, y),
        Lattice::top_id,
    )
}

/// Triangulates the flat bottom face at `z = -thickness` with downward
/// normals.
///
/// # Errors
///
/// Returns [`TerrainError::Validation`] if W or H is below 2.
pub fn bottom_surface(grid: &HeightGrid) -> TerrainResult<MeshPart> {
    let floor = grid.bottom_z();
    mesh_surface(
        grid,
        PartKind::Bottom,
        Winding::Reversed,
        |_, _| floor,
        Lattice::bottom_id,
    )
}

// =============================================================================
// MESHERS
// =============================================================================

/// Mesher for the terrain-shaped top face.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopSurfaceMesher;

impl TopSurfaceMesher {
    /// See [`top_surface`].
    pub fn mesh(&self, grid: &HeightGrid) -> TerrainResult<MeshPart> {
        top_surface(grid)
    }
}

/// Mesher for the flat bottom face.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomSurfaceMesher;

impl BottomSurfaceMesher {
    /// See [`bottom_surface`].
    pub fn mesh(&self, grid: &HeightGrid) -> TerrainResult<MeshPart> {
        bottom_surface(grid)
    }
}
