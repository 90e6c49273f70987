//! # Terrain Mesh
//!
//! Turns a rectangular grid of elevation samples into a closed, watertight
//! triangle mesh ready for 3D printing: the terrain surface on top, a flat
//! bottom at `z = -thickness`, and four vertical skirt walls between them.
//!
//! ## Architecture
//!
//! ```text
//! rows + TerrainConfig → HeightGrid
//!                           ↓
//!        ┌──────────────────┼──────────────────┐
//!   top surface      bottom surface          walls     (rayon tasks)
//!        └──────────────────┼──────────────────┘
//!                           ↓
//!                    MeshAssembler → Mesh → STL / JSON
//! ```
//!
//! ## Vertex Layout
//!
//! All parts share one numbering ([`Lattice`]): top vertices are
//! `y·W + x`, bottom vertices `W·H + y·W + x`. Walls only reference those
//! ids, so seams and corners are watertight without any position matching.
//!
//! ## Usage
//!
//! ```rust
//! use terrain_mesh::build_solid;
//! use config::constants::TerrainConfig;
//!
//! let rows = vec![
//!     vec![0.0, 0.0, 0.0],
//!     vec![0.0, 5.0, 0.0],
//!     vec![0.0, 0.0, 0.0],
//! ];
//! let mesh = build_solid(rows, &TerrainConfig::new(1.0, 1.0).unwrap()).unwrap();
//! assert_eq!(mesh.vertex_count(), 18);
//! assert_eq!(mesh.triangle_count(), 32);
//! assert!((mesh.signed_volume() - 9.0).abs() < 1e-9);
//! ```

pub mod assembler;
pub mod build;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod stl;
pub mod surface;
pub mod wall;

pub use assembler::{check_manifold, MeshAssembler, MeshStats};
pub use build::{BuildControl, BuildCoordinator, BuildOutput, BuildState};
pub use error::{MeshTask, TerrainError, TerrainResult};
pub use grid::{HeightGrid, Lattice};
pub use mesh::{Mesh, MeshPart, PartKind};
pub use stl::{load_stl, read_stl, save_stl, write_stl, StlFormat};
pub use surface::{BottomSurfaceMesher, TopSurfaceMesher, Winding};
pub use wall::{BoundarySide, EdgeChain, WallMesher};

use config::constants::TerrainConfig;

/// Builds the closed solid for `rows` with the given configuration.
///
/// Convenience wrapper over [`BuildCoordinator::build`] for callers that do
/// not need statistics, state history or cancellation.
///
/// # Errors
///
/// Any [`TerrainError`] raised while validating, meshing or assembling.
pub fn build_solid(rows: Vec<Vec<f64>>, config: &TerrainConfig) -> TerrainResult<Mesh> {
    BuildCoordinator::new(*config)
        .build(rows)
        .map(|output| output.mesh)
}
