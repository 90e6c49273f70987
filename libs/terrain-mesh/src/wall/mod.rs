//! # Wall Mesher
//!
//! Vertical skirts closing the gap between the top face and the bottom face.
//! Each of the four grid boundaries gets one ruled strip between its top
//! [`EdgeChain`] and the twin bottom chain.
//!
//! ## Strip Cells
//!
//! One cell spans a step `k → k+1` along the chain and the full top-to-bottom
//! gap:
//!
//! ```text
//! T[k] ●────● T[k+1]
//!      │  ╱ │
//!      │ ╱  │
//! B[k] ●────● B[k+1]
//! ```
//!
//! `Forward` cells are `T[k+1]-T[k]-B[k]` and `T[k+1]-B[k]-B[k+1]`, which face
//! `-y` on the South chain and `+x` on the East chain. North and West chains
//! run the same direction as their opposite sides, so they use `Reversed`.
//!
//! Walls own no vertices; every index is a top or bottom lattice id, so the
//! strips meet the faces and each other on identical vertex records.

mod edge_chain;

pub use edge_chain::EdgeChain;

use std::fmt;

use glam::DVec3;

use crate::error::TerrainResult;
use crate::grid::HeightGrid;
use crate::mesh::{MeshPart, PartKind};
use crate::surface::Winding;

// =============================================================================
// BOUNDARY SIDES
// =============================================================================

/// One of the four boundaries of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundarySide {
    /// Fixed-row leading edge, `y = 0` (`yx`).
    South,
    /// Fixed-column trailing edge, `x = W-1` (`yy`).
    East,
    /// Fixed-row trailing edge, `y = H-1` (`xy`).
    North,
    /// Fixed-column leading edge, `x = 0` (`xx`).
    West,
}

impl BoundarySide {
    /// All sides in assembly order.
    pub const ALL: [BoundarySide; 4] = [
        BoundarySide::South,
        BoundarySide::East,
        BoundarySide::North,
        BoundarySide::West,
    ];

    /// Short edge label (`xx`, `xy`, `yy`, `yx`).
    pub fn label(self) -> &'static str {
        match self {
            BoundarySide::South => "yx",
            BoundarySide::East => "yy",
            BoundarySide::North => "xy",
            BoundarySide::West => "xx",
        }
    }

    /// Strip winding that turns wall normals away from the grid interior.
    pub fn winding(self) -> Winding {
        match self {
            BoundarySide::South | BoundarySide::East => Winding::Forward,
            BoundarySide::North | BoundarySide::West => Winding::Reversed,
        }
    }

    /// Unit vector pointing out of the solid through this side.
    pub fn outward(self) -> DVec3 {
        match self {
            BoundarySide::South => DVec3::NEG_Y,
            BoundarySide::East => DVec3::X,
            BoundarySide::North => DVec3::Y,
            BoundarySide::West => DVec3::NEG_X,
        }
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundarySide::South => "south",
            BoundarySide::East => "east",
            BoundarySide::North => "north",
            BoundarySide::West => "west",
        };
        write!(f, "{name} ({})", self.label())
    }
}

// =============================================================================
// RULED STRIP
// =============================================================================

/// Triangulates the strip between the top and bottom chains, two triangles
/// per step.
pub fn ruled_strip(chain: &EdgeChain, winding: Winding) -> Vec<[u32; 3]> {
    let (top, bottom) = (chain.top(), chain.bottom());
    let mut triangles = Vec::with_capacity(2 * chain.len().saturating_sub(1));
    for k in 0..chain.len().saturating_sub(1) {
        triangles.push(winding.orient([top[k + 1], top[k], bottom[k]]));
        triangles.push(winding.orient([top[k + 1], bottom[k], bottom[k + 1]]));
    }
    triangles
}

// =============================================================================
// WALL MESHER
// =============================================================================

/// Builds the four skirt walls of a grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallMesher;

impl WallMesher {
    /// Meshes one wall part per side, in [`BoundarySide::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Validation`](crate::TerrainError::Validation)
    /// if a boundary chain is malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use terrain_mesh::{HeightGrid, WallMesher};
    /// use config::constants::TerrainConfig;
    ///
    /// let grid = HeightGrid::new(vec![vec![0.0; 4]; 3], &TerrainConfig::default()).unwrap();
    /// let walls = WallMesher.mesh(&grid).unwrap();
    /// let counts: Vec<usize> = walls.iter().map(|w| w.triangle_count()).collect();
    /// assert_eq!(counts, vec![6, 4, 6, 4]);
    /// ```
    pub fn mesh(&self, grid: &HeightGrid) -> TerrainResult<Vec<MeshPart>> {
        let lattice = grid.lattice();
        BoundarySide::ALL
            .iter()
            .map(|&side| {
                let chain = EdgeChain::from_lattice(side, lattice)?;
                Ok(self.mesh_chain(&chain))
            })
            .collect()
    }

    /// Meshes a single validated chain.
    pub fn mesh_chain(&self, chain: &EdgeChain) -> MeshPart {
        MeshPart {
            kind: PartKind::Wall(chain.side()),
            vertices: Vec::new(),
            triangles: ruled_strip(chain, chain.side().winding()),
        }
    }
}

#[cfg(test)]
mod tests;
