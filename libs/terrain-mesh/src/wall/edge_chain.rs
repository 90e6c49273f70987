//! # Edge Chains
//!
//! Boundary vertex sequences the wall strips are ruled between.

use config::constants::MIN_GRID_DIMENSION;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::Lattice;

use super::BoundarySide;

/// Ordered vertex ids along one grid boundary: the top chain plus its twin
/// bottom chain at the same `(x, y)` positions.
///
/// Both chains run in increasing free index (x for row edges, y for column
/// edges).
///
/// ## Example
///
/// ```rust
/// use terrain_mesh::{BoundarySide, EdgeChain, Lattice};
///
/// let chain = EdgeChain::from_lattice(BoundarySide::East, Lattice::new(3, 2)).unwrap();
/// assert_eq!(chain.top(), &[2, 5]);
/// assert_eq!(chain.bottom(), &[8, 11]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeChain {
    side: BoundarySide,
    top: Vec<u32>,
    bottom: Vec<u32>,
}

impl EdgeChain {
    /// Creates a chain from explicit id sequences.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Validation`] if the two chains differ in length
    /// or hold fewer than 2 vertices.
    pub fn new(side: BoundarySide, top: Vec<u32>, bottom: Vec<u32>) -> TerrainResult<Self> {
        if top.len() != bottom.len() {
            return Err(TerrainError::validation(format!(
                "{side} edge chain mismatch: {} top vertices, {} bottom vertices",
                top.len(),
                bottom.len()
            )));
        }
        if top.len() < 2 {
            return Err(TerrainError::validation(format!(
                "{side} edge chain needs at least 2 vertices, got {}",
                top.len()
            )));
        }
        Ok(Self { side, top, bottom })
    }

    /// Reads the boundary ids of `side` off the lattice numbering.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Validation`] if the lattice is smaller than
    /// 2×2.
    pub fn from_lattice(side: BoundarySide, lattice: Lattice) -> TerrainResult<Self> {
        let (w, h) = (lattice.width(), lattice.height());
        if w < MIN_GRID_DIMENSION || h < MIN_GRID_DIMENSION {
            return Err(TerrainError::validation(format!(
                "cannot build {side} edge chain on a {w}x{h} grid"
            )));
        }
        let coords: Vec<(usize, usize)> = match side {
            BoundarySide::South => (0..w).map(|x| (x, 0)).collect(),
            BoundarySide::East => (0..h).map(|y| (w - 1, y)).collect(),
            BoundarySide::North => (0..w).map(|x| (x, h - 1)).collect(),
            BoundarySide::West => (0..h).map(|y| (0, y)).collect(),
        };
        Self::new(
            side,
            coords.iter().map(|&(x, y)| lattice.top_id(x, y)).collect(),
            coords.iter().map(|&(x, y)| lattice.bottom_id(x, y)).collect(),
        )
    }

    /// Boundary this chain runs along.
    #[inline]
    pub fn side(&self) -> BoundarySide {
        self.side
    }

    /// Top-face vertex ids.
    #[inline]
    pub fn top(&self) -> &[u32] {
        &self.top
    }

    /// Bottom-face vertex ids.
    #[inline]
    pub fn bottom(&self) -> &[u32] {
        &self.bottom
    }

    /// Number of vertices in each chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.top.len()
    }

    /// True if the chain holds no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }
}
