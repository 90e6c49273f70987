//! # Config Crate
//!
//! Centralized configuration constants for the heightfield-to-solid pipeline.
//! All magic numbers and tunable parameters are defined here so the mesher,
//! the STL serializer and the CLI agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{TerrainConfig, DEFAULT_THICKNESS, MIN_GRID_DIMENSION};
//!
//! let cfg = TerrainConfig::default();
//! assert_eq!(cfg.thickness, DEFAULT_THICKNESS);
//!
//! // A grid needs at least one cell in each direction
//! assert_eq!(MIN_GRID_DIMENSION, 2);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Immutable Input**: Build parameters travel as one validated value,
//!   never as process-wide state
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
