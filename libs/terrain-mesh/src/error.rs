//! # Error Types
//!
//! Error types for terrain solid construction. All errors are explicit and
//! provide enough context to tell an input problem from a mesher defect.
//!
//! ## Error Policy
//!
//! - NO partial meshes: a build yields a complete watertight solid or an error
//! - Validation errors are raised before any meshing starts
//! - Geometry errors are fatal and carry the offending edge and triangles

use std::fmt;

use config::constants::ConfigError;
use glam::DVec3;
use thiserror::Error;

use crate::build::BuildState;

// =============================================================================
// TASK NAMES
// =============================================================================

/// The three concurrent mesh-building tasks of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshTask {
    /// Terrain-shaped top face.
    Top,
    /// Flat bottom face.
    Bottom,
    /// The four skirt walls.
    Walls,
}

impl fmt::Display for MeshTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshTask::Top => "top surface",
            MeshTask::Bottom => "bottom surface",
            MeshTask::Walls => "walls",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while turning a heightfield into a solid.
///
/// ## Example
///
/// ```rust
/// use terrain_mesh::{HeightGrid, TerrainError};
/// use config::constants::TerrainConfig;
///
/// match HeightGrid::new(vec![vec![1.0]], &TerrainConfig::default()) {
///     Err(TerrainError::Validation { message }) => assert!(message.contains("at least")),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Malformed input grid or edge chain, detected before meshing.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// The assembled mesh is not a closed manifold.
    ///
    /// This signals a mesher defect, not bad input, and is never retried.
    #[error("Geometry error: {message} (edge {}->{}, triangles {triangles:?})", .edge.0, .edge.1)]
    Geometry {
        /// Description of the violated invariant.
        message: String,
        /// Vertex ids of the offending edge.
        edge: (u32, u32),
        /// Positions of the edge endpoints, when they exist.
        positions: Option<[DVec3; 2]>,
        /// Indices of the triangles referencing the edge.
        triangles: Vec<usize>,
    },

    /// A part mesh does not fit the shared vertex layout: wrong vertex block
    /// size, missing or misplaced part, or an out-of-range index.
    ///
    /// Like [`TerrainError::Geometry`], this is a mesher defect.
    #[error("Geometry error: {part} {message}")]
    Layout {
        /// Part that broke the layout.
        part: String,
        /// What did not match.
        message: String,
    },

    /// One of the concurrent mesh-building tasks failed unexpectedly.
    #[error("Task '{task}' failed: {message}")]
    Task {
        /// Which task failed.
        task: MeshTask,
        /// Panic payload or error description.
        message: String,
    },

    /// The build was cancelled between two states.
    #[error("Build cancelled before entering {state:?}")]
    Cancelled {
        /// The state the coordinator was about to enter.
        state: BuildState,
    },

    /// Invalid build configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O failure while reading or writing a mesh file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed STL content.
    #[error("Invalid STL: {0}")]
    Stl(String),
}

impl TerrainError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a geometry error for an edge without position context.
    pub fn geometry(message: impl Into<String>, edge: (u32, u32), triangles: Vec<usize>) -> Self {
        Self::Geometry {
            message: message.into(),
            edge,
            positions: None,
            triangles,
        }
    }

    /// Creates a layout mismatch error for a named part.
    pub fn layout(part: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Layout {
            part: part.into(),
            message: message.into(),
        }
    }

    /// True for watertightness and layout failures, which signal a mesher
    /// defect rather than bad input.
    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry { .. } | Self::Layout { .. })
    }

    /// Creates a task failure error.
    pub fn task(task: MeshTask, message: impl Into<String>) -> Self {
        Self::Task {
            task,
            message: message.into(),
        }
    }

    /// Creates an STL format error.
    pub fn stl(message: impl Into<String>) -> Self {
        Self::Stl(message.into())
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display messages.
    #[test]
    fn test_error_display() {
        let err = TerrainError::validation("grid is empty");
        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("grid is empty"));

        let err = TerrainError::geometry("open edge", (3, 7), vec![12]);
        let text = err.to_string();
        assert!(text.contains("3->7"));
        assert!(text.contains("[12]"));

        let err = TerrainError::task(MeshTask::Walls, "boom");
        assert!(err.to_string().contains("walls"));
    }

    #[test]
    fn test_geometry_classification() {
        assert!(TerrainError::geometry("open edge", (0, 1), vec![0]).is_geometry());
        assert!(TerrainError::layout("top surface", "has 3 vertices").is_geometry());
        assert!(!TerrainError::validation("empty").is_geometry());
    }

    #[test]
    fn test_config_error_converts() {
        let err: TerrainError = ConfigError::InvalidThickness(0.0).into();
        assert!(matches!(err, TerrainError::Config(_)));
    }

    /// Test error types are Send + Sync for crossing task boundaries.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TerrainError>();
    }
}
