//! Centralized configuration values shared across the terrain pipeline.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Numerical tolerance used for geometric comparisons (volumes, normals).
///
/// # Examples
/// ```
/// use config::constants::EPSILON_TOLERANCE;
/// assert!(EPSILON_TOLERANCE < 1.0e-6);
/// ```
pub const EPSILON_TOLERANCE: f64 = 1.0e-9;

/// Maximum coordinate drift accepted after writing a mesh to STL and reading
/// it back.
///
/// # Examples
/// ```
/// use config::constants::ROUND_TRIP_TOLERANCE;
/// assert!((1.0_f64 - (1.0_f32 as f64)).abs() < ROUND_TRIP_TOLERANCE);
/// ```
pub const ROUND_TRIP_TOLERANCE: f64 = 1.0e-6;

// =============================================================================
// GRID CONSTANTS
// =============================================================================

/// Smallest accepted grid width or height. Two samples span one cell.
///
/// # Examples
/// ```
/// use config::constants::MIN_GRID_DIMENSION;
/// let cells = MIN_GRID_DIMENSION - 1;
/// assert_eq!(cells, 1);
/// ```
pub const MIN_GRID_DIMENSION: usize = 2;

/// Default depth of the solid below the z = 0 reference plane.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_THICKNESS;
/// assert!(DEFAULT_THICKNESS > 0.0);
/// ```
pub const DEFAULT_THICKNESS: f64 = 10.0;

/// Default multiplier applied to every elevation sample.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_VERTICAL_SCALE;
/// assert_eq!(DEFAULT_VERTICAL_SCALE, 1.0);
/// ```
pub const DEFAULT_VERTICAL_SCALE: f64 = 1.0;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum number of vertices an assembled solid may hold.
///
/// A W×H grid produces `2·W·H` vertices, so this bounds the grid size and
/// keeps every vertex id inside `u32`.
///
/// # Examples
/// ```
/// use config::constants::MAX_VERTICES;
/// assert!((MAX_VERTICES as u64) < u32::MAX as u64);
/// ```
pub const MAX_VERTICES: usize = 10_000_000;

/// Maximum number of triangles an assembled solid may hold.
pub const MAX_TRIANGLES: usize = 20_000_000;

// =============================================================================
// STL FRAMING
// =============================================================================

/// Size of the free-form header that opens a binary STL file.
pub const STL_HEADER_SIZE: usize = 80;

/// Size of one binary STL facet record: normal, three vertices, attribute.
///
/// # Examples
/// ```
/// use config::constants::STL_TRIANGLE_RECORD_SIZE;
/// assert_eq!(STL_TRIANGLE_RECORD_SIZE, 12 * 4 + 2);
/// ```
pub const STL_TRIANGLE_RECORD_SIZE: usize = 50;

/// Solid name written into ASCII STL files and binary headers.
pub const STL_SOLID_NAME: &str = "terrain";

// =============================================================================
// BUILD CONFIGURATION
// =============================================================================

/// Immutable, validated parameters for one heightfield-to-solid conversion.
///
/// The value is passed into the height grid constructor; nothing in the
/// pipeline reads process-wide state.
///
/// # Examples
/// ```
/// use config::constants::TerrainConfig;
/// let config = TerrainConfig::default();
/// assert!(config.thickness > 0.0);
/// assert!(config.validate_manifold);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainConfig {
    /// Depth of the flat bottom face below z = 0.
    pub thickness: f64,
    /// Multiplier applied to every elevation sample before meshing.
    pub vertical_scale: f64,
    /// Reverse row order so raster row 0 lands on the far (max y) edge.
    pub flip_rows: bool,
    /// Run the edge-adjacency watertightness check after assembly.
    pub validate_manifold: bool,
}

impl TerrainConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// thickness and vertical scale.
    ///
    /// # Examples
    /// ```
    /// use config::constants::TerrainConfig;
    /// let cfg = TerrainConfig::new(2.5, 0.5).expect("valid config");
    /// assert_eq!(cfg.thickness, 2.5);
    /// assert!(TerrainConfig::new(0.0, 1.0).is_err());
    /// ```
    pub fn new(thickness: f64, vertical_scale: f64) -> Result<Self, ConfigError> {
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(ConfigError::InvalidThickness(thickness));
        }
        if !vertical_scale.is_finite() || vertical_scale <= 0.0 {
            return Err(ConfigError::InvalidVerticalScale(vertical_scale));
        }
        Ok(Self {
            thickness,
            vertical_scale,
            ..Self::default()
        })
    }

    /// Returns a copy with row flipping switched on or off.
    ///
    /// # Examples
    /// ```
    /// use config::constants::TerrainConfig;
    /// assert!(TerrainConfig::default().with_flip_rows(true).flip_rows);
    /// ```
    #[must_use]
    pub fn with_flip_rows(self, flip_rows: bool) -> Self {
        Self { flip_rows, ..self }
    }

    /// Returns a copy with the post-assembly manifold check switched on or off.
    #[must_use]
    pub fn with_manifold_check(self, validate_manifold: bool) -> Self {
        Self {
            validate_manifold,
            ..self
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_THICKNESS,
            vertical_scale: DEFAULT_VERTICAL_SCALE,
            flip_rows: false,
            validate_manifold: true,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Raised when thickness is zero, negative or not finite.
    InvalidThickness(f64),
    /// Raised when the vertical scale is zero, negative or not finite.
    InvalidVerticalScale(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidThickness(value) => {
                write!(f, "thickness must be positive and finite: {value}")
            }
            ConfigError::InvalidVerticalScale(value) => {
                write!(f, "vertical_scale must be positive and finite: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
