//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON_TOLERANCE > 0.0, "EPSILON_TOLERANCE must be positive");
}

#[test]
fn test_round_trip_tolerance_covers_f32_rounding() {
    // Binary STL stores f32; grid-sized coordinates must survive the cast
    let value = 1234.5678_f64;
    let drift = (value - f64::from(value as f32)).abs();
    assert!(drift < ROUND_TRIP_TOLERANCE * 1.0e3);
    assert!(ROUND_TRIP_TOLERANCE >= EPSILON_TOLERANCE);
}

// =============================================================================
// GRID TESTS
// =============================================================================

#[test]
fn test_min_grid_dimension_spans_one_cell() {
    assert_eq!(MIN_GRID_DIMENSION, 2);
}

#[test]
fn test_default_thickness_matches_print_default() {
    assert_eq!(DEFAULT_THICKNESS, 10.0);
}

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn test_vertex_limit_fits_u32_ids() {
    assert!((MAX_VERTICES as u64) < u64::from(u32::MAX));
}

#[test]
fn test_triangle_limit_covers_vertex_limit() {
    // A closed W×H solid has roughly twice as many triangles as vertices
    assert!(MAX_TRIANGLES >= 2 * MAX_VERTICES);
}

// =============================================================================
// STL TESTS
// =============================================================================

#[test]
fn test_stl_record_size() {
    // normal + 3 vertices, 3 f32 each, plus u16 attribute count
    assert_eq!(STL_TRIANGLE_RECORD_SIZE, 4 * 3 * 4 + 2);
    assert_eq!(STL_HEADER_SIZE, 80);
}

#[test]
fn test_solid_name_fits_header() {
    assert!(STL_SOLID_NAME.len() < STL_HEADER_SIZE);
}
