//! # Mesh Data Structure
//!
//! Shared-vertex triangle mesh produced by a build, and the part meshes the
//! three mesher tasks hand to the assembler.

use std::fmt;

use config::constants::EPSILON_TOLERANCE;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::wall::BoundarySide;

// =============================================================================
// MESH
// =============================================================================

/// A triangle mesh with a shared vertex buffer and index triples.
///
/// Winding follows the right-hand rule: `(v1 - v0) × (v2 - v0)` points out of
/// the solid. Triangle order is stable across builds of the same grid.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert!(mesh.face_normal(0).z > 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Appends vertex positions.
    pub(crate) fn extend_vertices(&mut self, positions: &[DVec3]) {
        self.vertices.extend_from_slice(positions);
    }

    /// Appends index triples.
    pub(crate) fn extend_triangles(&mut self, triangles: &[[u32; 3]]) {
        self.triangles.extend_from_slice(triangles);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Returns the three corner positions of a triangle.
    pub fn triangle_positions(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Unnormalized face normal `(v1 - v0) × (v2 - v0)`.
    pub fn face_normal(&self, index: usize) -> DVec3 {
        let [v0, v1, v2] = self.triangle_positions(index);
        (v1 - v0).cross(v2 - v0)
    }

    /// Flattens the mesh into a triangle soup, one `[DVec3; 3]` per triangle.
    pub fn triangle_soup(&self) -> Vec<[DVec3; 3]> {
        (0..self.triangles.len())
            .map(|index| self.triangle_positions(index))
            .collect()
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        if self.vertices.is_empty() {
            return (DVec3::ZERO, DVec3::ZERO);
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }

        (min, max)
    }

    /// Signed volume enclosed by the mesh (divergence theorem).
    ///
    /// Positive for a closed mesh with outward-facing triangles.
    pub fn signed_volume(&self) -> f64 {
        (0..self.triangles.len())
            .map(|index| {
                let [v0, v1, v2] = self.triangle_positions(index);
                v0.dot(v1.cross(v2))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No degenerate triangles (repeated index or zero area)
    ///
    /// Returns true if valid.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().enumerate().all(|(index, tri)| {
            if tri.iter().any(|&v| v >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            self.face_normal(index).length() > EPSILON_TOLERANCE
        })
    }

    /// Exports vertices as f32 array for GPU.
    ///
    /// Returns flattened [x, y, z, x, y, z, ...] array.
    pub fn vertices_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect()
    }

    /// Exports triangle indices as u32 array for GPU.
    ///
    /// Returns flattened [i0, i1, i2, i0, i1, i2, ...] array.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

// =============================================================================
// PART MESHES
// =============================================================================

/// Which face of the solid a part mesh covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// Terrain-shaped top face.
    Top,
    /// Flat bottom face.
    Bottom,
    /// Skirt wall along one grid boundary.
    Wall(BoundarySide),
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartKind::Top => f.write_str("top surface"),
            PartKind::Bottom => f.write_str("bottom surface"),
            PartKind::Wall(side) => write!(f, "{side} wall"),
        }
    }
}

/// Output of one mesher: the vertex block it owns plus its triangles.
///
/// Triangle indices are global ids in the [`Lattice`](crate::Lattice)
/// numbering, not offsets into `vertices`. Wall parts own no vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    /// Face covered by this part.
    pub kind: PartKind,
    /// Positions of the vertex block this part owns (empty for walls).
    pub vertices: Vec<DVec3>,
    /// Index triples into the shared lattice numbering.
    pub triangles: Vec<[u32; 3]>,
}

impl MeshPart {
    /// Creates an empty part for the given face.
    pub fn new(kind: PartKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
