//! # Mesh Assembler
//!
//! Joins the top, bottom and wall parts into one [`Mesh`] and optionally
//! proves the result is a closed, consistently oriented 2-manifold.
//!
//! ## Assembly Order
//!
//! Vertices: top block, then bottom block, so positions land on their
//! [`Lattice`] ids. Triangles: top, bottom, then walls South, East, North,
//! West. The order is fixed regardless of which mesher finished first.
//!
//! ## Manifold Check
//!
//! Every triangle contributes three directed edges. The mesh is watertight
//! when each directed edge appears exactly once and its reverse appears
//! exactly once, i.e. every undirected edge has two incident triangles with
//! opposite orientation.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use serde::Serialize;
use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::Lattice;
use crate::mesh::{Mesh, MeshPart, PartKind};
use crate::wall::BoundarySide;

// =============================================================================
// MESH STATISTICS
// =============================================================================

/// Summary of an assembled mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshStats {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of distinct undirected edges.
    pub edge_count: usize,
    /// Number of triangles.
    pub triangle_count: usize,
    /// `V - E + F`; 2 for a closed genus-0 solid.
    pub euler_characteristic: i64,
    /// Axis-aligned bounding box (min, max).
    pub bounds: (DVec3, DVec3),
    /// Signed enclosed volume.
    pub volume: f64,
}

impl MeshStats {
    /// Computes statistics without checking manifoldness.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let edges: HashSet<(u32, u32)> = mesh
            .triangles()
            .iter()
            .flat_map(|&tri| directed_edges(tri))
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        Self::with_edge_count(mesh, edges.len())
    }

    fn with_edge_count(mesh: &Mesh, edge_count: usize) -> Self {
        let euler = mesh.vertex_count() as i64 - edge_count as i64 + mesh.triangle_count() as i64;
        Self {
            vertex_count: mesh.vertex_count(),
            edge_count,
            triangle_count: mesh.triangle_count(),
            euler_characteristic: euler,
            bounds: mesh.bounding_box(),
            volume: mesh.signed_volume(),
        }
    }
}

#[inline]
fn directed_edges([a, b, c]: [u32; 3]) -> [(u32, u32); 3] {
    [(a, b), (b, c), (c, a)]
}

// =============================================================================
// MANIFOLD CHECK
// =============================================================================

/// Verifies that every undirected edge of `mesh` is shared by exactly two
/// triangles, once in each direction.
///
/// Edges are keyed on vertex ids; the shared vertex layout guarantees one id
/// per position, so no floating-point comparison is involved.
///
/// # Errors
///
/// Returns [`TerrainError::Geometry`] naming the first offending edge in
/// triangle order, with its endpoint positions and the triangles that
/// reference it.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{assembler::check_manifold, Mesh};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::ZERO);
/// mesh.add_vertex(DVec3::X);
/// mesh.add_vertex(DVec3::Y);
/// mesh.add_triangle(0, 1, 2);
/// assert!(check_manifold(&mesh).unwrap_err().is_geometry());
/// ```
pub fn check_manifold(mesh: &Mesh) -> TerrainResult<MeshStats> {
    let vertex_count = mesh.vertex_count() as u32;
    let mut directed: HashMap<(u32, u32), Vec<usize>> = HashMap::with_capacity(3 * mesh.triangle_count());

    for (index, &tri) in mesh.triangles().iter().enumerate() {
        if let Some(&id) = tri.iter().find(|&&id| id >= vertex_count) {
            return Err(TerrainError::geometry(
                format!("vertex id {id} out of range ({vertex_count} vertices)"),
                (id, id),
                vec![index],
            ));
        }
        for edge in directed_edges(tri) {
            if edge.0 == edge.1 {
                return Err(edge_error(mesh, "degenerate triangle repeats a vertex", edge, vec![index]));
            }
            directed.entry(edge).or_default().push(index);
        }
    }

    for &tri in mesh.triangles() {
        for (a, b) in directed_edges(tri) {
            let forward = directed.get(&(a, b)).map_or(&[][..], Vec::as_slice);
            let backward = directed.get(&(b, a)).map_or(&[][..], Vec::as_slice);

            if forward.len() > 1 {
                let triangles = forward.iter().chain(backward).copied().collect();
                return Err(edge_error(
                    mesh,
                    "edge used more than once in the same direction",
                    (a, b),
                    triangles,
                ));
            }
            match backward.len() {
                1 => {}
                0 => {
                    return Err(edge_error(mesh, "open edge has a single incident triangle", (a, b), forward.to_vec()));
                }
                _ => {
                    let triangles = forward.iter().chain(backward).copied().collect();
                    return Err(edge_error(mesh, "edge shared by more than two triangles", (a, b), triangles));
                }
            }
        }
    }

    let stats = MeshStats::with_edge_count(mesh, directed.len() / 2);
    debug!(
        edges = stats.edge_count,
        euler = stats.euler_characteristic,
        "manifold check passed"
    );
    Ok(stats)
}

fn edge_error(mesh: &Mesh, message: &str, edge: (u32, u32), triangles: Vec<usize>) -> TerrainError {
    TerrainError::Geometry {
        message: message.to_string(),
        edge,
        positions: Some([mesh.vertex(edge.0), mesh.vertex(edge.1)]),
        triangles,
    }
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Concatenates part meshes in fixed order.
#[derive(Debug, Clone, Copy)]
pub struct MeshAssembler {
    lattice: Lattice,
    validate: bool,
}

impl MeshAssembler {
    /// Creates an assembler for the given lattice. With `validate` set, the
    /// manifold check runs on the joined mesh.
    pub fn new(lattice: Lattice, validate: bool) -> Self {
        Self { lattice, validate }
    }

    /// Joins the parts into one mesh.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Layout`] if a part is missing, misplaced, owns
    /// the wrong number of vertices or references an id outside the lattice,
    /// and [`TerrainError::Geometry`] if validation is on and the mesh is not
    /// closed.
    pub fn assemble(
        &self,
        top: MeshPart,
        bottom: MeshPart,
        walls: Vec<MeshPart>,
    ) -> TerrainResult<(Mesh, MeshStats)> {
        let block = self.lattice.block_len();
        expect_part(&top, PartKind::Top, block)?;
        expect_part(&bottom, PartKind::Bottom, block)?;
        if walls.len() != BoundarySide::ALL.len() {
            return Err(TerrainError::layout(
                "walls",
                format!("expected {} wall parts, got {}", BoundarySide::ALL.len(), walls.len()),
            ));
        }
        for (wall, &side) in walls.iter().zip(BoundarySide::ALL.iter()) {
            expect_part(wall, PartKind::Wall(side), 0)?;
        }

        let mut mesh = Mesh::with_capacity(self.lattice.vertex_count(), self.lattice.solid_triangle_count());
        mesh.extend_vertices(&top.vertices);
        mesh.extend_vertices(&bottom.vertices);

        let vertex_count = mesh.vertex_count() as u32;
        for part in std::iter::once(&top).chain(std::iter::once(&bottom)).chain(&walls) {
            if let Some(id) = part.triangles.iter().flatten().find(|&&id| id >= vertex_count) {
                return Err(TerrainError::layout(
                    part.kind.to_string(),
                    format!("references vertex id {id} outside the {vertex_count}-vertex layout"),
                ));
            }
            mesh.extend_triangles(&part.triangles);
        }

        let stats = if self.validate {
            check_manifold(&mesh)?
        } else {
            MeshStats::from_mesh(&mesh)
        };
        Ok((mesh, stats))
    }
}

fn expect_part(part: &MeshPart, kind: PartKind, vertices: usize) -> TerrainResult<()> {
    if part.kind != kind {
        return Err(TerrainError::layout(
            kind.to_string(),
            format!("slot received a {} part", part.kind),
        ));
    }
    if part.vertices.len() != vertices {
        return Err(TerrainError::layout(
            kind.to_string(),
            format!("owns {} vertices, expected {vertices}", part.vertices.len()),
        ));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
