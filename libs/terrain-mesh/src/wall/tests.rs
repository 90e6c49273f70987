//! # Wall Mesher Tests

use super::*;
use crate::error::TerrainError;
use crate::grid::Lattice;
use config::constants::TerrainConfig;

fn grid(rows: Vec<Vec<f64>>) -> HeightGrid {
    HeightGrid::new(rows, &TerrainConfig::new(1.0, 1.0).unwrap()).unwrap()
}

fn ramp(width: usize, height: usize) -> HeightGrid {
    let rows = (0..height)
        .map(|y| (0..width).map(|x| (x * 2 + y) as f64 * 0.5).collect())
        .collect();
    grid(rows)
}

/// Position of a lattice id in the assembled solid.
fn position(grid: &HeightGrid, id: u32) -> DVec3 {
    let lattice = grid.lattice();
    let block = lattice.block_len();
    let id = id as usize;
    if id < block {
        grid.top_position(id % lattice.width(), id / lattice.width())
    } else {
        let local = id - block;
        grid.bottom_position(local % lattice.width(), local / lattice.width())
    }
}

fn normal(grid: &HeightGrid, [a, b, c]: [u32; 3]) -> DVec3 {
    let (v0, v1, v2) = (position(grid, a), position(grid, b), position(grid, c));
    (v1 - v0).cross(v2 - v0)
}

#[test]
fn test_side_labels_and_order() {
    let labels: Vec<&str> = BoundarySide::ALL.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["yx", "yy", "xy", "xx"]);
    assert_eq!(BoundarySide::West.to_string(), "west (xx)");
}

#[test]
fn test_side_windings() {
    assert_eq!(BoundarySide::South.winding(), Winding::Forward);
    assert_eq!(BoundarySide::East.winding(), Winding::Forward);
    assert_eq!(BoundarySide::North.winding(), Winding::Reversed);
    assert_eq!(BoundarySide::West.winding(), Winding::Reversed);
}

#[test]
fn test_chain_from_lattice() {
    let lattice = Lattice::new(3, 2);
    let south = EdgeChain::from_lattice(BoundarySide::South, lattice).unwrap();
    assert_eq!(south.top(), &[0, 1, 2]);
    assert_eq!(south.bottom(), &[6, 7, 8]);

    let north = EdgeChain::from_lattice(BoundarySide::North, lattice).unwrap();
    assert_eq!(north.top(), &[3, 4, 5]);

    let west = EdgeChain::from_lattice(BoundarySide::West, lattice).unwrap();
    assert_eq!(west.top(), &[0, 3]);
    assert_eq!(west.bottom(), &[6, 9]);
    assert_eq!(west.len(), 2);
}

#[test]
fn test_chain_rejects_mismatch() {
    let err = EdgeChain::new(BoundarySide::South, vec![0, 1, 2], vec![3, 4]).unwrap_err();
    assert!(matches!(err, TerrainError::Validation { .. }));
    assert!(err.to_string().contains("mismatch"));
}

#[test]
fn test_chain_rejects_short() {
    let err = EdgeChain::new(BoundarySide::East, vec![0], vec![1]).unwrap_err();
    assert!(err.to_string().contains("at least 2"));

    let err = EdgeChain::from_lattice(BoundarySide::North, Lattice::new(1, 4)).unwrap_err();
    assert!(matches!(err, TerrainError::Validation { .. }));
}

#[test]
fn test_ruled_strip_cells() {
    let chain = EdgeChain::new(BoundarySide::South, vec![0, 1], vec![4, 5]).unwrap();
    assert_eq!(ruled_strip(&chain, Winding::Forward), vec![[1, 0, 4], [1, 4, 5]]);
    assert_eq!(ruled_strip(&chain, Winding::Reversed), vec![[1, 4, 0], [1, 5, 4]]);
}

#[test]
fn test_wall_counts() {
    let walls = WallMesher.mesh(&ramp(5, 3)).unwrap();
    assert_eq!(walls.len(), 4);
    let counts: Vec<usize> = walls.iter().map(MeshPart::triangle_count).collect();
    assert_eq!(counts, vec![8, 4, 8, 4]);
}

#[test]
fn test_walls_own_no_vertices() {
    for part in WallMesher.mesh(&ramp(3, 3)).unwrap() {
        assert!(part.vertices.is_empty());
    }
}

#[test]
fn test_wall_kinds_follow_side_order() {
    let kinds: Vec<PartKind> = WallMesher
        .mesh(&ramp(2, 2))
        .unwrap()
        .iter()
        .map(|p| p.kind)
        .collect();
    let expected: Vec<PartKind> = BoundarySide::ALL.iter().map(|&s| PartKind::Wall(s)).collect();
    assert_eq!(kinds, expected);
}

#[test]
fn test_wall_normals_face_outward() {
    let g = ramp(4, 3);
    for part in WallMesher.mesh(&g).unwrap() {
        let PartKind::Wall(side) = part.kind else {
            panic!("unexpected part kind {:?}", part.kind);
        };
        for &tri in &part.triangles {
            let n = normal(&g, tri);
            assert!(n.dot(side.outward()) > 0.0, "{side} triangle {tri:?} faces inward");
            assert!(n.z.abs() < 1e-12, "{side} triangle {tri:?} is not vertical");
        }
    }
}

#[test]
fn test_wall_indices_are_boundary_ids() {
    let g = ramp(4, 4);
    let lattice = g.lattice();
    for part in WallMesher.mesh(&g).unwrap() {
        for id in part.triangles.iter().flatten() {
            let p = position(&g, *id);
            let on_boundary = p.x == 0.0
                || p.y == 0.0
                || p.x == (lattice.width() - 1) as f64
                || p.y == (lattice.height() - 1) as f64;
            assert!(on_boundary, "id {id} at {p} is interior");
        }
    }
}
