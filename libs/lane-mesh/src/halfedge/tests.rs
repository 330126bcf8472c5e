//! # Half-Edge Mesh Tests

use super::*;
use crate::geometry::signed_area;
use std::collections::BTreeSet;

const TOL: f64 = 1.0e-4;

fn p(x: f64, z: f64) -> DVec3 {
    DVec3::new(x, 0.0, z)
}

fn square() -> Vec<DVec3> {
    vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)]
}

fn kite() -> Vec<DVec3> {
    vec![p(0.0, 0.0), p(2.0, -1.0), p(4.0, 0.0), p(2.0, 1.0)]
}

fn first_interior(mesh: &HalfEdgeMesh) -> HalfEdgeId {
    let index = mesh
        .half_edges()
        .iter()
        .position(|h| h.opposite.is_some())
        .unwrap();
    HalfEdgeId(index as u32)
}

/// Triangles as (vertex set, non-diagonal half-edge set), order-free.
fn shape(mesh: &HalfEdgeMesh, diagonal: [HalfEdgeId; 2]) -> BTreeSet<(Vec<u32>, Vec<u32>)> {
    (0..mesh.triangle_count())
        .map(|t| {
            let mut vertices: Vec<u32> = mesh.triangles()[t].vertices().iter().map(|v| v.0).collect();
            vertices.sort_unstable();
            let mut edges: Vec<u32> = mesh
                .half_edges()
                .iter()
                .enumerate()
                .filter(|(i, h)| {
                    h.triangle == TriangleId(t as u32) && !diagonal.contains(&HalfEdgeId(*i as u32))
                })
                .map(|(i, _)| i as u32)
                .collect();
            edges.sort_unstable();
            (vertices, edges)
        })
        .collect()
}

// =============================================================================
// BUILD
// =============================================================================

#[test]
fn test_build_orients_clockwise() {
    let points = square();
    let mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();

    for tri in mesh.triangles() {
        assert!(tri.is_clockwise(&points));
    }
    assert_eq!(mesh.triangles()[0].indices(), [0, 2, 1]);
}

#[test]
fn test_build_links_cycles_and_opposites() {
    let points = square();
    let mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();

    assert_eq!(mesh.half_edge_count(), 6);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.interior_half_edge_count(), 2);
    assert_eq!(mesh.validate(), Ok(()));

    let h = mesh.half_edge(HalfEdgeId(1)).unwrap();
    assert_eq!(h.opposite, Some(HalfEdgeId(3)));
    assert_eq!(h.next, HalfEdgeId(2));
    assert_eq!(h.previous, HalfEdgeId(0));
    assert_eq!(mesh.source(HalfEdgeId(1)), VertexId(0));
}

#[test]
fn test_build_matches_coincident_copies() {
    // Separate vertex copies still pair up by position.
    let points = vec![
        p(0.0, 0.0),
        p(4.0, 0.0),
        p(4.0, 4.0),
        p(0.0, 0.0),
        p(4.0, 4.0),
        p(0.0, 4.0),
    ];
    let mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [3, 4, 5]], TOL).unwrap();
    assert_eq!(mesh.interior_half_edge_count(), 2);
    assert_eq!(mesh.validate(), Ok(()));
}

#[test]
fn test_build_rejects_bad_index() {
    let err = HalfEdgeMesh::build(&square(), &[[0, 1, 9]], TOL).unwrap_err();
    assert!(matches!(err, MeshError::InvalidOperation { .. }));
}

#[test]
fn test_half_edge_out_of_range() {
    let mesh = HalfEdgeMesh::build(&square(), &[[0, 1, 2]], TOL).unwrap();
    assert_eq!(
        mesh.half_edge(HalfEdgeId(3)),
        Err(TopologyError::InvalidHalfEdge(HalfEdgeId(3)))
    );
}

// =============================================================================
// FLIP
// =============================================================================

#[test]
fn test_flip_replaces_diagonal() {
    let points = square();
    let mut mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();
    let h = first_interior(&mesh);

    mesh.flip(h).unwrap();

    assert_eq!(mesh.validate(), Ok(()));
    assert_eq!(mesh.half_edge_count(), 6);
    assert_eq!(mesh.triangle_count(), 2);
    for tri in mesh.triangles() {
        assert!(tri.contains(VertexId(1)) && tri.contains(VertexId(3)));
        assert!(tri.is_clockwise(&points));
    }

    let o = mesh.half_edge(h).unwrap().opposite.unwrap();
    let ends: BTreeSet<u32> = [mesh.source(h).0, mesh.half_edge(h).unwrap().vertex.0].into();
    assert_eq!(ends, BTreeSet::from([1, 3]));
    assert_eq!(mesh.half_edge(o).unwrap().opposite, Some(h));
}

#[test]
fn test_double_flip_restores_structure() {
    let points = square();
    let mut mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();
    let h = first_interior(&mesh);
    let o = mesh.half_edge(h).unwrap().opposite.unwrap();
    let before = shape(&mesh, [h, o]);
    let outer_before: Vec<(VertexId, Option<HalfEdgeId>)> = mesh
        .half_edges()
        .iter()
        .enumerate()
        .filter(|(i, _)| ![h.0, o.0].contains(&(*i as u32)))
        .map(|(_, e)| (e.vertex, e.opposite))
        .collect();

    mesh.flip(h).unwrap();
    mesh.flip(h).unwrap();

    assert_eq!(mesh.validate(), Ok(()));
    assert_eq!(shape(&mesh, [h, o]), before);

    let outer_after: Vec<(VertexId, Option<HalfEdgeId>)> = mesh
        .half_edges()
        .iter()
        .enumerate()
        .filter(|(i, _)| ![h.0, o.0].contains(&(*i as u32)))
        .map(|(_, e)| (e.vertex, e.opposite))
        .collect();
    assert_eq!(outer_after, outer_before);

    // Same diagonal, walked the other way.
    let ends: BTreeSet<u32> = [mesh.source(h).0, mesh.half_edge(h).unwrap().vertex.0].into();
    assert_eq!(ends, BTreeSet::from([0, 2]));
    assert_eq!(mesh.half_edge(h).unwrap().opposite, Some(o));
}

#[test]
fn test_flip_boundary_is_rejected() {
    let mut mesh = HalfEdgeMesh::build(&square(), &[[0, 1, 2]], TOL).unwrap();
    let err = mesh.flip(HalfEdgeId(0)).unwrap_err();
    assert!(err.is_fatal());
    assert!(mesh.quad(HalfEdgeId(0)).is_none());
    assert!(!mesh.should_flip(HalfEdgeId(0), TOL));
}

#[test]
fn test_can_flip_rejects_concave_quad() {
    // Clockwise convex quad.
    assert!(can_flip(&[p(4.0, 0.0), p(2.0, -1.0), p(0.0, 0.0), p(2.0, 1.0)]));
    // Dart: the vertex at (3, 0) makes a left turn.
    assert!(!can_flip(&[p(4.0, 0.0), p(2.0, -1.0), p(3.0, 0.0), p(2.0, 1.0)]));
}

// =============================================================================
// DELAUNAY
// =============================================================================

#[test]
fn test_condition_flips_long_diagonal() {
    let points = kite();
    let mut mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();

    let flips = mesh.condition_delaunay(16, TOL).unwrap();

    assert_eq!(flips, 1);
    assert_eq!(mesh.validate(), Ok(()));
    for tri in mesh.triangles() {
        assert!(tri.contains(VertexId(1)) && tri.contains(VertexId(3)));
    }
}

#[test]
fn test_condition_leaves_cocircular_square() {
    let mut mesh = HalfEdgeMesh::build(&square(), &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();
    assert_eq!(mesh.condition_delaunay(16, TOL).unwrap(), 0);
    assert_eq!(mesh.triangle_indices(), vec![[0, 2, 1], [0, 3, 2]]);
}

#[test]
fn test_condition_settles_on_cocircular_polygon() {
    // Every quad of a regular polygon is cocircular up to rounding.
    let points: Vec<DVec3> = (0..29)
        .map(|i| {
            let t = i as f64 / 29.0 * std::f64::consts::TAU;
            p(10.0 * t.cos(), 10.0 * t.sin())
        })
        .collect();
    let fan: Vec<[usize; 3]> = (1..28).map(|i| [0, i, i + 1]).collect();
    let mut mesh = HalfEdgeMesh::build(&points, &fan, TOL).unwrap();

    assert_eq!(mesh.condition_delaunay(4, TOL).unwrap(), 0);
    assert_eq!(mesh.triangle_count(), 27);
    assert_eq!(mesh.validate(), Ok(()));
}

#[test]
fn test_in_circle_slack_scales_with_longest_side() {
    let quad = [p(0.0, 0.0), p(0.0, 3.0), p(4.0, 3.0), p(4.0, 0.0)];
    assert!((in_circle_slack(&quad, TOL) - 16.0 * TOL).abs() < 1e-12);
}

#[test]
fn test_condition_iteration_limit() {
    let mut mesh = HalfEdgeMesh::build(&kite(), &[[0, 1, 2], [0, 2, 3]], TOL).unwrap();
    let err = mesh.condition_delaunay(0, TOL).unwrap_err();
    assert!(matches!(
        err,
        MeshError::IterationLimitExceeded {
            stage: Stage::DelaunayFlip,
            limit: 0
        }
    ));
}

#[test]
fn test_condition_fan_satisfies_delaunay() {
    // Fan over a flat ellipse: most fan diagonals are bad.
    let points: Vec<DVec3> = (0..10)
        .map(|i| {
            let t = i as f64 / 10.0 * std::f64::consts::TAU;
            DVec3::new(6.0 * t.cos(), 0.0, 1.5 * t.sin())
        })
        .collect();
    let fan: Vec<[usize; 3]> = (1..9).map(|i| [0, i, i + 1]).collect();
    let mut mesh = HalfEdgeMesh::build(&points, &fan, TOL).unwrap();

    let flips = mesh.condition_delaunay(1024, TOL).unwrap();
    assert!(flips > 0);
    assert_eq!(mesh.validate(), Ok(()));
    assert_eq!(mesh.triangle_count(), 8);

    let area: f64 = mesh.triangles().iter().map(|t| t.signed_area(&points).abs()).sum();
    assert!((area - signed_area(&points)).abs() < 1e-9);

    for i in 0..mesh.half_edge_count() {
        let id = HalfEdgeId(i as u32);
        if let Some(quad) = mesh.quad(id) {
            let [v0, v1, v2, v3] = quad.map(|v| mesh.position(v));
            let quad = [v0, v1, v2, v3];
            assert!(
                in_circle_determinant(v0, v1, v2, v3) >= -in_circle_slack(&quad, TOL)
                    || !can_flip(&quad),
                "edge {i} violates the in-circle test"
            );
        }
    }
}
