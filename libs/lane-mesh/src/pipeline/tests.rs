//! # Pipeline Tests

use super::*;
use crate::geometry::signed_area;
use approx::assert_relative_eq;

fn p(x: f64, z: f64) -> DVec3 {
    DVec3::new(x, 0.0, z)
}

fn config() -> GeometryConfig {
    GeometryConfig::default()
}

fn rect(x0: f64, z0: f64, x1: f64, z1: f64) -> Vec<DVec3> {
    vec![p(x0, z0), p(x1, z0), p(x1, z1), p(x0, z1)]
}

fn collinear() -> Vec<DVec3> {
    vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)]
}

fn octagon() -> Vec<DVec3> {
    (0..8)
        .map(|i| {
            let t = i as f64 / 8.0 * std::f64::consts::TAU;
            p(2.0 * t.cos(), 2.0 * t.sin())
        })
        .collect()
}

// =============================================================================
// TRIANGULATE / OPTIMIZE
// =============================================================================

#[test]
fn test_triangulate_polygons_welds_result() {
    let soup = triangulate_polygons(&[rect(0.0, 0.0, 4.0, 4.0)], "lane_1", &config())
        .unwrap()
        .unwrap();

    assert_eq!(soup.vertex_count(), 4);
    assert_eq!(soup.triangle_count(), 2);
    assert_relative_eq!(soup.area(), 16.0);
    for n in soup.normals().unwrap() {
        assert_relative_eq!(n.y, 1.0);
    }
}

#[test]
fn test_triangulate_polygons_skips_bad_polygons() {
    let polygons = vec![
        rect(0.0, 0.0, 4.0, 4.0),
        vec![p(0.0, 0.0), p(1.0, 1.0)],
        collinear(),
    ];
    let soup = triangulate_polygons(&polygons, "lane_2", &config())
        .unwrap()
        .unwrap();
    assert_eq!(soup.triangle_count(), 2);
}

#[test]
fn test_triangulate_polygons_nothing_survives() {
    let result = triangulate_polygons(&[collinear()], "lane_3", &config()).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_optimize_polygon_keeps_square_outline() {
    let square = rect(0.0, 0.0, 4.0, 4.0);
    let outline = optimize_polygon(&square, "lane_4", &config()).unwrap().unwrap();

    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].len(), 4);
    assert_relative_eq!(signed_area(&outline[0]).abs(), 16.0);
    for corner in &square {
        assert!(outline[0].contains(corner));
    }
}

#[test]
fn test_optimize_polygon_degenerate_hull_gives_none() {
    let outline = optimize_polygon(&collinear(), "lane_5", &config()).unwrap();
    assert!(outline.is_none());
}

#[test]
fn test_optimize_polygons_joins_neighbours() {
    let polygons = vec![rect(0.0, 0.0, 2.0, 2.0), rect(2.0, 0.0, 4.0, 2.0)];
    let outline = optimize_polygons(&polygons, "lane_6", &config()).unwrap().unwrap();

    // The shared edge disappears but its end points stay on the outline.
    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].len(), 6);
    assert_relative_eq!(signed_area(&outline[0]).abs(), 8.0);
}

#[test]
fn test_optimize_polygons_empty() {
    assert!(optimize_polygons(&[], "lane_7", &config()).unwrap().is_none());
}

#[test]
fn test_merge_polygons_overlap() {
    let merged = merge_polygons(
        &[rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)],
        &config(),
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].len(), 8);
    assert_relative_eq!(signed_area(&merged[0]), 7.0, epsilon = 1e-9);
}

// =============================================================================
// REPAIR
// =============================================================================

#[test]
fn test_fix_bow_tie() {
    let mut polygon = vec![p(0.0, 0.0), p(4.0, 4.0), p(4.0, 0.0), p(0.0, 4.0)];
    assert!(fix_self_intersections(&mut polygon, "lane_8", 1.0e-4));
    assert_eq!(polygon, rect(0.0, 0.0, 4.0, 4.0));
}

#[test]
fn test_fix_leaves_simple_polygon() {
    let mut polygon = rect(0.0, 0.0, 4.0, 4.0);
    assert!(!fix_self_intersections(&mut polygon, "lane_9", 1.0e-4));
    assert_eq!(polygon, rect(0.0, 0.0, 4.0, 4.0));

    let mut triangle = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
    assert!(!fix_self_intersections(&mut triangle, "lane_9", 1.0e-4));
}

#[test]
fn test_fix_needs_two_passes() {
    let tangled = vec![
        p(3.0, 6.0),
        p(0.0, 2.0),
        p(5.0, 6.0),
        p(6.0, 3.0),
        p(2.0, 5.0),
        p(3.0, 2.0),
    ];

    let mut polygon = tangled.clone();
    assert!(fix_self_intersections(&mut polygon, "lane_10", 1.0e-4));
    assert_eq!(
        polygon,
        vec![
            p(2.0, 5.0),
            p(0.0, 2.0),
            p(5.0, 6.0),
            p(6.0, 3.0),
            p(3.0, 2.0),
            p(3.0, 6.0),
        ]
    );

    // A single pass cannot settle it, so the original order comes back.
    let mut polygon = tangled.clone();
    assert!(!repair_with_limit(&mut polygon, "lane_10", 1.0e-4, 1));
    assert_eq!(polygon, tangled);
}

// =============================================================================
// ROADSIDE
// =============================================================================

#[test]
fn test_roadside_quad() {
    let out = DVec3::new(0.0, 0.0, -1.0);
    let line = [
        LinePoint::new(p(0.0, 0.0), out),
        LinePoint::new(p(4.0, 0.0), out),
        LinePoint::new(p(8.0, 0.0), out),
    ];
    let strips = roadside_polygons(&line, 1.0, 1.0e-4).unwrap();

    assert_eq!(strips.len(), 2);
    assert_eq!(
        strips[0],
        vec![p(4.0, 0.0), p(0.0, 0.0), p(0.0, -1.0), p(4.0, -1.0)]
    );
}

#[test]
fn test_roadside_folded_strip_is_triangle() {
    let line = [
        LinePoint::new(p(0.0, 0.0), DVec3::new(1.0, 0.0, -1.0)),
        LinePoint::new(p(4.0, 0.0), DVec3::new(-1.0, 0.0, -1.0)),
    ];
    let strips = roadside_polygons(&line, 4.0, 1.0e-4).unwrap();

    assert_eq!(strips, vec![vec![p(4.0, 0.0), p(0.0, 0.0), p(2.0, -2.0)]]);
}

#[test]
fn test_roadside_short_line() {
    let line = [LinePoint::new(p(0.0, 0.0), DVec3::X)];
    assert!(roadside_polygons(&line, 1.0, 1.0e-4).unwrap().is_empty());
}

// =============================================================================
// BATCH
// =============================================================================

#[test]
fn test_mesh_batch_mixed_outcomes() {
    let requests = vec![
        MeshRequest::new("lane_1", vec![rect(0.0, 0.0, 4.0, 4.0)]),
        MeshRequest::new(
            "intersection_1",
            vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)],
        )
        .merged(),
        MeshRequest::new("lane_2", vec![collinear()]),
    ];

    let outcomes = mesh_batch(&requests, &config()).unwrap();

    assert_eq!(outcomes.len(), 3);
    let names: Vec<&str> = outcomes.iter().map(|o| o.name()).collect();
    assert_eq!(names, ["lane_1", "intersection_1", "lane_2"]);

    assert_relative_eq!(outcomes[0].soup().unwrap().area(), 16.0);
    assert_relative_eq!(outcomes[1].soup().unwrap().area(), 7.0, epsilon = 1e-9);

    match &outcomes[2] {
        MeshOutcome::Skipped { reason, .. } => {
            assert!(!reason.is_fatal());
            assert!(matches!(reason.root(), MeshError::DegeneratePolygon { .. }));
        }
        other => panic!("expected skip, got {other:?}"),
    }
}

#[test]
fn test_mesh_batch_repairs_bow_tie() {
    let bow_tie = vec![p(0.0, 0.0), p(4.0, 4.0), p(4.0, 0.0), p(0.0, 4.0)];
    let requests = vec![MeshRequest::new("lane_3", vec![bow_tie]).repaired()];

    let outcomes = mesh_batch(&requests, &config()).unwrap();
    assert_relative_eq!(outcomes[0].soup().unwrap().area(), 16.0);
}

#[test]
fn test_mesh_request_drops_repeated_points() {
    // Closing point repeated, plus a doubled corner.
    let lane = vec![
        p(0.0, 0.0),
        p(4.0, 0.0),
        p(4.0, 0.0),
        p(4.0, 4.0),
        p(0.0, 4.0),
        p(0.0, 0.0),
    ];
    let outcome = mesh_request(&MeshRequest::new("lane_11", vec![lane]), &config()).unwrap();

    let soup = outcome.soup().unwrap();
    assert_eq!(soup.vertex_count(), 4);
    assert_eq!(soup.triangle_count(), 2);
    assert_relative_eq!(soup.area(), 16.0);
}

#[test]
fn test_mesh_batch_meshes_roundabout() {
    let roundabout: Vec<DVec3> = (0..29)
        .map(|i| {
            let t = i as f64 / 29.0 * std::f64::consts::TAU;
            p(10.0 * t.cos(), 10.0 * t.sin())
        })
        .collect();
    let requests = vec![
        MeshRequest::new("lane_1", vec![rect(0.0, 0.0, 4.0, 4.0)]),
        MeshRequest::new("roundabout", vec![roundabout]),
    ];

    let outcomes = mesh_batch(&requests, &config()).unwrap();

    assert_eq!(outcomes[1].name(), "roundabout");
    assert_eq!(outcomes[1].soup().unwrap().triangle_count(), 27);
}

#[test]
fn test_mesh_batch_fatal_error_aborts() {
    let cfg = config().with_iteration_limit(1).unwrap();
    let requests = vec![MeshRequest::new("lane_7", vec![octagon()])];

    let err = mesh_batch(&requests, &cfg).unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().starts_with("lane_7: "));
    assert!(matches!(
        err.root(),
        MeshError::IterationLimitExceeded { .. }
    ));
}

#[test]
fn test_request_defaults_from_json() {
    let request: MeshRequest =
        serde_json::from_str(r#"{"name": "lane_1", "polygons": [[[0.0, 0.0, 0.0]]]}"#).unwrap();
    assert_eq!(request.name, "lane_1");
    assert_eq!(request.polygons, vec![vec![DVec3::ZERO]]);
    assert!(!request.merge);
    assert!(!request.repair);
}
