//! # Planar Geometry Utilities
//!
//! Predicates and solvers over the horizontal `(x, z)` plane. Height (`y`)
//! is carried through untouched unless a solver explicitly interpolates it.
//!
//! ## Sign Conventions
//!
//! - A triangle is clockwise when its `(x, z)` signed area is `<= 0`
//!   (collinear counts as clockwise)
//! - `in_circle_determinant(v0, v1, v2, v3) < 0` means `v3` lies inside the
//!   circumcircle of the clockwise triangle `(v0, v1, v2)`

pub mod boundary;
pub mod clip;
pub mod hull;
pub mod weld;


use crate::error::{MeshError, MeshResult};
use config::constants::loop_index;
use glam::DVec3;

pub use boundary::{extract_boundary, Boundary};
pub use clip::{interpolate_intersection_height, union_polygons, union_polygons_with};
pub use hull::{convex_hull, convex_hull_indices};
pub use weld::weld_vertices;

/// Signed area of `(x, z)` triangle `(a0, a1, point)`, doubled.
///
/// Positive when `point` lies to the left of `a0 -> a1`.
#[inline]
pub fn line_relative_determinant(a0: DVec3, a1: DVec3, point: DVec3) -> f64 {
    (a0.x - point.x) * (a1.z - point.z) - (a0.z - point.z) * (a1.x - point.x)
}

/// Returns true when `(t0, t1, t2)` winds clockwise or is degenerate.
#[inline]
pub fn is_triangle_clockwise(t0: DVec3, t1: DVec3, t2: DVec3) -> bool {
    t0.x * t1.z + t2.x * t0.z + t1.x * t2.z - t0.x * t2.z - t2.x * t1.z - t1.x * t0.z <= 0.0
}

/// Signed `(x, z)` area of a closed loop (shoelace). Positive for
/// counter-clockwise loops.
pub fn signed_area(points: &[DVec3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.z - b.x * a.z
        })
        .sum();
    twice * 0.5
}

/// Componentwise comparison within `tolerance`.
#[inline]
pub fn approximately_equals(a: DVec3, b: DVec3, tolerance: f64) -> bool {
    (a - b).abs().max_element() < tolerance
}

/// Denominator shared by the segment intersection test and solver.
#[inline]
fn segment_denominator(a0: DVec3, a1: DVec3, b0: DVec3, b1: DVec3) -> f64 {
    (a1.x - a0.x) * (b1.z - b0.z) - (a1.z - a0.z) * (b1.x - b0.x)
}

/// Tests whether segments `a0-a1` and `b0-b1` cross in the `(x, z)` plane.
///
/// Near-parallel segments (`|den| < tolerance`) are reported as not
/// intersecting. Touching endpoints count as intersecting.
pub fn are_lines_intersecting(a0: DVec3, a1: DVec3, b0: DVec3, b1: DVec3, tolerance: f64) -> bool {
    let den = segment_denominator(a0, a1, b0, b1);
    if den.abs() < tolerance {
        return false;
    }

    let a = ((a0.z - b0.z) * (b1.x - b0.x) - (a0.x - b0.x) * (b1.z - b0.z)) / den;
    let b = ((a0.z - b0.z) * (a1.x - a0.x) - (a0.x - b0.x) * (a1.z - a0.z)) / den;

    (0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b)
}

/// Solves the crossing point of lines `a0-a1` and `b0-b1`.
///
/// The result lies on `a0-a1` in 3D, so its height is interpolated along the
/// first segment. Callers must check [`are_lines_intersecting`] first:
/// near-parallel input is a contract violation.
///
/// # Example
///
/// ```rust
/// use lane_mesh::geometry::line_intersection_point;
/// use glam::DVec3;
///
/// let p = line_intersection_point(
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(2.0, 2.0, 0.0),
///     DVec3::new(1.0, 5.0, -1.0),
///     DVec3::new(1.0, 5.0, 1.0),
///     1.0e-4,
/// )
/// .unwrap();
/// assert_eq!(p, DVec3::new(1.0, 1.0, 0.0));
/// ```
pub fn line_intersection_point(
    a0: DVec3,
    a1: DVec3,
    b0: DVec3,
    b1: DVec3,
    tolerance: f64,
) -> MeshResult<DVec3> {
    let den = segment_denominator(a0, a1, b0, b1);
    if den.abs() < tolerance {
        return Err(MeshError::invalid_operation(
            "lines are parallel; check are_lines_intersecting first",
        ));
    }

    let l = ((a0.z - b0.z) * (b1.x - b0.x) - (a0.x - b0.x) * (b1.z - b0.z)) / den;
    Ok(a0 + l * (a1 - a0))
}

/// Strict barycentric containment: points on an edge are outside.
pub fn is_point_in_triangle(t0: DVec3, t1: DVec3, t2: DVec3, point: DVec3) -> bool {
    let den = (t0.x - t2.x) * (t1.z - t2.z) + (t2.x - t1.x) * (t0.z - t2.z);
    let a = ((t1.z - t2.z) * (point.x - t2.x) + (t2.x - t1.x) * (point.z - t2.z)) / den;
    let b = ((t2.z - t0.z) * (point.x - t2.x) + (t0.x - t2.x) * (point.z - t2.z)) / den;
    let c = 1.0 - a - b;
    let open = |v: f64| v > 0.0 && v < 1.0;
    open(a) && open(b) && open(c)
}

/// Crossing-parity containment test.
///
/// Counts how many polygon edges cross the segment from `point` to one unit
/// past the polygon's largest-x vertex.
pub fn is_point_in_polygon(polygon: &[DVec3], point: DVec3, tolerance: f64) -> bool {
    let Some(&first) = polygon.first() else {
        return false;
    };
    let x_max = polygon
        .iter()
        .fold(first, |best, p| if p.x > best.x { *p } else { best });
    let reference = x_max + DVec3::X;

    let n = polygon.len();
    let crossings = (0..n)
        .filter(|&i| {
            are_lines_intersecting(
                point,
                reference,
                polygon[i],
                polygon[loop_index(i as isize + 1, n)],
                tolerance,
            )
        })
        .count();
    crossings % 2 != 0
}

/// In-circle determinant over the `(x, z)` plane.
///
/// Negative when `v3` lies inside the circumcircle of the clockwise
/// triangle `(v0, v1, v2)`; zero for cocircular points.
pub fn in_circle_determinant(v0: DVec3, v1: DVec3, v2: DVec3, v3: DVec3) -> f64 {
    let x03 = v0.x - v3.x;
    let x13 = v1.x - v3.x;
    let x23 = v2.x - v3.x;

    let z03 = v0.z - v3.z;
    let z13 = v1.z - v3.z;
    let z23 = v2.z - v3.z;

    let a = x03 * x03 + z03 * z03;
    let b = x13 * x13 + z13 * z13;
    let c = x23 * x23 + z23 * z23;

    x03 * z13 * c + z03 * b * x23 + a * x13 * z23 - x23 * z13 * a - z23 * b * x03 - c * x13 * z03
}

/// Drops consecutive approximately-equal points, wrapping around the loop.
///
/// Stops as soon as three or fewer points remain.
pub fn remove_duplicates(polygon: &mut Vec<DVec3>, tolerance: f64) {
    remove_duplicates_by(polygon, |a, b| approximately_equals(*a, *b, tolerance));
}

/// Loop-aware deduplication of consecutive items matching `same`.
pub(crate) fn remove_duplicates_by<T>(items: &mut Vec<T>, same: impl Fn(&T, &T) -> bool) {
    let mut i = 0;
    while i < items.len() {
        let next = loop_index(i as isize + 1, items.len());
        if same(&items[i], &items[next]) {
            items.remove(i);
        } else {
            i += 1;
        }

        if items.len() <= 3 {
            break;
        }
    }
}

/// Rejects triangles that reference a vertex past `vertex_count`.
pub(crate) fn check_indices(vertex_count: usize, triangles: &[[u32; 3]]) -> MeshResult<()> {
    let bad = triangles
        .iter()
        .flatten()
        .find(|&&i| i as usize >= vertex_count);
    match bad {
        Some(&index) => Err(MeshError::invalid_operation(format!(
            "triangle references vertex {index}, only {vertex_count} available"
        ))),
        None => Ok(()),
    }
}

/// Planar distance from `p` to the polyline `line`.
///
/// Returns the distance and the index of the end point of the closest
/// segment. The search stops at the first segment closer than
/// `snap_distance`.
pub fn point_lane_distance(p: DVec3, line: &[DVec3], snap_distance: f64) -> (f64, usize) {
    let mut vertex_index = 0;
    let mut closest = f64::MAX;

    for i in 1..line.len() {
        let dist = point_segment_distance(p, line[i - 1], line[i]);

        if dist < closest {
            vertex_index = i;
            closest = dist;
        }

        if dist < snap_distance {
            return (dist, i);
        }
    }

    (closest, vertex_index)
}

/// Planar distance from `p` to segment `a0-a1`.
pub(crate) fn point_segment_distance(p: DVec3, a0: DVec3, a1: DVec3) -> f64 {
    let ax = a1.x - a0.x;
    let az = a1.z - a0.z;
    let length_sq = ax * ax + az * az;

    if length_sq <= f64::EPSILON {
        return ((p.x - a0.x).powi(2) + (p.z - a0.z).powi(2)).sqrt();
    }

    let t = ((p.x - a0.x) * ax + (p.z - a0.z) * az) / length_sq;
    let (cx, cz) = if t < 0.0 {
        (a0.x, a0.z)
    } else if t > 1.0 {
        (a1.x, a1.z)
    } else {
        (a0.x + t * ax, a0.z + t * az)
    };

    ((p.x - cx).powi(2) + (p.z - cz).powi(2)).sqrt()
}
