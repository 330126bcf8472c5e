//! # Polygon Union
//!
//! Adapter over `i_overlay` for merging lane polygons.
//!
//! ## Pipeline
//!
//! ```text
//! world (x, y, z) → fixed-point (x, z) grid → i_overlay union → world
//! ```
//!
//! The clipper only sees the horizontal plane. Heights are restored
//! afterwards: output vertices that sit on an input vertex keep its height,
//! and vertices created at edge crossings get theirs from a height-fill
//! callback fed with the two contributing input edges.


use super::{are_lines_intersecting, line_intersection_point, point_segment_distance, signed_area};
use config::constants::GeometryConfig;
use glam::DVec3;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use std::collections::HashMap;

/// Input edge with the index of the polygon it came from.
#[derive(Debug, Clone, Copy)]
struct SourceEdge {
    polygon: usize,
    a: DVec3,
    b: DVec3,
}

/// Default height fill for a vertex created where two edges cross.
///
/// Re-solves the crossing on `a0-a1` and returns its interpolated height.
/// When the edges do not actually cross (grid snapping can move them apart)
/// the four endpoint heights are averaged.
///
/// # Example
///
/// ```rust
/// use lane_mesh::geometry::interpolate_intersection_height;
/// use glam::DVec3;
///
/// let y = interpolate_intersection_height(
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(2.0, 4.0, 0.0),
///     DVec3::new(1.0, 9.0, -1.0),
///     DVec3::new(1.0, 9.0, 1.0),
///     1.0e-4,
/// );
/// assert_eq!(y, 2.0);
/// ```
pub fn interpolate_intersection_height(
    a0: DVec3,
    a1: DVec3,
    b0: DVec3,
    b1: DVec3,
    tolerance: f64,
) -> f64 {
    if are_lines_intersecting(a0, a1, b0, b1, tolerance) {
        if let Ok(point) = line_intersection_point(a0, a1, b0, b1, tolerance) {
            return point.y;
        }
    }
    (a0.y + a1.y + b0.y + b1.y) / 4.0
}

/// Unions `polygons` with the default height fill.
///
/// The first polygon is the clip operand and the rest are subjects; the
/// operation is symmetric so the split only matters for tie-breaking
/// inside the clipper. Polygons with fewer than 3 points are ignored.
/// Returned loops have positive `(x, z)` signed area; holes of the union
/// are not returned.
pub fn union_polygons(polygons: &[Vec<DVec3>], config: &GeometryConfig) -> Vec<Vec<DVec3>> {
    let tolerance = config.tolerance;
    union_polygons_with(polygons, config, |a0, a1, b0, b1| {
        interpolate_intersection_height(a0, a1, b0, b1, tolerance)
    })
}

/// Unions `polygons`, computing new-vertex heights with `fill`.
///
/// `fill(a0, a1, b0, b1)` receives the two input edges, in world
/// coordinates, that cross at the new vertex.
pub fn union_polygons_with<F>(
    polygons: &[Vec<DVec3>],
    config: &GeometryConfig,
    fill: F,
) -> Vec<Vec<DVec3>>
where
    F: Fn(DVec3, DVec3, DVec3, DVec3) -> f64,
{
    let scale = config.fixed_point_scale;
    let usable: Vec<&Vec<DVec3>> = polygons.iter().filter(|p| p.len() >= 3).collect();

    let Some((clip, subjects)) = usable.split_first() else {
        return Vec::new();
    };

    let to_grid = |p: &DVec3| [(p.x * scale).round(), (p.z * scale).round()];
    let clip_grid: Vec<[f64; 2]> = clip.iter().map(to_grid).collect();
    let subject_grid: Vec<Vec<[f64; 2]>> = subjects
        .iter()
        .map(|poly| poly.iter().map(to_grid).collect())
        .collect();

    let shapes = subject_grid.overlay(&[clip_grid], OverlayRule::Union, FillRule::NonZero);

    let mut heights: HashMap<(i64, i64), f64> = HashMap::new();
    let mut edges: Vec<SourceEdge> = Vec::new();
    for (index, poly) in usable.iter().enumerate() {
        for (i, p) in poly.iter().enumerate() {
            heights.entry(grid_key(p.x * scale, p.z * scale)).or_insert(p.y);
            edges.push(SourceEdge {
                polygon: index,
                a: *p,
                b: poly[(i + 1) % poly.len()],
            });
        }
    }

    let mut result = Vec::with_capacity(shapes.len());
    let mut holes = 0usize;

    for shape in shapes {
        let mut contours = shape.into_iter();
        let Some(outer) = contours.next() else {
            continue;
        };
        holes += contours.count();

        if outer.len() < 3 {
            continue;
        }

        let mut loop_points: Vec<DVec3> = outer
            .iter()
            .map(|&[gx, gz]| {
                let key = grid_key(gx, gz);
                let x = key.0 as f64 / scale;
                let z = key.1 as f64 / scale;
                let y = match heights.get(&key) {
                    Some(&y) => y,
                    None => fill_height(DVec3::new(x, 0.0, z), &edges, scale, config, &fill),
                };
                DVec3::new(x, y, z)
            })
            .collect();

        if signed_area(&loop_points) < 0.0 {
            loop_points.reverse();
        }
        result.push(loop_points);
    }

    if holes > 0 {
        log::debug!("union: dropped {holes} hole contour(s)");
    }
    log::debug!("union: {} polygon(s) -> {}", usable.len(), result.len());

    result
}

#[inline]
fn grid_key(x: f64, z: f64) -> (i64, i64) {
    (x.round() as i64, z.round() as i64)
}

/// Height for an output vertex that matches no input vertex.
fn fill_height<F>(
    point: DVec3,
    edges: &[SourceEdge],
    scale: f64,
    config: &GeometryConfig,
    fill: &F,
) -> f64
where
    F: Fn(DVec3, DVec3, DVec3, DVec3) -> f64,
{
    let reach = 1.0 / scale;
    let near: Vec<&SourceEdge> = edges
        .iter()
        .filter(|e| point_segment_distance(point, e.a, e.b) <= reach)
        .collect();

    let mut first_pair = None;
    for (i, e0) in near.iter().enumerate() {
        for e1 in &near[i + 1..] {
            if e0.polygon == e1.polygon {
                continue;
            }
            if are_lines_intersecting(e0.a, e0.b, e1.a, e1.b, config.tolerance) {
                return fill(e0.a, e0.b, e1.a, e1.b);
            }
            if first_pair.is_none() {
                first_pair = Some((*e0, *e1));
            }
        }
    }

    if let Some((e0, e1)) = first_pair {
        return fill(e0.a, e0.b, e1.a, e1.b);
    }

    if let Some(edge) = near.first() {
        return height_along(edge, point);
    }

    nearest_height(point, edges)
}

fn height_along(edge: &SourceEdge, point: DVec3) -> f64 {
    let dx = edge.b.x - edge.a.x;
    let dz = edge.b.z - edge.a.z;
    let length_sq = dx * dx + dz * dz;
    if length_sq <= f64::EPSILON {
        return edge.a.y;
    }
    let t = (((point.x - edge.a.x) * dx + (point.z - edge.a.z) * dz) / length_sq).clamp(0.0, 1.0);
    edge.a.y + t * (edge.b.y - edge.a.y)
}

fn nearest_height(point: DVec3, edges: &[SourceEdge]) -> f64 {
    edges
        .iter()
        .map(|e| {
            let d = (e.a.x - point.x).powi(2) + (e.a.z - point.z).powi(2);
            (d, e.a.y)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map_or(point.y, |(_, y)| y)
}
