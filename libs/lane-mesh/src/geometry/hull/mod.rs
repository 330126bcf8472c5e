//! # Convex Hull
//!
//! Gift-wrapping hull over the `(x, z)` plane.
//!
//! ## Algorithm
//!
//! 1. Start at the smallest-x point (ties within tolerance → smaller z)
//! 2. From the current point, pick the candidate with every other point on
//!    its left; points collinear with the current edge are collected
//! 3. Collinear runs are appended in order of distance from the current point
//! 4. The start point is re-admitted as a candidate from the third step on,
//!    and the walk ends when it is reached again
//!
//! Output winds counter-clockwise (positive signed area) and keeps
//! collinear boundary points.


use super::{approximately_equals, line_relative_determinant, remove_duplicates_by};
use crate::error::{MeshError, MeshResult, Stage};
use config::constants::GeometryConfig;
use glam::DVec3;

/// Computes the convex hull of `points`.
///
/// Three points are returned unchanged regardless of orientation.
///
/// # Errors
///
/// - `DegeneratePolygon` for fewer than 3 points or when the walk runs out
///   of candidates (all points collinear or coincident)
/// - `IterationLimitExceeded` when the walk does not close within
///   `config.iteration_limit` steps
///
/// # Example
///
/// ```rust
/// use lane_mesh::geometry::convex_hull;
/// use config::constants::GeometryConfig;
/// use glam::DVec3;
///
/// let points = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(2.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 1.0),
///     DVec3::new(2.0, 0.0, 2.0),
///     DVec3::new(0.0, 0.0, 2.0),
/// ];
/// let hull = convex_hull(&points, &GeometryConfig::default()).unwrap();
/// assert_eq!(hull.len(), 4);
/// ```
pub fn convex_hull(points: &[DVec3], config: &GeometryConfig) -> MeshResult<Vec<DVec3>> {
    let indices = convex_hull_indices(points, config)?;
    Ok(indices.into_iter().map(|i| points[i]).collect())
}

/// Same as [`convex_hull`] but returns indices into `points`.
pub fn convex_hull_indices(points: &[DVec3], config: &GeometryConfig) -> MeshResult<Vec<usize>> {
    if points.len() < 3 {
        return Err(MeshError::degenerate(format!(
            "convex hull requires at least 3 points, got {}",
            points.len()
        )));
    }

    if points.len() == 3 {
        return Ok(vec![0, 1, 2]);
    }

    let tolerance = config.tolerance;
    let start = find_start(points, tolerance);

    let mut remaining: Vec<usize> = (0..points.len()).filter(|&i| i != start).collect();
    let mut hull = vec![start];
    let mut current = start;
    let mut collinear: Vec<usize> = Vec::new();
    let mut iteration = 0usize;

    loop {
        if iteration == 2 {
            remaining.push(start);
        }

        let Some(&first) = remaining.first() else {
            return Err(MeshError::degenerate(
                "convex hull ran out of candidates; points are collinear or coincident",
            ));
        };

        let mut next = first;
        for &candidate in &remaining[1..] {
            let det = line_relative_determinant(points[current], points[next], points[candidate]);

            if det.abs() < tolerance {
                collinear.push(candidate);
            } else if det < 0.0 {
                next = candidate;
                collinear.clear();
            }
        }

        if collinear.is_empty() {
            hull.push(next);
            remove_value(&mut remaining, next);
            current = next;
        } else {
            collinear.push(next);
            let origin = points[current];
            collinear.sort_by(|&a, &b| {
                let da = (points[a] - origin).length_squared();
                let db = (points[b] - origin).length_squared();
                da.total_cmp(&db)
            });

            hull.extend_from_slice(&collinear);
            if let Some(&last) = collinear.last() {
                current = last;
            }
            for &point in &collinear {
                remove_value(&mut remaining, point);
            }
            collinear.clear();
        }

        if current == start {
            hull.pop();
            break;
        }

        iteration += 1;
        if iteration > config.iteration_limit {
            return Err(MeshError::iteration_limit(
                Stage::ConvexHull,
                config.iteration_limit,
            ));
        }
    }

    remove_duplicates_by(&mut hull, |&a, &b| {
        approximately_equals(points[a], points[b], tolerance)
    });
    log::debug!("convex hull: {} of {} points", hull.len(), points.len());
    Ok(hull)
}

fn find_start(points: &[DVec3], tolerance: f64) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let b = points[best];
        if p.x < b.x || ((p.x - b.x).abs() < tolerance && p.z < b.z) {
            best = i;
        }
    }
    best
}

fn remove_value(list: &mut Vec<usize>, value: usize) {
    if let Some(pos) = list.iter().position(|&v| v == value) {
        list.remove(pos);
    }
}
