//! Roadside strips pushed outward from a lane boundary line.

use crate::error::MeshResult;
use crate::geometry::{are_lines_intersecting, line_intersection_point};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A boundary line point with its outward push direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub position: DVec3,
    /// Unit direction away from the road surface
    pub out_vector: DVec3,
}

impl LinePoint {
    pub fn new(position: DVec3, out_vector: DVec3) -> Self {
        Self {
            position,
            out_vector,
        }
    }

    /// Position moved `distance` along the out vector.
    #[inline]
    pub fn pushed(&self, distance: f64) -> DVec3 {
        self.position + self.out_vector * distance
    }
}

/// Builds one polygon per segment of `line`, spanning the segment and its
/// copy pushed `push_distance` outward.
///
/// Each polygon is `[p_i, p_{i-1}, pushed p_{i-1}, pushed p_i]`. When the
/// pushed edges cross (out vectors converging faster than the segment is
/// long) the strip folds, and the polygon becomes the triangle
/// `[p_i, p_{i-1}, crossing]`.
///
/// # Example
///
/// ```rust
/// use lane_mesh::pipeline::{roadside_polygons, LinePoint};
/// use glam::DVec3;
///
/// let out = DVec3::new(0.0, 0.0, -1.0);
/// let line = [
///     LinePoint::new(DVec3::new(0.0, 0.0, 0.0), out),
///     LinePoint::new(DVec3::new(4.0, 0.0, 0.0), out),
/// ];
/// let strips = roadside_polygons(&line, 1.0, 1.0e-4).unwrap();
/// assert_eq!(strips.len(), 1);
/// assert_eq!(strips[0].len(), 4);
/// ```
pub fn roadside_polygons(
    line: &[LinePoint],
    push_distance: f64,
    tolerance: f64,
) -> MeshResult<Vec<Vec<DVec3>>> {
    let mut polygons = Vec::with_capacity(line.len().saturating_sub(1));

    for pair in line.windows(2) {
        let (previous, current) = (pair[0], pair[1]);

        let v0 = current.position;
        let v1 = previous.position;
        let v2 = previous.pushed(push_distance);
        let v3 = current.pushed(push_distance);

        if are_lines_intersecting(v0, v3, v1, v2, tolerance) {
            let crossing = line_intersection_point(v0, v3, v1, v2, tolerance)?;
            polygons.push(vec![v0, v1, crossing]);
        } else {
            polygons.push(vec![v0, v1, v2, v3]);
        }
    }

    Ok(polygons)
}
