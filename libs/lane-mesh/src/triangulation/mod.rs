//! # Ear-Clipping Triangulation
//!
//! Triangulates simple polygons in the `(x, z)` plane.
//!
//! ## Algorithm
//!
//! 1. Link the polygon into a ring (reversed when it winds clockwise)
//! 2. Mark reflex vertices; an ear is a convex vertex whose triangle holds
//!    no live reflex vertex
//! 3. Repeatedly clip the ear whose triangle has the shortest longest edge,
//!    then re-check only its two neighbours
//! 4. If no ear is left, clip the polygon's convex hull instead (once)
//!
//! Emitted triangles are `(ear, previous, next)`, which winds clockwise for
//! a counter-clockwise ring.

mod delaunay;


pub use delaunay::triangulate_delaunay;

use crate::error::{MeshError, MeshResult, Stage};
use crate::geometry::{convex_hull_indices, is_point_in_triangle, is_triangle_clockwise, signed_area};
use config::constants::GeometryConfig;
use glam::DVec3;

/// Ring node used while clipping. Links are node ids.
#[derive(Debug, Clone, Copy)]
struct RingVertex {
    /// Index into the caller's point list
    point: usize,
    previous: usize,
    next: usize,
    is_reflex: bool,
}

/// Working set of one ear-clipping run.
struct Ring<'a> {
    points: &'a [DVec3],
    nodes: Vec<RingVertex>,
    live: Vec<usize>,
    ears: Vec<usize>,
}

impl<'a> Ring<'a> {
    fn new(points: &'a [DVec3], order: &[usize]) -> Self {
        let n = order.len();
        let nodes = order
            .iter()
            .enumerate()
            .map(|(i, &point)| RingVertex {
                point,
                previous: (i + n - 1) % n,
                next: (i + 1) % n,
                is_reflex: false,
            })
            .collect();

        let mut ring = Self {
            points,
            nodes,
            live: (0..n).collect(),
            ears: Vec::new(),
        };
        for node in 0..n {
            ring.mark_if_reflex(node);
        }
        for node in 0..n {
            ring.add_if_ear(node);
        }
        ring
    }

    #[inline]
    fn position(&self, node: usize) -> DVec3 {
        self.points[self.nodes[node].point]
    }

    fn corners(&self, node: usize) -> (DVec3, DVec3, DVec3) {
        let v = self.nodes[node];
        (
            self.position(v.previous),
            self.position(node),
            self.position(v.next),
        )
    }

    fn mark_if_reflex(&mut self, node: usize) {
        let (prev, v, next) = self.corners(node);
        self.nodes[node].is_reflex = is_triangle_clockwise(prev, v, next);
    }

    fn add_if_ear(&mut self, node: usize) {
        if self.nodes[node].is_reflex {
            return;
        }

        let (prev, v, next) = self.corners(node);
        let blocked = self.live.iter().any(|&other| {
            self.nodes[other].is_reflex && is_point_in_triangle(prev, v, next, self.position(other))
        });

        if !blocked {
            self.ears.push(node);
        }
    }

    /// Ear with the shortest longest edge; first one wins on ties.
    fn best_ear(&self) -> Option<usize> {
        let mut best = None;
        let mut min_edge = f64::MAX;

        for (i, &node) in self.ears.iter().enumerate() {
            let (prev, v, next) = self.corners(node);
            let longest = v.distance(prev).max(v.distance(next)).max(prev.distance(next));
            if longest < min_edge {
                min_edge = longest;
                best = Some(i);
            }
        }

        best
    }

    fn triangle(&self, node: usize) -> [usize; 3] {
        let v = self.nodes[node];
        [
            v.point,
            self.nodes[v.previous].point,
            self.nodes[v.next].point,
        ]
    }

    fn clip(&mut self, ear_slot: usize) -> [usize; 3] {
        let node = self.ears.remove(ear_slot);
        let triangle = self.triangle(node);
        let RingVertex { previous, next, .. } = self.nodes[node];

        self.live.retain(|&n| n != node);
        self.nodes[previous].next = next;
        self.nodes[next].previous = previous;

        self.mark_if_reflex(previous);
        self.mark_if_reflex(next);

        self.ears.retain(|&n| n != previous && n != next);
        self.add_if_ear(previous);
        self.add_if_ear(next);

        triangle
    }
}

/// Triangulates a simple polygon by ear clipping.
///
/// Returns `N - 2` triangles as index triples into `points`. Exactly three
/// points always produce one triangle, even when collinear. Clockwise
/// polygons are traversed in reverse so both windings work.
///
/// # Errors
///
/// - `DegeneratePolygon` for fewer than 3 points, or when neither the
///   polygon nor its convex hull yields an ear
/// - `IterationLimitExceeded` when clipping does not finish within
///   `config.iteration_limit` steps
///
/// # Example
///
/// ```rust
/// use lane_mesh::triangulate;
/// use config::constants::GeometryConfig;
/// use glam::DVec3;
///
/// let square = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(4.0, 0.0, 0.0),
///     DVec3::new(4.0, 0.0, 4.0),
///     DVec3::new(0.0, 0.0, 4.0),
/// ];
/// let triangles = triangulate(&square, &GeometryConfig::default()).unwrap();
/// assert_eq!(triangles.len(), 2);
/// ```
pub fn triangulate(points: &[DVec3], config: &GeometryConfig) -> MeshResult<Vec<[usize; 3]>> {
    if points.len() < 3 {
        return Err(MeshError::degenerate(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    if signed_area(points) < 0.0 {
        order.reverse();
    }

    ear_clip(points, &order, false, config)
}

fn ear_clip(
    points: &[DVec3],
    order: &[usize],
    on_hull: bool,
    config: &GeometryConfig,
) -> MeshResult<Vec<[usize; 3]>> {
    if order.len() == 3 {
        return Ok(vec![[order[0], order[1], order[2]]]);
    }

    let mut ring = Ring::new(points, order);
    let mut triangles = Vec::with_capacity(order.len().saturating_sub(2));
    let mut iteration = 0usize;

    loop {
        if ring.live.len() == 3 {
            triangles.push(ring.triangle(ring.live[0]));
            break;
        }

        let Some(slot) = ring.best_ear() else {
            if on_hull {
                return Err(MeshError::degenerate(
                    "cannot triangulate polygon or its convex hull",
                ));
            }

            log::warn!("Unsupported polygon shape found, falling back to convex hull");
            let hull = convex_hull_indices(points, config)?;
            return ear_clip(points, &hull, true, config);
        };

        triangles.push(ring.clip(slot));

        iteration += 1;
        if iteration > config.iteration_limit {
            return Err(MeshError::iteration_limit(
                Stage::EarClipping,
                config.iteration_limit,
            ));
        }
    }

    Ok(triangles)
}
