//! # Height Probe
//!
//! Re-samples outline heights against an external surface. The core never
//! calls a probe itself; map builders inject one after meshing.

use glam::DVec3;

/// Something that can report the ground height under a point.
///
/// Implementations typically cast a ray downwards from `origin` lifted
/// above the surface.
pub trait HeightProbe {
    /// Height of the surface below `origin`, or `None` when nothing is hit.
    fn probe(&self, origin: DVec3) -> Option<f64>;
}

impl<F> HeightProbe for F
where
    F: Fn(DVec3) -> Option<f64>,
{
    fn probe(&self, origin: DVec3) -> Option<f64> {
        self(origin)
    }
}

/// Rewrites `y` of every point the probe hits. Returns the hit count.
///
/// # Example
///
/// ```rust
/// use lane_mesh::project_heights;
/// use glam::DVec3;
///
/// let mut points = vec![DVec3::new(1.0, 0.0, 2.0), DVec3::new(-1.0, 0.0, 0.0)];
/// let ramp = |p: DVec3| (p.x >= 0.0).then_some(p.x * 0.5);
///
/// assert_eq!(project_heights(&mut points, &ramp), 1);
/// assert_eq!(points[0].y, 0.5);
/// assert_eq!(points[1].y, 0.0);
/// ```
pub fn project_heights<P: HeightProbe + ?Sized>(points: &mut [DVec3], probe: &P) -> usize {
    let mut hits = 0;
    for point in points.iter_mut() {
        if let Some(height) = probe.probe(*point) {
            point.y = height;
            hits += 1;
        }
    }
    log::debug!("Projected {hits}/{} heights", points.len());
    hits
}
