//! Ear clipping followed by Delaunay edge flips.

use super::triangulate;
use crate::error::MeshResult;
use crate::halfedge::HalfEdgeMesh;
use config::constants::GeometryConfig;
use glam::DVec3;

/// Triangulates a simple polygon and conditions the result toward Delaunay.
///
/// Output triangles index into `points` and are wound clockwise in the
/// `(x, z)` plane. The triangle count matches [`triangulate`].
///
/// # Example
///
/// ```rust
/// use lane_mesh::triangulate_delaunay;
/// use config::constants::GeometryConfig;
/// use glam::DVec3;
///
/// let kite = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(2.0, 0.0, -1.0),
///     DVec3::new(4.0, 0.0, 0.0),
///     DVec3::new(2.0, 0.0, 1.0),
/// ];
/// let triangles = triangulate_delaunay(&kite, &GeometryConfig::default()).unwrap();
/// assert_eq!(triangles.len(), 2);
/// ```
pub fn triangulate_delaunay(
    points: &[DVec3],
    config: &GeometryConfig,
) -> MeshResult<Vec<[usize; 3]>> {
    let triangles = triangulate(points, config)?;
    let mut mesh = HalfEdgeMesh::build(points, &triangles, config.tolerance)?;
    mesh.condition_delaunay(config.iteration_limit, config.tolerance)?;
    Ok(mesh.triangle_indices())
}
