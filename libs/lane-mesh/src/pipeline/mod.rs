//! # Meshing Pipelines
//!
//! Composes the geometry core into the steps a map builder runs per lane
//! or intersection:
//!
//! ```text
//! polygons → dedupe → [repair] → [per-polygon outline + union] → outline → soup
//! ```
//!
//! Recoverable errors (degenerate or non-manifold input) are logged and the
//! offending polygon is skipped. Fatal errors abort with the polygon name
//! attached.

mod roadside;

#[cfg(test)]
mod tests;

pub use roadside::{roadside_polygons, LinePoint};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{are_lines_intersecting, convex_hull, remove_duplicates, union_polygons};
use crate::mesh::{weld_and_extract_boundary, TriangleSoup};
use crate::triangulation::triangulate_delaunay;
use config::constants::{GeometryConfig, REPAIR_PASS_LIMIT};
use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A set of outline loops, outer boundaries only.
pub type Outline = Vec<Vec<DVec3>>;

// =============================================================================
// ERROR TRIAGE
// =============================================================================

/// Turns a recoverable error into `None`; fatal errors gain the polygon name.
fn recover<T>(result: MeshResult<T>, name: &str) -> MeshResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err.in_polygon(name)),
        Err(err) => {
            log::warn!("Skipping polygon ({name}): {err}");
            Ok(None)
        }
    }
}

fn outline_of(soup: &TriangleSoup, name: &str, config: &GeometryConfig) -> MeshResult<Option<Outline>> {
    let Some(boundary) = recover(
        weld_and_extract_boundary(soup, config.weld_distance, config),
        name,
    )?
    else {
        return Ok(None);
    };

    if let Some(warning) = &boundary.warning {
        log::warn!("Outline is approximate ({name}): {warning}");
    }

    Ok((!boundary.loops.is_empty()).then_some(boundary.loops))
}

// =============================================================================
// POLYGON STEPS
// =============================================================================

/// Triangulates every polygon and merges the results into one welded soup.
///
/// Polygons with fewer than 3 points are ignored and degenerate ones are
/// skipped with a warning. Returns `None` when nothing survives.
pub fn triangulate_polygons(
    polygons: &[Vec<DVec3>],
    name: &str,
    config: &GeometryConfig,
) -> MeshResult<Option<TriangleSoup>> {
    let mut soup = TriangleSoup::new();

    for polygon in polygons.iter().filter(|p| p.len() >= 3) {
        if let Some(triangles) = recover(triangulate_delaunay(polygon, config), name)? {
            soup.merge(&TriangleSoup::from_triangles(polygon, &triangles));
        }
    }

    if soup.is_empty() {
        return Ok(None);
    }

    soup.weld(config.weld_distance).map_err(|err| err.in_polygon(name))?;
    soup.compute_normals();
    log::debug!(
        "Meshed {name}: {} vertices, {} triangles",
        soup.vertex_count(),
        soup.triangle_count()
    );
    Ok(Some(soup))
}

/// Replaces a polygon by the outer boundary of its own triangulation.
///
/// This drops duplicated and needle vertices that would trip later steps.
/// When the polygon cannot be triangulated its convex hull is used instead.
pub fn optimize_polygon(
    polygon: &[DVec3],
    name: &str,
    config: &GeometryConfig,
) -> MeshResult<Option<Outline>> {
    let triangles = match triangulate_delaunay(polygon, config) {
        Ok(triangles) => triangles,
        Err(err) if err.is_fatal() => return Err(err.in_polygon(name)),
        Err(err) => {
            log::warn!("Triangulation failed, using convex hull ({name}): {err}");
            let hull = recover(convex_hull(polygon, config), name)?;
            return Ok(hull.map(|hull| vec![hull]));
        }
    };

    outline_of(&TriangleSoup::from_triangles(polygon, &triangles), name, config)
}

/// Outer boundary of the triangulations of several polygons taken together.
///
/// Unlike [`optimize_polygon`] there is no hull fallback: polygons that fail
/// to triangulate are skipped.
pub fn optimize_polygons(
    polygons: &[Vec<DVec3>],
    name: &str,
    config: &GeometryConfig,
) -> MeshResult<Option<Outline>> {
    let mut soup = TriangleSoup::new();

    for polygon in polygons.iter().filter(|p| p.len() >= 3) {
        if let Some(triangles) = recover(triangulate_delaunay(polygon, config), name)? {
            soup.merge(&TriangleSoup::from_triangles(polygon, &triangles));
        }
    }

    if soup.is_empty() {
        return Ok(None);
    }

    outline_of(&soup, name, config)
}

/// Union of all polygons; the first usable polygon is the clip operand.
pub fn merge_polygons(polygons: &[Vec<DVec3>], config: &GeometryConfig) -> Outline {
    let merged = union_polygons(polygons, config);
    log::debug!("Merged {} polygons into {}", polygons.len(), merged.len());
    merged
}

/// Untangles bow-tie crossings by swapping the middle pair of any four
/// consecutive points whose outer segments intersect.
///
/// Returns true when the order changed. If the polygon is still changing
/// after the pass limit, the original order is restored and false is
/// returned.
pub fn fix_self_intersections(polygon: &mut [DVec3], name: &str, tolerance: f64) -> bool {
    repair_with_limit(polygon, name, tolerance, REPAIR_PASS_LIMIT)
}

fn repair_with_limit(polygon: &mut [DVec3], name: &str, tolerance: f64, pass_limit: usize) -> bool {
    let n = polygon.len();
    if n < 4 {
        return false;
    }

    let original = polygon.to_vec();
    let mut changed_any = false;

    for _ in 0..pass_limit {
        let mut changed = false;

        for i0 in 0..n {
            let i1 = (i0 + 1) % n;
            let i2 = (i0 + 2) % n;
            let i3 = (i0 + 3) % n;

            if are_lines_intersecting(polygon[i0], polygon[i1], polygon[i2], polygon[i3], tolerance) {
                polygon.swap(i1, i2);
                changed = true;
            }
        }

        if !changed {
            if changed_any {
                log::debug!("Reordered vertices to fix intersecting edges ({name})");
            }
            return changed_any;
        }
        changed_any = true;
    }

    log::warn!("Unable to fix intersecting edges, polygon might fall back to convex hull ({name})");
    polygon.copy_from_slice(&original);
    false
}

// =============================================================================
// BATCH
// =============================================================================

/// One independent surface to mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRequest {
    /// Name used in logs and errors
    pub name: String,
    pub polygons: Vec<Vec<DVec3>>,
    /// Outline each polygon separately and union them first
    #[serde(default)]
    pub merge: bool,
    /// Run [`fix_self_intersections`] on every polygon first
    #[serde(default)]
    pub repair: bool,
}

impl MeshRequest {
    pub fn new(name: impl Into<String>, polygons: Vec<Vec<DVec3>>) -> Self {
        Self {
            name: name.into(),
            polygons,
            merge: false,
            repair: false,
        }
    }

    pub fn merged(mut self) -> Self {
        self.merge = true;
        self
    }

    pub fn repaired(mut self) -> Self {
        self.repair = true;
        self
    }
}

/// Result of one request in a batch.
#[derive(Debug, Clone)]
pub enum MeshOutcome {
    Meshed { name: String, soup: TriangleSoup },
    /// Nothing usable came out; the reason is always recoverable
    Skipped { name: String, reason: MeshError },
}

impl MeshOutcome {
    pub fn name(&self) -> &str {
        match self {
            MeshOutcome::Meshed { name, .. } | MeshOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn soup(&self) -> Option<&TriangleSoup> {
        match self {
            MeshOutcome::Meshed { soup, .. } => Some(soup),
            MeshOutcome::Skipped { .. } => None,
        }
    }
}

/// Meshes a single request: dedupe, repair, optional union, outline,
/// triangulate.
pub fn mesh_request(request: &MeshRequest, config: &GeometryConfig) -> MeshResult<MeshOutcome> {
    let name = request.name.as_str();
    let skipped = |message: &str| MeshOutcome::Skipped {
        name: name.to_string(),
        reason: MeshError::degenerate(message).in_polygon(name),
    };

    let mut polygons = request.polygons.clone();
    for polygon in &mut polygons {
        remove_duplicates(polygon, config.tolerance);
    }
    if request.repair {
        for polygon in &mut polygons {
            fix_self_intersections(polygon, name, config.tolerance);
        }
    }

    if request.merge {
        let mut outlines = Vec::new();
        for polygon in polygons.iter().filter(|p| p.len() >= 3) {
            if let Some(outline) = optimize_polygon(polygon, name, config)? {
                outlines.extend(outline);
            }
        }
        polygons = merge_polygons(&outlines, config);
    }

    let Some(outline) = optimize_polygons(&polygons, name, config)? else {
        log::warn!("Zero surface outline detected, skipping ({name})");
        return Ok(skipped("zero surface outline"));
    };

    match triangulate_polygons(&outline, name, config)? {
        Some(soup) => Ok(MeshOutcome::Meshed {
            name: name.to_string(),
            soup,
        }),
        None => {
            log::warn!("Zero surface mesh detected, skipping ({name})");
            Ok(skipped("zero surface mesh"))
        }
    }
}

/// Meshes independent requests in parallel.
///
/// Outcomes keep the request order. The first fatal error aborts the batch.
pub fn mesh_batch(requests: &[MeshRequest], config: &GeometryConfig) -> MeshResult<Vec<MeshOutcome>> {
    let outcomes: Vec<MeshOutcome> = requests
        .par_iter()
        .map(|request| mesh_request(request, config))
        .collect::<MeshResult<_>>()?;

    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, MeshOutcome::Skipped { .. }))
        .count();
    log::debug!("Batch meshed {} requests, {skipped} skipped", outcomes.len());

    Ok(outcomes)
}
