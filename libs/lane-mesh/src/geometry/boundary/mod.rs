//! # Boundary Extraction
//!
//! Recovers outer boundary loops from a welded triangle soup.
//!
//! A directed edge is on the boundary when its reverse edge is absent.
//! Loops are assembled by walking boundary edges from the extreme unused
//! vertex (smallest x, then smallest z). Loops whose start vertex lies
//! inside an already assembled loop are skipped, so interior holes are
//! dropped rather than returned.


use super::{check_indices, hull::convex_hull, is_point_in_polygon};
use crate::error::{MeshError, MeshResult, Stage};
use config::constants::{approx_equal, GeometryConfig};
use glam::DVec3;
use std::collections::{HashMap, HashSet};

/// Outer boundary loops of a soup.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// Closed loops, each listed once without repeating the first point.
    pub loops: Vec<Vec<DVec3>>,
    /// Set when the walk failed and `loops` holds a convex hull
    /// approximation instead (`NonManifoldSoup`).
    pub warning: Option<MeshError>,
}

impl Boundary {
    /// True when the loops came from a real walk rather than the hull
    /// fallback.
    pub fn is_exact(&self) -> bool {
        self.warning.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectedEdge {
    from: u32,
    to: u32,
    boundary: bool,
}

/// Extracts the outer boundary loops of a welded soup.
///
/// `triangles` must index into `vertices`, and coincident vertices must
/// already share an index (see [`weld_vertices`](super::weld_vertices)).
///
/// # Errors
///
/// - `IterationLimitExceeded` when a single walk takes more than
///   `config.iteration_limit` steps
/// - `DegeneratePolygon` when the hull fallback itself fails
/// - `InvalidOperation` when a triangle references a missing vertex
pub fn extract_boundary(
    vertices: &[DVec3],
    triangles: &[[u32; 3]],
    config: &GeometryConfig,
) -> MeshResult<Boundary> {
    check_indices(vertices.len(), triangles)?;
    let edges = collect_edges(triangles);
    let tolerance = config.tolerance;

    let mut loops: Vec<Vec<DVec3>> = Vec::new();
    let mut used_vertices: HashSet<u32> = HashSet::new();
    let mut used_edges: HashSet<usize> = HashSet::new();

    while let Some(start) = find_start_edge(vertices, &edges, &loops, &mut used_vertices, tolerance)
    {
        let first = edges[start].from;
        let mut current = edges[start].to;
        let mut boundary_loop = vec![vertices[current as usize]];
        used_vertices.insert(current);
        let mut iteration = 0usize;

        while current != first {
            let next = (0..edges.len()).find(|&i| {
                let e = edges[i];
                e.boundary && e.from == current && !used_edges.contains(&i)
            });

            let Some(next) = next else {
                log::warn!("Unsupported soup shape found, falling back to convex hull");
                let hull = convex_hull(vertices, config)?;
                return Ok(Boundary {
                    loops: vec![hull],
                    warning: Some(MeshError::non_manifold(format!(
                        "boundary walk stuck at vertex {current}"
                    ))),
                });
            };

            current = edges[next].to;
            boundary_loop.push(vertices[current as usize]);
            used_vertices.insert(current);
            used_edges.insert(next);

            iteration += 1;
            if iteration > config.iteration_limit {
                return Err(MeshError::iteration_limit(
                    Stage::BoundaryWalk,
                    config.iteration_limit,
                ));
            }
        }

        boundary_loop.reverse();
        loops.push(boundary_loop);
    }

    log::debug!("boundary: {} loop(s) from {} triangles", loops.len(), triangles.len());
    Ok(Boundary {
        loops,
        warning: None,
    })
}

/// Directed edges in first-seen order, flagged when their reverse is absent.
fn collect_edges(triangles: &[[u32; 3]]) -> Vec<DirectedEdge> {
    let mut edges: Vec<DirectedEdge> = Vec::with_capacity(triangles.len() * 3);
    let mut lookup: HashMap<(u32, u32), usize> = HashMap::with_capacity(triangles.len() * 3);

    for tri in triangles {
        for j in 0..3 {
            let key = (tri[j], tri[(j + 1) % 3]);
            lookup.entry(key).or_insert_with(|| {
                edges.push(DirectedEdge {
                    from: key.0,
                    to: key.1,
                    boundary: true,
                });
                edges.len() - 1
            });
        }
    }

    for edge in &mut edges {
        if lookup.contains_key(&(edge.to, edge.from)) {
            edge.boundary = false;
        }
    }

    edges
}

/// Picks the boundary edge with the extreme unused source vertex.
///
/// Sources lying inside finished loops are marked used on the way.
fn find_start_edge(
    vertices: &[DVec3],
    edges: &[DirectedEdge],
    loops: &[Vec<DVec3>],
    used_vertices: &mut HashSet<u32>,
    tolerance: f64,
) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (i, edge) in edges.iter().enumerate() {
        if !edge.boundary || used_vertices.contains(&edge.from) {
            continue;
        }

        let point = vertices[edge.from as usize];
        if loops
            .iter()
            .any(|finished| is_point_in_polygon(finished, point, tolerance))
        {
            used_vertices.insert(edge.from);
            continue;
        }

        match best {
            None => best = Some(i),
            Some(b) => {
                let current = vertices[edges[b].from as usize];
                if point.x < current.x
                    || (approx_equal(point.x, current.x, tolerance) && point.z < current.z)
                {
                    best = Some(i);
                }
            }
        }
    }

    best
}
