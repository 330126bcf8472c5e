//! # Half-Edge Mesh
//!
//! Index-based half-edge structure over a triangulation, with in-place
//! edge flips and Delaunay conditioning.
//!
//! ## Layout
//!
//! - Triangle `t` owns half-edges `3t`, `3t + 1`, `3t + 2` at build time
//! - A half-edge stores its *target* vertex; its source is the target of
//!   `previous`
//! - Every triangle is wound clockwise in the `(x, z)` plane
//!
//! Flips move half-edges between triangles, so ownership must be read from
//! `HalfEdge::triangle`, not derived from the index.

#[cfg(test)]
mod tests;

use crate::error::{MeshError, MeshResult, Stage};
use crate::geometry::{approximately_equals, in_circle_determinant};
use crate::triangle::{Triangle, VertexId};
use glam::DVec3;
use thiserror::Error;

/// Unique identifier for half-edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId(pub u32);

/// Unique identifier for triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(pub u32);

/// Half-edge data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// Vertex this half-edge points to
    pub vertex: VertexId,
    /// Triangle this half-edge belongs to
    pub triangle: TriangleId,
    /// Next half-edge in the triangle
    pub next: HalfEdgeId,
    /// Previous half-edge in the triangle
    pub previous: HalfEdgeId,
    /// Half-edge of the neighbouring triangle running the other way
    pub opposite: Option<HalfEdgeId>,
}

/// Topology errors reported by [`HalfEdgeMesh::validate`]
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("Invalid vertex reference: {0:?}")]
    InvalidVertex(VertexId),

    #[error("Invalid half-edge reference: {0:?}")]
    InvalidHalfEdge(HalfEdgeId),

    #[error("Half-edge {0:?} does not close a 3-cycle")]
    BrokenCycle(HalfEdgeId),

    #[error("Half-edge {0:?} is not a member of its triangle")]
    TriangleMismatch(HalfEdgeId),

    #[error("Opposite of {0:?} does not point back")]
    AsymmetricOpposite(HalfEdgeId),
}

/// Result type for topology checks
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Main half-edge mesh data structure
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    /// Vertex positions, shared with the caller's index space
    positions: Vec<DVec3>,
    /// Half-edge storage
    half_edges: Vec<HalfEdge>,
    /// Triangle vertex triples
    triangles: Vec<Triangle>,
}

impl HalfEdgeMesh {
    /// Builds the structure from index triangles over `points`.
    ///
    /// Triangles are reoriented clockwise first. Opposites are matched by
    /// approximate position equality of (source, target) against
    /// (target, source); the first match in half-edge order wins. Matching
    /// is quadratic in the half-edge count, which is fine for per-lane
    /// polygons.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when a triangle references a missing point.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lane_mesh::HalfEdgeMesh;
    /// use glam::DVec3;
    ///
    /// let points = [
    ///     DVec3::new(0.0, 0.0, 0.0),
    ///     DVec3::new(4.0, 0.0, 0.0),
    ///     DVec3::new(4.0, 0.0, 4.0),
    ///     DVec3::new(0.0, 0.0, 4.0),
    /// ];
    /// let mesh = HalfEdgeMesh::build(&points, &[[0, 1, 2], [0, 2, 3]], 1.0e-4).unwrap();
    /// assert_eq!(mesh.half_edge_count(), 6);
    /// assert_eq!(mesh.interior_half_edge_count(), 2);
    /// ```
    pub fn build(points: &[DVec3], triangles: &[[usize; 3]], tolerance: f64) -> MeshResult<Self> {
        let mut tris = Vec::with_capacity(triangles.len());
        for indices in triangles {
            if let Some(&bad) = indices.iter().find(|&&i| i >= points.len()) {
                return Err(MeshError::invalid_operation(format!(
                    "triangle references point {bad}, only {} available",
                    points.len()
                )));
            }
            let mut tri = Triangle::from_indices(*indices);
            if !tri.is_clockwise(points) {
                tri.change_orientation();
            }
            tris.push(tri);
        }

        let mut half_edges = Vec::with_capacity(tris.len() * 3);
        for (t, tri) in tris.iter().enumerate() {
            let base = (t * 3) as u32;
            for (k, vertex) in tri.vertices().into_iter().enumerate() {
                let k = k as u32;
                half_edges.push(HalfEdge {
                    vertex,
                    triangle: TriangleId(t as u32),
                    next: HalfEdgeId(base + (k + 1) % 3),
                    previous: HalfEdgeId(base + (k + 2) % 3),
                    opposite: None,
                });
            }
        }

        let mut mesh = Self {
            positions: points.to_vec(),
            half_edges,
            triangles: tris,
        };
        mesh.match_opposites(tolerance);

        log::debug!(
            "half-edge mesh: {} triangles, {} interior half-edges",
            mesh.triangles.len(),
            mesh.interior_half_edge_count()
        );
        Ok(mesh)
    }

    fn match_opposites(&mut self, tolerance: f64) {
        let count = self.half_edges.len();
        for i in 0..count {
            let id = HalfEdgeId(i as u32);
            let source = self.position(self.source(id));
            let target = self.position(self.half_edges[i].vertex);

            let found = (0..count).filter(|&j| j != i).find(|&j| {
                let candidate = HalfEdgeId(j as u32);
                approximately_equals(source, self.position(self.half_edges[j].vertex), tolerance)
                    && approximately_equals(target, self.position(self.source(candidate)), tolerance)
            });

            self.half_edges[i].opposite = found.map(|j| HalfEdgeId(j as u32));
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Gets a half-edge by ID
    pub fn half_edge(&self, id: HalfEdgeId) -> TopologyResult<&HalfEdge> {
        self.half_edges
            .get(id.0 as usize)
            .ok_or(TopologyError::InvalidHalfEdge(id))
    }

    /// Returns all half-edges in index order.
    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    /// Returns the triangles with their current vertex triples.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the triangles as buffer index triples.
    pub fn triangle_indices(&self) -> Vec<[usize; 3]> {
        self.triangles.iter().map(Triangle::indices).collect()
    }

    /// Returns the position of a vertex.
    #[inline]
    pub fn position(&self, vertex: VertexId) -> DVec3 {
        self.positions[vertex.index()]
    }

    /// Returns the vertex a half-edge starts from.
    #[inline]
    pub fn source(&self, id: HalfEdgeId) -> VertexId {
        let previous = self.half_edges[id.0 as usize].previous;
        self.half_edges[previous.0 as usize].vertex
    }

    /// Returns the number of half-edges
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Returns the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of half-edges that have an opposite.
    pub fn interior_half_edge_count(&self) -> usize {
        self.half_edges.iter().filter(|h| h.opposite.is_some()).count()
    }

    // =========================================================================
    // EDGE FLIP
    // =========================================================================

    /// The four quad vertices around the edge of `id`:
    /// `[h.vertex, h.next.vertex, h.previous.vertex, h.opposite.next.vertex]`.
    ///
    /// They run clockwise around the quad formed by the two triangles.
    pub fn quad(&self, id: HalfEdgeId) -> Option<[VertexId; 4]> {
        let h = self.half_edges.get(id.0 as usize)?;
        let o = self.half_edges[h.opposite?.0 as usize];
        Some([
            h.vertex,
            self.half_edges[h.next.0 as usize].vertex,
            self.half_edges[h.previous.0 as usize].vertex,
            self.half_edges[o.next.0 as usize].vertex,
        ])
    }

    /// True when the edge of `id` breaks the Delaunay condition by more than
    /// the [`in_circle_slack`] of its quad and the flip is geometrically
    /// valid.
    ///
    /// Cocircular quads sit inside the slack on both diagonals, so neither
    /// is flipped.
    pub fn should_flip(&self, id: HalfEdgeId, tolerance: f64) -> bool {
        let Some(quad) = self.quad(id) else {
            return false;
        };
        let quad = quad.map(|v| self.position(v));
        let [v0, v1, v2, v3] = quad;
        let slack = in_circle_slack(&quad, tolerance);

        in_circle_determinant(v0, v1, v2, v3) < -slack
            && can_flip(&quad)
            && in_circle_determinant(v1, v2, v3, v0) >= -slack
    }

    /// Replaces the diagonal shared by the two triangles of `id` with the
    /// other diagonal of their quad.
    ///
    /// With `T0 = {h, hn, hp}` and `T1 = {o, on, op}`, the result is
    /// `T0 = {h, hp, on}` over `(v1, v2, v3)` and `T1 = {o, op, hn}` over
    /// `(v3, v0, v1)`. Counts are unchanged and no opposite link moves.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when `id` is out of range or on the boundary.
    pub fn flip(&mut self, id: HalfEdgeId) -> MeshResult<()> {
        let Some(h) = self.half_edges.get(id.0 as usize).copied() else {
            return Err(MeshError::invalid_operation(format!(
                "no half-edge {}",
                id.0
            )));
        };
        let Some(o_id) = h.opposite else {
            return Err(MeshError::invalid_operation(format!(
                "half-edge {} is on the boundary and cannot be flipped",
                id.0
            )));
        };
        let o = self.half_edges[o_id.0 as usize];

        let (hn, hp) = (h.next, h.previous);
        let (on, op) = (o.next, o.previous);
        let (t0, t1) = (h.triangle, o.triangle);

        let v0 = h.vertex;
        let v1 = self.half_edges[hn.0 as usize].vertex;
        let v2 = self.half_edges[hp.0 as usize].vertex;
        let v3 = self.half_edges[on.0 as usize].vertex;

        self.half_edges[id.0 as usize].vertex = v1;
        self.half_edges[o_id.0 as usize].vertex = v3;

        self.link(id, hp, on);
        self.link(o_id, op, hn);

        self.half_edges[on.0 as usize].triangle = t0;
        self.half_edges[hn.0 as usize].triangle = t1;

        self.triangles[t0.0 as usize] = Triangle::new(v1, v2, v3);
        self.triangles[t1.0 as usize] = Triangle::new(v3, v0, v1);

        Ok(())
    }

    /// Links three half-edges into the cycle `a → b → c → a`.
    fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId, c: HalfEdgeId) {
        for (id, next, previous) in [(a, b, c), (b, c, a), (c, a, b)] {
            let edge = &mut self.half_edges[id.0 as usize];
            edge.next = next;
            edge.previous = previous;
        }
    }

    // =========================================================================
    // DELAUNAY CONDITIONING
    // =========================================================================

    /// Flips edges until no interior edge breaks the Delaunay condition.
    ///
    /// Each pass visits half-edges in index order and flips on the spot, so
    /// later checks in the same pass see earlier flips. Returns the number
    /// of flips performed. `tolerance` feeds [`in_circle_slack`].
    ///
    /// # Errors
    ///
    /// `IterationLimitExceeded` when more than `iteration_limit` passes
    /// still flip something.
    pub fn condition_delaunay(
        &mut self,
        iteration_limit: usize,
        tolerance: f64,
    ) -> MeshResult<usize> {
        let mut flips = 0usize;
        let mut iteration = 0usize;

        loop {
            let mut flipped = false;

            for i in 0..self.half_edges.len() {
                let id = HalfEdgeId(i as u32);
                if self.should_flip(id, tolerance) {
                    self.flip(id)?;
                    flips += 1;
                    flipped = true;
                }
            }

            if !flipped {
                break;
            }

            iteration += 1;
            if iteration > iteration_limit {
                return Err(MeshError::iteration_limit(
                    Stage::DelaunayFlip,
                    iteration_limit,
                ));
            }
        }

        log::debug!("delaunay: {flips} flip(s) in {iteration} pass(es)");
        Ok(flips)
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Validates links: 3-cycles, triangle membership, symmetric opposites.
    pub fn validate(&self) -> TopologyResult<()> {
        let count = self.half_edges.len();
        let check = |id: HalfEdgeId| -> TopologyResult<&HalfEdge> {
            self.half_edges
                .get(id.0 as usize)
                .ok_or(TopologyError::InvalidHalfEdge(id))
        };

        for i in 0..count {
            let id = HalfEdgeId(i as u32);
            let h = &self.half_edges[i];

            if h.vertex.index() >= self.positions.len() {
                return Err(TopologyError::InvalidVertex(h.vertex));
            }

            let n = check(h.next)?;
            let nn = check(n.next)?;
            if nn.next != id || check(h.previous)?.next != id {
                return Err(TopologyError::BrokenCycle(id));
            }

            let Some(tri) = self.triangles.get(h.triangle.0 as usize) else {
                return Err(TopologyError::TriangleMismatch(id));
            };
            if !tri.contains(h.vertex) || n.triangle != h.triangle {
                return Err(TopologyError::TriangleMismatch(id));
            }

            if let Some(o) = h.opposite {
                if check(o)?.opposite != Some(id) {
                    return Err(TopologyError::AsymmetricOpposite(id));
                }
            }
        }

        Ok(())
    }
}

/// Noise band for the in-circle test on `quad`: `tolerance` times the
/// longest squared `(x, z)` side.
///
/// Determinants in `[-slack, slack]` are treated as cocircular.
pub fn in_circle_slack(quad: &[DVec3; 4], tolerance: f64) -> f64 {
    let longest = (0..4)
        .map(|i| {
            let d = quad[(i + 1) % 4] - quad[i];
            d.x * d.x + d.z * d.z
        })
        .fold(0.0, f64::max);
    tolerance * longest
}

/// True when the quad `v0 → v1 → v2 → v3` makes no left turn in `(x, z)`.
pub fn can_flip(quad: &[DVec3; 4]) -> bool {
    (0..4).all(|i| {
        let d1 = quad[(i + 1) % 4] - quad[i];
        let d2 = quad[(i + 2) % 4] - quad[(i + 1) % 4];
        d1.x * d2.z - d1.z * d2.x <= 0.0
    })
}
