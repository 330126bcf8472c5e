//! # Triangle
//!
//! Index triangle over a shared position buffer.

use crate::geometry::is_triangle_clockwise;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for vertices (index into the position buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Returns the id as a buffer index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Three vertex ids. Winding is derived from positions, never stored.
///
/// # Example
///
/// ```rust
/// use lane_mesh::Triangle;
/// use glam::DVec3;
///
/// let positions = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ];
/// let mut tri = Triangle::from_indices([0, 1, 2]);
/// assert!(!tri.is_clockwise(&positions));
/// tri.change_orientation();
/// assert!(tri.is_clockwise(&positions));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub v0: VertexId,
    pub v1: VertexId,
    pub v2: VertexId,
}

impl Triangle {
    /// Creates a triangle from three vertex ids.
    pub fn new(v0: VertexId, v1: VertexId, v2: VertexId) -> Self {
        Self { v0, v1, v2 }
    }

    /// Creates a triangle from buffer indices.
    pub fn from_indices([a, b, c]: [usize; 3]) -> Self {
        Self::new(VertexId(a as u32), VertexId(b as u32), VertexId(c as u32))
    }

    /// Returns the vertex ids in order.
    #[inline]
    pub fn vertices(&self) -> [VertexId; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Returns the buffer indices in order.
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        [self.v0.index(), self.v1.index(), self.v2.index()]
    }

    /// True when the triangle uses `vertex`.
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.v0 == vertex || self.v1 == vertex || self.v2 == vertex
    }

    /// Clockwise (or degenerate) in the `(x, z)` plane.
    pub fn is_clockwise(&self, positions: &[DVec3]) -> bool {
        let [a, b, c] = self.indices();
        is_triangle_clockwise(positions[a], positions[b], positions[c])
    }

    /// Reverses the winding by swapping `v1` and `v2`.
    pub fn change_orientation(&mut self) {
        std::mem::swap(&mut self.v1, &mut self.v2);
    }

    /// Signed `(x, z)` area; positive for counter-clockwise triangles.
    pub fn signed_area(&self, positions: &[DVec3]) -> f64 {
        let [a, b, c] = self.indices();
        let (a, b, c) = (positions[a], positions[b], positions[c]);
        0.5 * ((b.x - a.x) * (c.z - a.z) - (c.x - a.x) * (b.z - a.z))
    }
}
