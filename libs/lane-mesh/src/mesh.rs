//! # Triangle Soup
//!
//! Vertex and index buffers handed back to the caller.

use crate::error::MeshResult;
use crate::geometry::{extract_boundary, weld_vertices, Boundary};
use config::constants::{GeometryConfig, TOLERANCE};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A triangle soup with vertices and indices.
///
/// All geometry calculations use f64 internally. Export to f32 only
/// happens when handing buffers to a renderer.
///
/// # Example
///
/// ```rust
/// use lane_mesh::TriangleSoup;
/// use glam::DVec3;
///
/// let mut soup = TriangleSoup::new();
/// soup.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// soup.add_vertex(DVec3::new(0.0, 0.0, 1.0));
/// soup.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// soup.add_triangle(0, 1, 2);
/// assert_eq!(soup.area(), 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    /// Vertex positions (f64 for precision)
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// Optional vertex normals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    normals: Option<Vec<DVec3>>,
}

impl TriangleSoup {
    /// Creates an empty soup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a soup with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            normals: None,
        }
    }

    /// Emits three fresh vertices per triangle, sharing nothing.
    ///
    /// Run [`weld`](Self::weld) afterwards to merge coincident corners.
    pub fn from_triangles(points: &[DVec3], triangles: &[[usize; 3]]) -> Self {
        let mut soup = Self::with_capacity(triangles.len() * 3, triangles.len());
        for tri in triangles {
            let [a, b, c] = tri.map(|i| soup.add_vertex(points[i]));
            soup.add_triangle(a, b, c);
        }
        soup
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the soup has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex normals.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Merges vertices closer than `threshold` and drops triangles that
    /// collapse or repeat. Normals are cleared.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when a triangle references a missing vertex; the
    /// soup is left untouched.
    pub fn weld(&mut self, threshold: f64) -> MeshResult<()> {
        let (vertices, triangles) = weld_vertices(&self.vertices, &self.triangles, threshold)?;
        self.vertices = vertices;
        self.triangles = triangles;
        self.normals = None;
        Ok(())
    }

    /// Outer boundary loops of this soup. Weld first.
    pub fn boundary_loops(&self, config: &GeometryConfig) -> MeshResult<Boundary> {
        extract_boundary(&self.vertices, &self.triangles, config)
    }

    /// Computes and sets area-weighted vertex normals.
    ///
    /// Triangles wound clockwise in the `(x, z)` plane face `+y`.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![DVec3::ZERO; self.vertices.len()];

        for tri in &self.triangles {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];

            let normal = (v1 - v0).cross(v2 - v0);

            normals[tri[0] as usize] += normal;
            normals[tri[1] as usize] += normal;
            normals[tri[2] as usize] += normal;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }

        self.normals = Some(normals);
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some((first, rest)) = self.vertices.split_first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        rest.iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Total 3D surface area.
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let v0 = self.vertices[tri[0] as usize];
                let v1 = self.vertices[tri[1] as usize];
                let v2 = self.vertices[tri[2] as usize];
                0.5 * (v1 - v0).cross(v2 - v0).length()
            })
            .sum()
    }

    /// Appends another soup, offsetting its indices.
    pub fn merge(&mut self, other: &TriangleSoup) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| tri.map(|i| i + offset)),
        );

        // Normals survive only when both sides carry them.
        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            _ => None,
        };
    }

    /// Checks index bounds and rejects collapsed or zero-area triangles.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            (v1 - v0).cross(v2 - v0).length() >= TOLERANCE
        })
    }

    /// Exports vertices as a flat f32 array for rendering.
    ///
    /// Returns flattened [x, y, z, x, y, z, ...] array.
    pub fn vertices_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect()
    }

    /// Exports triangle indices as a flat u32 array.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Welds a copy of `soup` and extracts its outer boundary loops.
///
/// # Example
///
/// ```rust
/// use lane_mesh::{weld_and_extract_boundary, TriangleSoup};
/// use config::constants::GeometryConfig;
/// use glam::DVec3;
///
/// let points = [
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(4.0, 0.0, 0.0),
///     DVec3::new(4.0, 0.0, 4.0),
///     DVec3::new(0.0, 0.0, 4.0),
/// ];
/// let soup = TriangleSoup::from_triangles(&points, &[[0, 3, 2], [0, 2, 1]]);
/// let boundary = weld_and_extract_boundary(&soup, 0.01, &GeometryConfig::default()).unwrap();
/// assert_eq!(boundary.loops, vec![points.to_vec()]);
/// ```
pub fn weld_and_extract_boundary(
    soup: &TriangleSoup,
    threshold: f64,
    config: &GeometryConfig,
) -> MeshResult<Boundary> {
    let mut welded = soup.clone();
    welded.weld(threshold)?;
    welded.boundary_loops(config)
}
