//! # Lane Mesh
//!
//! Computational-geometry core for HD-map road surfaces. Turns lane and
//! intersection polygons into triangle soups and cleaned outlines.
//!
//! ## Architecture
//!
//! ```text
//! polygons → triangulation (ear clipping) → halfedge (Delaunay flips)
//!          → mesh (weld) → geometry::boundary (outline)
//!          → geometry::clip (union) → pipeline (batch)
//! ```
//!
//! ## Conventions
//!
//! - Points are `glam::DVec3` with `y` as height; all planar predicates
//!   work in the `(x, z)` plane
//! - Output triangles are wound clockwise in `(x, z)`, so they face `+y`
//! - Every tolerance and loop cap comes from a `GeometryConfig`
//!
//! ## Usage
//!
//! ```rust
//! use lane_mesh::{triangulate_delaunay, weld_and_extract_boundary, TriangleSoup};
//! use config::constants::GeometryConfig;
//! use glam::DVec3;
//!
//! let config = GeometryConfig::default();
//! let lane = [
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(8.0, 0.1, 0.0),
//!     DVec3::new(8.0, 0.1, 3.0),
//!     DVec3::new(0.0, 0.0, 3.0),
//! ];
//!
//! let triangles = triangulate_delaunay(&lane, &config).unwrap();
//! let soup = TriangleSoup::from_triangles(&lane, &triangles);
//! let outline = weld_and_extract_boundary(&soup, config.weld_distance, &config).unwrap();
//!
//! assert_eq!(outline.loops.len(), 1);
//! assert_eq!(outline.loops[0].len(), 4);
//! ```

pub mod error;
pub mod geometry;
pub mod halfedge;
pub mod mesh;
pub mod pipeline;
pub mod probe;
pub mod triangle;
pub mod triangulation;

pub use error::{MeshError, MeshResult, Stage};
pub use geometry::{convex_hull, union_polygons, Boundary};
pub use halfedge::HalfEdgeMesh;
pub use mesh::{weld_and_extract_boundary, TriangleSoup};
pub use pipeline::{mesh_batch, MeshOutcome, MeshRequest};
pub use probe::{project_heights, HeightProbe};
pub use triangle::{Triangle, VertexId};
pub use triangulation::{triangulate, triangulate_delaunay};
