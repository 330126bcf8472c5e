//! # Mesh Errors
//!
//! Error types for lane meshing operations.
//!
//! ## Error Policy
//!
//! - `DegeneratePolygon` and `NonManifoldSoup` are expected for bad map
//!   input and are reported per polygon
//! - `IterationLimitExceeded` and `InvalidOperation` mean an algorithm broke
//!   its own invariants and abort the whole meshing pass

use std::fmt;
use thiserror::Error;

// =============================================================================
// STAGES
// =============================================================================

/// Bounded loop that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Ear removal in the triangulator
    EarClipping,
    /// Gift-wrapping convex hull
    ConvexHull,
    /// Delaunay edge-flip passes
    DelaunayFlip,
    /// Boundary loop walk over a welded soup
    BoundaryWalk,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::EarClipping => "ear clipping",
            Stage::ConvexHull => "convex hull",
            Stage::DelaunayFlip => "delaunay flip",
            Stage::BoundaryWalk => "boundary walk",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while meshing lane polygons.
///
/// ## Example
///
/// ```rust
/// use lane_mesh::{triangulate, MeshError};
/// use config::constants::GeometryConfig;
/// use glam::DVec3;
///
/// let points = [DVec3::ZERO, DVec3::X];
/// match triangulate(&points, &GeometryConfig::default()) {
///     Err(MeshError::DegeneratePolygon { message }) => assert!(message.contains("3")),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Fewer than 3 usable points, collinear/coincident input, or no ear and
    /// no hull could be found.
    #[error("Degenerate polygon: {message}")]
    DegeneratePolygon { message: String },

    /// Boundary walk could not close a loop over the soup.
    #[error("Non-manifold soup: {message}")]
    NonManifoldSoup { message: String },

    /// A bounded loop ran past its safety cap.
    #[error("Iteration limit of {limit} exceeded during {stage}")]
    IterationLimitExceeded { stage: Stage, limit: usize },

    /// Caller broke an operation precondition.
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Error raised while processing a named polygon.
    #[error("{polygon}: {source}")]
    InPolygon {
        polygon: String,
        #[source]
        source: Box<MeshError>,
    },
}

impl MeshError {
    /// Creates a degenerate polygon error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegeneratePolygon {
            message: message.into(),
        }
    }

    /// Creates a non-manifold soup error.
    pub fn non_manifold(message: impl Into<String>) -> Self {
        Self::NonManifoldSoup {
            message: message.into(),
        }
    }

    /// Creates an iteration limit error.
    pub fn iteration_limit(stage: Stage, limit: usize) -> Self {
        Self::IterationLimitExceeded { stage, limit }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Attaches the name of the polygon being processed.
    ///
    /// An empty name leaves the error untouched.
    pub fn in_polygon(self, polygon: &str) -> Self {
        if polygon.is_empty() {
            return self;
        }
        Self::InPolygon {
            polygon: polygon.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping polygon context.
    pub fn root(&self) -> &MeshError {
        match self {
            Self::InPolygon { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for invariant violations that must abort the meshing pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root(),
            Self::IterationLimitExceeded { .. } | Self::InvalidOperation { .. }
        )
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for meshing operations.
pub type MeshResult<T> = Result<T, MeshError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display messages.
    #[test]
    fn test_error_display() {
        let err = MeshError::iteration_limit(Stage::DelaunayFlip, 16);
        assert_eq!(
            err.to_string(),
            "Iteration limit of 16 exceeded during delaunay flip"
        );

        let wrapped = MeshError::degenerate("collinear points").in_polygon("lane_12");
        assert!(wrapped.to_string().starts_with("lane_12: "));
        assert!(wrapped.to_string().contains("collinear"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!MeshError::degenerate("x").is_fatal());
        assert!(!MeshError::non_manifold("x").is_fatal());
        assert!(MeshError::invalid_operation("x").is_fatal());
        assert!(MeshError::iteration_limit(Stage::ConvexHull, 1).is_fatal());
        assert!(MeshError::iteration_limit(Stage::BoundaryWalk, 1)
            .in_polygon("intersection_3")
            .is_fatal());
    }

    #[test]
    fn test_empty_context_is_ignored() {
        let err = MeshError::degenerate("x").in_polygon("");
        assert!(matches!(err, MeshError::DegeneratePolygon { .. }));
    }

    /// Test error types are Send + Sync for parallel batches.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }
}
