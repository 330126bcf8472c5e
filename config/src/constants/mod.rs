//! # Configuration Constants
//!
//! Centralized constants for the lane mesh pipeline.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Welding**: Vertex merge distance
//! - **Scaling**: Fixed-point scale for polygon clipping
//! - **Limits**: Safety caps for iterative algorithms

use std::fmt;


// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Tolerance for planar determinants and coordinate comparisons.
///
/// Used by the segment intersection test (near-parallel rejection), the
/// convex hull collinearity test and approximate vertex equality.
///
/// # Example
///
/// ```rust
/// use config::constants::TOLERANCE;
///
/// let den: f64 = 0.00001;
/// assert!(den.abs() < TOLERANCE);
/// ```
pub const TOLERANCE: f64 = 1.0e-4;

// =============================================================================
// WELDING CONSTANTS
// =============================================================================

/// Distance under which two soup vertices are merged into one.
///
/// # Example
///
/// ```rust
/// use config::constants::WELD_DISTANCE;
///
/// let a = [0.0_f64, 0.0, 0.0];
/// let b = [0.005_f64, 0.0, 0.0];
/// let d = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
/// assert!(d < WELD_DISTANCE);
/// ```
pub const WELD_DISTANCE: f64 = 0.01;

/// Planar distance under which a point counts as lying on a lane polyline.
///
/// Lane distance searches stop early once a segment is closer than this.
pub const LANE_SNAP_DISTANCE: f64 = 0.05;

// =============================================================================
// SCALING CONSTANTS
// =============================================================================

/// Fixed-point scale applied before polygon clipping.
///
/// Coordinates are multiplied by this factor and rounded to integers so the
/// clipper works on a millimetre grid, then divided after the operation.
///
/// # Example
///
/// ```rust
/// use config::constants::FIXED_POINT_SCALE;
///
/// let snapped = (1.23456 * FIXED_POINT_SCALE).round();
/// assert_eq!(snapped, 1235.0);
/// assert_eq!(snapped / FIXED_POINT_SCALE, 1.235);
/// ```
pub const FIXED_POINT_SCALE: f64 = 1000.0;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Safety cap for iterative loops (Delaunay passes, hull steps, boundary
/// walk steps). Exceeding it means the algorithm failed to converge.
///
/// # Example
///
/// ```rust
/// use config::constants::ITERATION_LIMIT;
///
/// let passes = 12;
/// assert!(passes < ITERATION_LIMIT);
/// ```
pub const ITERATION_LIMIT: usize = 65_536;

/// Maximum passes spent reordering points of a self-intersecting polygon.
pub const REPAIR_PASS_LIMIT: usize = 32;

// =============================================================================
// GEOMETRY CONFIG
// =============================================================================

/// Immutable snapshot of the tolerances and limits passed into geometry
/// calls.
///
/// # Examples
/// ```
/// use config::constants::GeometryConfig;
/// let config = GeometryConfig::default();
/// assert!(config.tolerance > 0.0);
/// assert!(config.weld_distance >= config.tolerance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Tolerance for determinants and approximate coordinate equality.
    pub tolerance: f64,
    /// Distance under which vertices are welded.
    pub weld_distance: f64,
    /// Fixed-point scale used by the polygon clipper.
    pub fixed_point_scale: f64,
    /// Safety cap shared by every iterative loop.
    pub iteration_limit: usize,
}

impl GeometryConfig {
    /// Builds a configuration, rejecting values that would break the
    /// geometry kernels.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GeometryConfig;
    /// let cfg = GeometryConfig::new(1.0e-5, 0.02, 1000.0, 1024).expect("valid config");
    /// assert_eq!(cfg.iteration_limit, 1024);
    /// ```
    pub fn new(
        tolerance: f64,
        weld_distance: f64,
        fixed_point_scale: f64,
        iteration_limit: usize,
    ) -> Result<Self, ConfigError> {
        if !(tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if !(weld_distance >= tolerance) {
            return Err(ConfigError::InvalidWeldDistance(weld_distance));
        }
        if !(fixed_point_scale > 0.0) {
            return Err(ConfigError::InvalidScale(fixed_point_scale));
        }
        if iteration_limit == 0 {
            return Err(ConfigError::InvalidIterationLimit);
        }
        Ok(Self {
            tolerance,
            weld_distance,
            fixed_point_scale,
            iteration_limit,
        })
    }

    /// Returns a copy with a different tolerance.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GeometryConfig;
    /// let cfg = GeometryConfig::default().with_tolerance(1.0e-6).unwrap();
    /// assert_eq!(cfg.tolerance, 1.0e-6);
    /// ```
    pub fn with_tolerance(self, tolerance: f64) -> Result<Self, ConfigError> {
        Self::new(
            tolerance,
            self.weld_distance,
            self.fixed_point_scale,
            self.iteration_limit,
        )
    }

    /// Returns a copy with a different iteration cap.
    pub fn with_iteration_limit(self, iteration_limit: usize) -> Result<Self, ConfigError> {
        Self::new(
            self.tolerance,
            self.weld_distance,
            self.fixed_point_scale,
            iteration_limit,
        )
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            weld_distance: WELD_DISTANCE,
            fixed_point_scale: FIXED_POINT_SCALE,
            iteration_limit: ITERATION_LIMIT,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero, negative or NaN.
    InvalidTolerance(f64),
    /// Raised when the weld distance is smaller than the tolerance.
    InvalidWeldDistance(f64),
    /// Raised when the fixed-point scale is zero, negative or NaN.
    InvalidScale(f64),
    /// Raised when the iteration cap is zero.
    InvalidIterationLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive: {value}")
            }
            ConfigError::InvalidWeldDistance(value) => {
                write!(f, "weld_distance must be >= tolerance: {value}")
            }
            ConfigError::InvalidScale(value) => {
                write!(f, "fixed_point_scale must be positive: {value}")
            }
            ConfigError::InvalidIterationLimit => {
                write!(f, "iteration_limit must be non-zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two floating-point values are approximately equal.
///
/// # Example
///
/// ```rust
/// use config::constants::{approx_equal, TOLERANCE};
///
/// assert!(approx_equal(1.0, 1.00001, TOLERANCE));
/// assert!(!approx_equal(1.0, 1.001, TOLERANCE));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Wraps an index into `0..count`, accepting negative offsets.
///
/// # Example
///
/// ```rust
/// use config::constants::loop_index;
///
/// assert_eq!(loop_index(-1, 4), 3);
/// assert_eq!(loop_index(5, 4), 1);
/// ```
#[inline]
pub fn loop_index(index: isize, count: usize) -> usize {
    let count = count as isize;
    ((index % count + count) % count) as usize
}
