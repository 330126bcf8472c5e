//! # Config Crate
//!
//! Centralized configuration constants for the lane mesh geometry core.
//! Every tolerance, threshold and safety cap used by the triangulator,
//! hull, welder and boundary walker is defined here so that test suites can
//! swap precision regimes without touching module-level state.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GeometryConfig, TOLERANCE, WELD_DISTANCE};
//!
//! // Default configuration mirrors the named constants
//! let cfg = GeometryConfig::default();
//! assert_eq!(cfg.tolerance, TOLERANCE);
//! assert_eq!(cfg.weld_distance, WELD_DISTANCE);
//!
//! // Alternate precision regime for tests
//! let coarse = cfg.with_tolerance(1.0e-3).expect("valid tolerance");
//! assert_eq!(coarse.tolerance, 1.0e-3);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Explicit**: Geometry calls receive a `GeometryConfig`, never a global
//! - **Validated**: Invalid combinations are rejected at construction time

pub mod constants;
