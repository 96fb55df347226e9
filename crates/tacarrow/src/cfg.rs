//! Tolerance and design-constant defaults (internal).
//!
//! Policy
//! - Defaults are fixed constants. Callers that need other values go through
//!   `SymbolCfg` / `GeodesicCfg` rather than editing these.

/// Arrowhead length as a fraction of the symbol width.
pub(crate) const ARROW_LENGTH_RATIO: f64 = 0.76;
/// Segments per quarter circle for round joins/caps when buffering.
pub(crate) const QUAD_SEGS: u32 = 16;

/// Convergence threshold (radians) for the Vincenty iterations.
pub(crate) const GEODESIC_EPS: f64 = 1e-12;
/// Iteration cap for the Vincenty iterations.
pub(crate) const GEODESIC_MAX_ITER: usize = 200;

/// Two vertices closer than this (degrees) count as the same point.
pub(crate) const COINCIDENT_EPS_DEG: f64 = 1e-12;

/// Web Mercator latitude limit (degrees).
pub(crate) const MERCATOR_MAX_LAT: f64 = 85.051_128_78;
