//! Tactical corridor arrow symbols.
//!
//! Derives the arrowhead (and, for some codes, a buffered and notched corridor
//! outline) of a tactical graphic from a base corridor line and a width in
//! meters. Output is in geographic coordinates (lon/lat degrees).
//!
//! Layers (leaves first)
//! - `geodesic`: ellipsoidal forward/inverse problems (Vincenty, WGS84).
//! - `projection`: geographic ↔ planar mapping used only around buffering.
//! - `kernel`: the geometry capability surface the compilers consume, plus a
//!   concrete implementation on top of `geo` and `wkt`.
//! - `symbol`: one compiler per supported symbol code.
//! - `registry`: closed set of symbol kinds and code matching.
//! - `pipeline`: batch glue (records in, one geometry collection out).
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   collects the names callers usually need.

pub mod api;
mod cfg;
pub mod geodesic;
pub mod kernel;
pub mod pipeline;
pub mod projection;
pub mod registry;
pub mod symbol;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Geographic coordinate in degrees (`lon` = x, `lat` = y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<geo::Coord<f64>> for GeoPoint {
    #[inline]
    fn from(c: geo::Coord<f64>) -> Self {
        Self { lon: c.x, lat: c.y }
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    #[inline]
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.lon, y: p.lat }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    #[inline]
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geodesic::{Geodesic, GeodesicCfg, Inverse};
    pub use crate::kernel::{GeoKernel, GeometryKernel};
    pub use crate::pipeline::{compile_batch, compile_batch_par, CorridorRecord, FailurePolicy};
    pub use crate::projection::{Projection, WebMercator};
    pub use crate::registry::{CodeMatching, SymbolKind};
    pub use crate::symbol::{SymbolCfg, SymbolContext, SymbolError};
    pub use crate::GeoPoint;
}
