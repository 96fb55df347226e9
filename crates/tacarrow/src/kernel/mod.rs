//! Geometry capability consumed by the symbol compilers.
//!
//! Purpose
//! - Name the small, fixed function surface the compilers need from a geometry
//!   library: WKT I/O, primitive construction, planar boolean operations,
//!   buffering, boundary/polygon conversion, interpolation, coordinate mapping.
//! - Keep the compilers independent of any one library; `GeoKernel` is the
//!   implementation on top of `geo` + `wkt`.
//!
//! Conventions the compilers rely on
//! - `point_n` accepts negative indices: -1 is the last vertex, -2 the one
//!   before it. Out-of-range indices fail with `IndexOutOfRange`.
//! - Boolean results are always `MultiPolygon`s, possibly with several
//!   members; callers select members explicitly.
//! - `boundary` returns a closed `LineString` for a single polygon without
//!   holes and a `MultiLineString` otherwise.
//! - `interpolate_normalized` is planar (chord) interpolation, not geodesic.

mod geo_kernel;

pub use geo_kernel::GeoKernel;
pub(crate) use geo_kernel::geometry_kind;

use thiserror::Error;

use crate::projection::ProjectionError;
use crate::GeoPoint;

pub type Coord = geo::Coord<f64>;
pub type Geometry = geo::Geometry<f64>;
pub type LineString = geo::LineString<f64>;
pub type Polygon = geo::Polygon<f64>;
pub type MultiPolygon = geo::MultiPolygon<f64>;

/// Buffer end-cap style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapStyle {
    Flat,
    Square,
    Round,
}

/// Buffer join style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JoinStyle {
    Round,
    /// Miter with the given limit (multiple of the buffer distance).
    Miter(f64),
    Bevel,
}

/// Buffer parameters: arc resolution and styles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferParams {
    /// Segments per quarter circle for round caps/joins.
    pub quad_segs: u32,
    pub cap: CapStyle,
    pub join: JoinStyle,
}

impl BufferParams {
    #[inline]
    pub fn new(quad_segs: u32, cap: CapStyle, join: JoinStyle) -> Self {
        Self {
            quad_segs,
            cap,
            join,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum KernelError {
    #[error("WKT: {0}")]
    Wkt(String),
    #[error("invalid range: index {index} for {len} vertices")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("{op} needs at least {need} points, got {got}")]
    TooFewPoints {
        op: &'static str,
        need: usize,
        got: usize,
    },
    #[error("ring is not closed")]
    RingNotClosed,
    #[error("{op} does not support {found}")]
    Unsupported {
        op: &'static str,
        found: &'static str,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("projection: {0}")]
    Projection(#[from] ProjectionError),
    #[error("{0} produced an empty geometry")]
    EmptyResult(&'static str),
}

/// Coordinate mapping applied to every vertex by `transform`.
pub type CoordMap<'a> = dyn Fn(Coord) -> Result<Coord, KernelError> + 'a;

/// The geometry operations the compilers are built from.
///
/// Implementations must be pure: no call may depend on an earlier one.
pub trait GeometryKernel: Send + Sync {
    fn read_wkt(&self, wkt: &str) -> Result<Geometry, KernelError>;
    fn write_wkt(&self, geometry: &Geometry) -> String;

    /// Vertex `n` of a line; negative `n` counts from the end.
    fn point_n(&self, line: &LineString, n: isize) -> Result<GeoPoint, KernelError>;
    /// Line through `points` (at least two).
    fn line(&self, points: &[GeoPoint]) -> Result<LineString, KernelError>;
    /// Heterogeneous collection, members kept in order.
    fn collection(&self, members: Vec<Geometry>) -> Geometry;

    /// Planar offset area at distance `half_width` around `geometry`.
    fn buffer(
        &self,
        geometry: &Geometry,
        half_width: f64,
        params: BufferParams,
    ) -> Result<MultiPolygon, KernelError>;
    fn difference(&self, a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon;
    fn union(&self, a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon;

    /// Outline of an area.
    fn boundary(&self, area: &MultiPolygon) -> Result<Geometry, KernelError>;
    /// Fill a closed ring.
    fn as_polygon(&self, ring: &LineString) -> Result<Polygon, KernelError>;
    /// Point at fraction `t` of the line's planar length.
    fn interpolate_normalized(&self, line: &LineString, t: f64) -> Result<GeoPoint, KernelError>;
    /// Apply `map` to every vertex.
    fn transform(&self, geometry: &Geometry, map: &CoordMap<'_>) -> Result<Geometry, KernelError>;

    /// True when `point` lies in the interior or on the boundary of `area`.
    fn intersects_point(&self, area: &Polygon, point: GeoPoint) -> bool;
}
