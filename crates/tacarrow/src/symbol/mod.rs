//! Symbol compilers: base corridor line + width → arrow geometry.
//!
//! Purpose
//! - One pure function per supported symbol: `compile_olagm`, `compile_olags`,
//!   `compile_oaf`. Each is a function of its inputs only; nothing is cached
//!   between calls.
//!
//! Shared setup (`HeadSegment`)
//! - The head segment is the last two vertices of the base line: P_A = vertex
//!   -2, P_B = vertex -1. The inverse geodesic problem gives its azimuth α and
//!   length D_AB.
//! - Arrow length is `arrow_length_ratio × width` (0.76 by default). The
//!   trailing point P_C sits that far back from P_B on the chord P_A→P_B:
//!   `P_C = interpolate(P_A→P_B, 1 − arrowLength / D_AB)`. Interpolation is
//!   planar on the lon/lat chord; for head segments of corridor scale the
//!   difference to the geodesic point is far below symbol resolution.
//!
//! Validation happens before any kernel geometry is built: vertex count,
//! width, coincident head vertices, and (for the arrowhead symbols)
//! `arrowLength < D_AB`.
//!
//! Buffering
//! - Buffers are computed in the planar projection and mapped back. The planar
//!   buffer distance is the projected length of a geodesic half-width offset
//!   placed at P_B across the axis, so the corridor edge lines up with the
//!   geodesically placed arrowhead points.
//!
//! Antimeridian
//! - Compilers work on a copy of the base line whose longitudes are made
//!   continuous, anchored at P_B. Near ±180° output longitudes may therefore
//!   leave [-180, 180]; every output point stays next to P_B.

mod oaf;
mod olagm;
mod olags;

pub use oaf::compile_oaf;
pub use olagm::compile_olagm;
pub use olags::compile_olags;

use thiserror::Error;

use crate::cfg::{ARROW_LENGTH_RATIO, QUAD_SEGS};
use crate::geodesic::{Geodesic, GeodesicError};
use crate::kernel::{
    geometry_kind, BufferParams, Coord, Geometry, GeometryKernel, KernelError, LineString,
    MultiPolygon,
};
use crate::projection::Projection;
use crate::registry::CodeMatching;
use crate::{GeoPoint, Vec2};

/// Construction constants.
#[derive(Clone, Copy, Debug)]
pub struct SymbolCfg {
    /// Arrowhead length as a fraction of the width.
    pub arrow_length_ratio: f64,
    /// Segments per quarter circle for round joins.
    pub quad_segs: u32,
    /// How batch records' symbol codes select a compiler.
    pub code_matching: CodeMatching,
}

impl Default for SymbolCfg {
    fn default() -> Self {
        Self {
            arrow_length_ratio: ARROW_LENGTH_RATIO,
            quad_segs: QUAD_SEGS,
            code_matching: CodeMatching::Exact,
        }
    }
}

/// Collaborators and constants shared by all compilers.
#[derive(Clone, Copy)]
pub struct SymbolContext<'a> {
    pub kernel: &'a dyn GeometryKernel,
    pub projection: &'a dyn Projection,
    pub geodesic: Geodesic,
    pub cfg: SymbolCfg,
}

impl<'a> SymbolContext<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel, projection: &'a dyn Projection) -> Self {
        Self {
            kernel,
            projection,
            geodesic: Geodesic::default(),
            cfg: SymbolCfg::default(),
        }
    }

    pub fn with_cfg(mut self, cfg: SymbolCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Point `distance` meters from `from` at `azimuth` (radians), with its
    /// longitude kept within 180° of `from`.
    #[inline]
    pub(crate) fn project(
        &self,
        from: GeoPoint,
        distance: f64,
        azimuth: f64,
    ) -> Result<GeoPoint, SymbolError> {
        let p = self.geodesic.direct(from, distance, azimuth)?;
        Ok(GeoPoint::new(lon_near(p.lon, from.lon), p.lat))
    }

    /// Buffer a geographic geometry by `half_width` ground meters, measured at
    /// `anchor` along azimuth `across`.
    pub(crate) fn buffer_projected(
        &self,
        geometry: &Geometry,
        half_width: f64,
        anchor: GeoPoint,
        across: f64,
        params: BufferParams,
    ) -> Result<MultiPolygon, SymbolError> {
        let proj = self.projection;
        let edge = self.project(anchor, half_width, across)?;
        let q0 = proj.forward(anchor).map_err(KernelError::from)?;
        let q1 = proj.forward(edge).map_err(KernelError::from)?;
        let planar_half = (q1 - q0).norm();
        let forward = |c: Coord| -> Result<Coord, KernelError> {
            let q = proj.forward(GeoPoint::from(c))?;
            Ok(Coord { x: q.x, y: q.y })
        };
        let inverse = |c: Coord| -> Result<Coord, KernelError> {
            Ok(Coord::from(proj.inverse(Vec2::new(c.x, c.y))))
        };
        let planar = self.kernel.transform(geometry, &forward)?;
        let area = self.kernel.buffer(&planar, planar_half, params)?;
        let back = self
            .kernel
            .transform(&Geometry::MultiPolygon(area), &inverse)?;
        match back {
            Geometry::MultiPolygon(mp) => Ok(mp),
            other => Err(SymbolError::Kernel(KernelError::Unsupported {
                op: "buffer (inverse transform)",
                found: geometry_kind(&other),
            })),
        }
    }
}

/// Input problems that are detected before any geometry is built.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InputError {
    #[error("base line must be a LineString, got {found}")]
    NotALineString { found: &'static str },
    #[error("base line needs at least 2 vertices, got {found}")]
    TooFewVertices { found: usize },
    #[error("width must be a positive number of meters, got {width}")]
    NonPositiveWidth { width: f64 },
    #[error("arrowhead length {arrow_length:.3} m does not fit head segment of {segment_length:.3} m")]
    ArrowTooLong {
        arrow_length: f64,
        segment_length: f64,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SymbolError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("geometry kernel: {0}")]
    Kernel(#[from] KernelError),
}

impl From<GeodesicError> for SymbolError {
    fn from(e: GeodesicError) -> Self {
        SymbolError::DegenerateGeometry(e.to_string())
    }
}

/// Validate a symbol width in meters.
#[inline]
pub(crate) fn check_width(width: f64) -> Result<(), InputError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(InputError::NonPositiveWidth { width })
    }
}

/// Head segment of a corridor line and its geodesic measures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadSegment {
    /// Second-to-last vertex.
    pub a: GeoPoint,
    /// Last vertex (arrow tip).
    pub b: GeoPoint,
    /// Azimuth from `a` to `b`, radians.
    pub azimuth: f64,
    /// Geodesic length of the segment, meters.
    pub length: f64,
    /// Symbol width, meters.
    pub width: f64,
}

impl HeadSegment {
    /// Validate `line` and `width` and measure the head segment.
    pub fn resolve(
        ctx: &SymbolContext<'_>,
        line: &LineString,
        width: f64,
    ) -> Result<Self, SymbolError> {
        let n = line.0.len();
        if n < 2 {
            return Err(InputError::TooFewVertices { found: n }.into());
        }
        check_width(width)?;
        let b = ctx.kernel.point_n(line, -1)?;
        let a = ctx.kernel.point_n(line, -2)?;
        let a = GeoPoint::new(lon_near(a.lon, b.lon), a.lat);
        let inv = ctx.geodesic.inverse(a, b)?;
        Ok(Self {
            a,
            b,
            azimuth: inv.azimuth,
            length: inv.distance,
            width,
        })
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    #[inline]
    pub fn arrow_length(&self, cfg: &SymbolCfg) -> f64 {
        cfg.arrow_length_ratio * self.width
    }

    /// Trailing point P_C of the arrowhead.
    ///
    /// Fails with `ArrowTooLong` unless `arrow_length < length`.
    pub fn trailing_point(&self, ctx: &SymbolContext<'_>) -> Result<GeoPoint, SymbolError> {
        let arrow_length = self.arrow_length(&ctx.cfg);
        if arrow_length >= self.length {
            return Err(InputError::ArrowTooLong {
                arrow_length,
                segment_length: self.length,
            }
            .into());
        }
        let chord = ctx.kernel.line(&[self.a, self.b])?;
        let t = 1.0 - arrow_length / self.length;
        Ok(ctx.kernel.interpolate_normalized(&chord, t)?)
    }
}

/// `lon` shifted by a multiple of 360° to lie within 180° of `reference`.
#[inline]
pub(crate) fn lon_near(lon: f64, reference: f64) -> f64 {
    lon - 360.0 * ((lon - reference) / 360.0).round()
}

/// Copy of `line` without longitude jumps: walking back from the last vertex,
/// each vertex is moved next to its successor. The last vertex is unchanged.
pub fn continuous_longitudes(line: &LineString) -> LineString {
    let mut coords = line.0.clone();
    for i in (0..coords.len().saturating_sub(1)).rev() {
        coords[i].x = lon_near(coords[i].x, coords[i + 1].x);
    }
    LineString::new(coords)
}

/// Extract the LineString a compiler works on.
pub fn base_line(geometry: &Geometry) -> Result<&LineString, InputError> {
    match geometry {
        Geometry::LineString(l) => Ok(l),
        other => Err(InputError::NotALineString {
            found: geometry_kind(other),
        }),
    }
}
