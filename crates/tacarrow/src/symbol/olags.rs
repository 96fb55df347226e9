//! OLAGS: supporting-attack arrow, corridor with a rectangular cutout at the tip.
//!
//! The corridor buffer loses a rectangle `w` deep along the axis and `2w`
//! across (the `w` long perpendicular segment through P_B, buffered by `w/2`
//! with square caps) and gains a triangular arrowhead
//! `P_B → C_l(w) → C_r(w) → P_B`. Output is the outline of that union as a
//! single linework, not a collection.

use std::f64::consts::FRAC_PI_2;

use super::{continuous_longitudes, HeadSegment, SymbolContext, SymbolError};
use crate::kernel::{BufferParams, CapStyle, Geometry, JoinStyle, LineString, MultiPolygon};

pub fn compile_olags(
    ctx: &SymbolContext<'_>,
    line: &LineString,
    width: f64,
) -> Result<Geometry, SymbolError> {
    let k = ctx.kernel;
    let line = &continuous_longitudes(line);
    let head = HeadSegment::resolve(ctx, line, width)?;
    let p_c = head.trailing_point(ctx)?;
    let half = head.half_width();
    let left = head.azimuth - FRAC_PI_2;
    let right = head.azimuth + FRAC_PI_2;

    let corridor = ctx.buffer_projected(
        &Geometry::LineString(line.clone()),
        half,
        head.b,
        left,
        BufferParams::new(ctx.cfg.quad_segs, CapStyle::Flat, JoinStyle::Round),
    )?;

    let across = k.line(&[
        ctx.project(head.b, half, left)?,
        ctx.project(head.b, half, right)?,
    ])?;
    let cutout = ctx.buffer_projected(
        &Geometry::LineString(across),
        half,
        head.b,
        left,
        BufferParams::new(ctx.cfg.quad_segs, CapStyle::Square, JoinStyle::Round),
    )?;

    let ring = k.line(&[
        head.b,
        ctx.project(p_c, width, left)?,
        ctx.project(p_c, width, right)?,
        head.b,
    ])?;
    let arrow = MultiPolygon::new(vec![k.as_polygon(&ring)?]);

    let notched = k.difference(&corridor, &cutout);
    Ok(k.boundary(&k.union(&notched, &arrow))?)
}
