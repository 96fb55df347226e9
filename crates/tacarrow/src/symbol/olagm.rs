//! OLAGM: main-attack arrow with a buffered corridor and a notched arrowhead.
//!
//! Output: `GEOMETRYCOLLECTION(corridor outline, arrowhead outline)`.
//!
//! Arrowhead ring (7 points, closed):
//! `P_B → C_l(w) → C_l(w/2) → mid(P_B, P_C) → C_r(w/2) → C_r(w) → P_B`
//! where `C_l(d)` / `C_r(d)` are the points `d` meters left/right of P_C.
//! Subtracting it from the corridor buffer leaves the corridor body plus two
//! slivers beside the tip; the body is the member touching the axis halfway
//! between P_A and P_C.

use std::f64::consts::FRAC_PI_2;

use super::{continuous_longitudes, HeadSegment, SymbolContext, SymbolError};
use crate::kernel::{BufferParams, CapStyle, Geometry, JoinStyle, LineString, MultiPolygon};

pub fn compile_olagm(
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

    let notch = k.interpolate_normalized(&k.line(&[head.b, p_c])?, 0.5)?;
    let ring = k.line(&[
        head.b,
        ctx.project(p_c, width, left)?,
        ctx.project(p_c, half, left)?,
        notch,
        ctx.project(p_c, half, right)?,
        ctx.project(p_c, width, right)?,
        head.b,
    ])?;
    let arrow = MultiPolygon::new(vec![k.as_polygon(&ring)?]);

    let mid = k.interpolate_normalized(&k.line(&[head.a, p_c])?, 0.5)?;
    let body = k
        .difference(&corridor, &arrow)
        .0
        .into_iter()
        .find(|part| k.intersects_point(part, mid))
        .ok_or_else(|| {
            SymbolError::DegenerateGeometry(
                "no corridor part behind the arrowhead after subtracting it".to_string(),
            )
        })?;

    Ok(k.collection(vec![
        k.boundary(&MultiPolygon::new(vec![body]))?,
        k.boundary(&arrow)?,
    ]))
}
