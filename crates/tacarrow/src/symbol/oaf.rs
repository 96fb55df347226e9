//! OAF: axis of advance, feint. No buffering; two open chevrons.
//!
//! - Tail chevron at P_A: `A_l(w/2)` and `A_r(w/2)` perpendicular to the axis,
//!   each extended `w/3` further at `α ∓ 135°`, joined as
//!   `A_l' → A_l → A_r → A_r'`.
//! - Head chevron at P_B: `B_l → P_B → B_r` with `B_l/r` at `w/4`, `α ∓ 140°`.
//!
//! Output: `GEOMETRYCOLLECTION(base line, tail chevron, head chevron)`.

use std::f64::consts::FRAC_PI_2;

use super::{continuous_longitudes, HeadSegment, SymbolContext, SymbolError};
use crate::kernel::{Geometry, LineString};

const TAIL_FLARE_DEG: f64 = 135.0;
const HEAD_FLARE_DEG: f64 = 140.0;

pub fn compile_oaf(
    ctx: &SymbolContext<'_>,
    line: &LineString,
    width: f64,
) -> Result<Geometry, SymbolError> {
    let k = ctx.kernel;
    let line = &continuous_longitudes(line);
    let head = HeadSegment::resolve(ctx, line, width)?;
    let alpha = head.azimuth;
    let tail_flare = TAIL_FLARE_DEG.to_radians();
    let head_flare = HEAD_FLARE_DEG.to_radians();

    let a1 = ctx.project(head.a, width / 2.0, alpha - FRAC_PI_2)?;
    let a2 = ctx.project(head.a, width / 2.0, alpha + FRAC_PI_2)?;
    let a3 = ctx.project(a1, width / 3.0, alpha - tail_flare)?;
    let a4 = ctx.project(a2, width / 3.0, alpha + tail_flare)?;
    let b1 = ctx.project(head.b, width / 4.0, alpha - head_flare)?;
    let b2 = ctx.project(head.b, width / 4.0, alpha + head_flare)?;

    Ok(k.collection(vec![
        Geometry::LineString(line.clone()),
        Geometry::LineString(k.line(&[a3, a1, a2, a4])?),
        Geometry::LineString(k.line(&[b1, head.b, b2])?),
    ]))
}
