//! `GeometryKernel` on top of the `geo` and `wkt` crates.

use std::f64::consts::FRAC_PI_2;

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap, LineJoin};
use geo::{BooleanOps, Intersects, MapCoords};
use wkt::{ToWkt, TryFromWkt};

use super::{
    BufferParams, CapStyle, Coord, CoordMap, Geometry, GeometryKernel, JoinStyle, KernelError,
    LineString, MultiPolygon, Polygon,
};
use crate::{GeoPoint, Vec2};

/// Stateless kernel backed by `geo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoKernel;

impl GeoKernel {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

/// OGC type name, as used in error messages.
pub(crate) fn geometry_kind(g: &Geometry) -> &'static str {
    match g {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn buffer_style(half_width: f64, params: BufferParams) -> BufferStyle<f64> {
    // arc step equivalent to `quad_segs` segments per quarter circle
    let step = FRAC_PI_2 / f64::from(params.quad_segs.max(1));
    let cap = match params.cap {
        CapStyle::Flat => LineCap::Butt,
        CapStyle::Square => LineCap::Square,
        CapStyle::Round => LineCap::Round(step),
    };
    let join = match params.join {
        JoinStyle::Round => LineJoin::Round(step),
        JoinStyle::Miter(limit) => LineJoin::Miter(limit),
        JoinStyle::Bevel => LineJoin::Bevel,
    };
    BufferStyle::new(half_width).line_cap(cap).line_join(join)
}

impl GeometryKernel for GeoKernel {
    fn read_wkt(&self, wkt: &str) -> Result<Geometry, KernelError> {
        Geometry::try_from_wkt_str(wkt).map_err(|e| KernelError::Wkt(e.to_string()))
    }

    fn write_wkt(&self, geometry: &Geometry) -> String {
        geometry.wkt_string()
    }

    fn point_n(&self, line: &LineString, n: isize) -> Result<GeoPoint, KernelError> {
        let len = line.0.len();
        let idx = if n < 0 { len as isize + n } else { n };
        if idx < 0 || idx >= len as isize {
            return Err(KernelError::IndexOutOfRange { index: n, len });
        }
        Ok(GeoPoint::from(line.0[idx as usize]))
    }

    fn line(&self, points: &[GeoPoint]) -> Result<LineString, KernelError> {
        if points.len() < 2 {
            return Err(KernelError::TooFewPoints {
                op: "line",
                need: 2,
                got: points.len(),
            });
        }
        Ok(LineString::from(
            points.iter().map(|&p| Coord::from(p)).collect::<Vec<_>>(),
        ))
    }

    fn collection(&self, members: Vec<Geometry>) -> Geometry {
        Geometry::GeometryCollection(geo::GeometryCollection(members))
    }

    fn buffer(
        &self,
        geometry: &Geometry,
        half_width: f64,
        params: BufferParams,
    ) -> Result<MultiPolygon, KernelError> {
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(KernelError::InvalidArgument(format!(
                "buffer distance must be positive, got {half_width}"
            )));
        }
        let style = buffer_style(half_width, params);
        let out = match geometry {
            Geometry::LineString(g) => g.buffer_with_style(style),
            Geometry::MultiLineString(g) => g.buffer_with_style(style),
            Geometry::Polygon(g) => g.buffer_with_style(style),
            Geometry::MultiPolygon(g) => g.buffer_with_style(style),
            other => {
                return Err(KernelError::Unsupported {
                    op: "buffer",
                    found: geometry_kind(other),
                })
            }
        };
        if out.0.is_empty() {
            return Err(KernelError::EmptyResult("buffer"));
        }
        Ok(out)
    }

    fn difference(&self, a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
        a.difference(b)
    }

    fn union(&self, a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
        a.union(b)
    }

    fn boundary(&self, area: &MultiPolygon) -> Result<Geometry, KernelError> {
        match area.0.as_slice() {
            [] => Err(KernelError::EmptyResult("boundary")),
            [single] if single.interiors().is_empty() => {
                Ok(Geometry::LineString(single.exterior().clone()))
            }
            polys => {
                let rings = polys
                    .iter()
                    .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
                    .cloned()
                    .collect::<Vec<_>>();
                Ok(Geometry::MultiLineString(geo::MultiLineString(rings)))
            }
        }
    }

    fn as_polygon(&self, ring: &LineString) -> Result<Polygon, KernelError> {
        if ring.0.len() < 4 {
            return Err(KernelError::TooFewPoints {
                op: "as_polygon",
                need: 4,
                got: ring.0.len(),
            });
        }
        if !ring.is_closed() {
            return Err(KernelError::RingNotClosed);
        }
        Ok(Polygon::new(ring.clone(), Vec::new()))
    }

    fn interpolate_normalized(&self, line: &LineString, t: f64) -> Result<GeoPoint, KernelError> {
        if line.0.len() < 2 {
            return Err(KernelError::TooFewPoints {
                op: "interpolate_normalized",
                need: 2,
                got: line.0.len(),
            });
        }
        if !t.is_finite() {
            return Err(KernelError::InvalidArgument(format!(
                "interpolation parameter must be finite, got {t}"
            )));
        }
        let t = t.clamp(0.0, 1.0);
        let pts: Vec<Vec2<f64>> = line.0.iter().map(|c| Vec2::new(c.x, c.y)).collect();
        let total: f64 = pts.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        if total == 0.0 {
            return Ok(GeoPoint::from(line.0[0]));
        }
        let mut remaining = t * total;
        for w in pts.windows(2) {
            let len = (w[1] - w[0]).norm();
            if remaining <= len && len > 0.0 {
                let p = w[0].lerp(&w[1], remaining / len);
                return Ok(GeoPoint::new(p.x, p.y));
            }
            remaining -= len;
        }
        Ok(GeoPoint::from(line.0[line.0.len() - 1]))
    }

    fn transform(&self, geometry: &Geometry, map: &CoordMap<'_>) -> Result<Geometry, KernelError> {
        geometry.try_map_coords(|c| map(c))
    }

    fn intersects_point(&self, area: &Polygon, point: GeoPoint) -> bool {
        area.intersects(&geo::Point::from(point))
    }
}
