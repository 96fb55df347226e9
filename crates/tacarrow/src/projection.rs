//! Geographic ↔ planar coordinate mapping.
//!
//! Only the buffering step runs in planar coordinates: geometries are pushed
//! forward, buffered, and pulled back immediately.
//!
//! `WebMercator` is the spherical EPSG:3857 mapping applied to WGS84
//! coordinates. Its linear scale grows as `1 / cos(lat)` and, on the
//! ellipsoid, differs slightly between north-south and east-west (up to about
//! 0.7% near the equator). Ground distances are therefore converted by
//! projecting both ends of a geodesic offset rather than by a scale formula.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use thiserror::Error;

use crate::cfg::MERCATOR_MAX_LAT;
use crate::{GeoPoint, Vec2};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("latitude {0} outside projectable range ±{max}", max = MERCATOR_MAX_LAT)]
    LatitudeOutOfRange(f64),
    #[error("non-finite coordinate ({lon}, {lat})")]
    NonFinite { lon: f64, lat: f64 },
}

/// A fixed pair of mappings between geographic and one planar system.
pub trait Projection: Send + Sync {
    fn forward(&self, p: GeoPoint) -> Result<Vec2<f64>, ProjectionError>;
    fn inverse(&self, q: Vec2<f64>) -> GeoPoint;
}

/// Spherical Web Mercator (EPSG:3857).
#[derive(Clone, Copy, Debug)]
pub struct WebMercator {
    pub radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self { radius: 6_378_137.0 }
    }
}

impl Projection for WebMercator {
    fn forward(&self, p: GeoPoint) -> Result<Vec2<f64>, ProjectionError> {
        if !p.is_finite() {
            return Err(ProjectionError::NonFinite {
                lon: p.lon,
                lat: p.lat,
            });
        }
        if p.lat.abs() > MERCATOR_MAX_LAT {
            return Err(ProjectionError::LatitudeOutOfRange(p.lat));
        }
        let x = self.radius * p.lon.to_radians();
        let y = self.radius * (FRAC_PI_4 + p.lat.to_radians() / 2.0).tan().ln();
        Ok(Vec2::new(x, y))
    }

    fn inverse(&self, q: Vec2<f64>) -> GeoPoint {
        let lon = (q.x / self.radius).to_degrees();
        let lat = (2.0 * (q.y / self.radius).exp().atan() - FRAC_PI_2).to_degrees();
        GeoPoint::new(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn origin_and_parallel_scale() {
        let m = WebMercator::default();
        let q = m.forward(GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(q.norm() < 1e-9);
        // a degree of longitude has the same planar length at every latitude
        let a = m.forward(GeoPoint::new(10.0, 60.0)).unwrap();
        let b = m.forward(GeoPoint::new(11.0, 60.0)).unwrap();
        let c = m.forward(GeoPoint::new(10.0, 0.0)).unwrap();
        let d = m.forward(GeoPoint::new(11.0, 0.0)).unwrap();
        assert!(((b - a).norm() - (d - c).norm()).abs() < 1e-6);
    }

    #[test]
    fn longitudes_past_the_antimeridian_stay_continuous() {
        let m = WebMercator::default();
        let east = m.forward(GeoPoint::new(180.1, 0.0)).unwrap();
        let west = m.forward(GeoPoint::new(179.9, 0.0)).unwrap();
        assert!(east.x > west.x);
        let back = m.inverse(east);
        assert!((back.lon - 180.1).abs() < 1e-9);
    }

    #[test]
    fn known_values_epsg3857() {
        let m = WebMercator::default();
        // lon 180 maps to the half circumference
        let q = m.forward(GeoPoint::new(180.0, 0.0)).unwrap();
        assert!((q.x - 20_037_508.342_789_244).abs() < 1e-6);
        // the latitude limit maps to (nearly) the same half circumference
        let top = m.forward(GeoPoint::new(0.0, MERCATOR_MAX_LAT)).unwrap();
        assert!((top.y - 20_037_508.34).abs() < 1.0, "{}", top.y);
    }

    #[test]
    fn rejects_polar_and_non_finite() {
        let m = WebMercator::default();
        assert!(matches!(
            m.forward(GeoPoint::new(0.0, 89.0)),
            Err(ProjectionError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            m.forward(GeoPoint::new(f64::INFINITY, 0.0)),
            Err(ProjectionError::NonFinite { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(lon in -180.0..180.0_f64, lat in -85.0..85.0_f64) {
            let m = WebMercator::default();
            let p = GeoPoint::new(lon, lat);
            let back = m.inverse(m.forward(p)?);
            prop_assert!((back.lon - lon).abs() < 1e-9);
            prop_assert!((back.lat - lat).abs() < 1e-9);
        }
    }
}
