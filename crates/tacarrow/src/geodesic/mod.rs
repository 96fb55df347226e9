//! Ellipsoidal geodesy: forward (direct) and inverse azimuth–distance problems.
//!
//! Purpose
//! - Place arrowhead points at exact ground distances and bearings, and measure
//!   the head segment, on the reference ellipsoid.
//!
//! Conventions
//! - Points are `GeoPoint { lon, lat }` in degrees.
//! - Azimuths are radians, clockwise from true north, normalized to (-π, π].
//! - Distances are meters along the ellipsoid, never negative.
//! - Solver: Vincenty's iterative formulae. Accurate to well below a millimeter
//!   for the corridor scales we see; the inverse problem may fail to converge
//!   for nearly antipodal points, which is reported, not papered over.

use std::f64::consts::PI;

use thiserror::Error;

use crate::cfg::{COINCIDENT_EPS_DEG, GEODESIC_EPS, GEODESIC_MAX_ITER};
use crate::GeoPoint;

/// Reference ellipsoid (semi-major axis in meters, flattening).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Semi-minor axis.
    #[inline]
    pub fn b(&self) -> f64 {
        (1.0 - self.f) * self.a
    }
}

/// Solver configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeodesicCfg {
    pub eps: f64,
    pub max_iter: usize,
}

impl Default for GeodesicCfg {
    fn default() -> Self {
        Self {
            eps: GEODESIC_EPS,
            max_iter: GEODESIC_MAX_ITER,
        }
    }
}

/// Result of the inverse problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inverse {
    /// Initial bearing at the first point.
    pub azimuth: f64,
    /// Geodesic distance in meters.
    pub distance: f64,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeodesicError {
    #[error("coincident points ({lon}, {lat}): azimuth is undefined")]
    CoincidentPoints { lon: f64, lat: f64 },
    #[error("inverse problem did not converge after {iterations} iterations (near-antipodal points?)")]
    NoConvergence { iterations: usize },
    #[error("non-finite input: {0}")]
    NonFinite(&'static str),
    #[error("negative distance {0} m")]
    NegativeDistance(f64),
}

/// Geodesic solver on a fixed ellipsoid.
#[derive(Clone, Copy, Debug)]
pub struct Geodesic {
    pub ellipsoid: Ellipsoid,
    pub cfg: GeodesicCfg,
}

impl Default for Geodesic {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl Geodesic {
    #[inline]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            cfg: GeodesicCfg::default(),
        }
    }

    /// Initial azimuth from `a` to `b` and the distance between them.
    pub fn inverse(&self, a: GeoPoint, b: GeoPoint) -> Result<Inverse, GeodesicError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(GeodesicError::NonFinite("inverse endpoints"));
        }
        if (a.lon - b.lon).abs() < COINCIDENT_EPS_DEG && (a.lat - b.lat).abs() < COINCIDENT_EPS_DEG
        {
            return Err(GeodesicError::CoincidentPoints {
                lon: a.lon,
                lat: a.lat,
            });
        }
        let Ellipsoid { a: sa, f } = self.ellipsoid;
        let sb = self.ellipsoid.b();

        let l = wrap_pi((b.lon - a.lon).to_radians());
        let u1 = ((1.0 - f) * a.lat.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * b.lat.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut iter = 0usize;
        let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m, sin_lambda, cos_lambda) = loop {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let t1 = cos_u2 * sin_lambda;
            let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
            if sin_sigma == 0.0 {
                return Err(GeodesicError::CoincidentPoints {
                    lon: a.lon,
                    lat: a.lat,
                });
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // equatorial line: cos²α = 0
            let cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let prev = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
            iter += 1;
            if (lambda - prev).abs() < self.cfg.eps {
                let (sin_lambda, cos_lambda) = lambda.sin_cos();
                break (
                    sin_sigma,
                    cos_sigma,
                    sigma,
                    cos_sq_alpha,
                    cos_2sigma_m,
                    sin_lambda,
                    cos_lambda,
                );
            }
            if iter >= self.cfg.max_iter || lambda.abs() > PI {
                return Err(GeodesicError::NoConvergence { iterations: iter });
            }
        };

        let u_sq = cos_sq_alpha * (sa * sa - sb * sb) / (sb * sb);
        let (big_a, big_b) = series_ab(u_sq);
        let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        let distance = sb * big_a * (sigma - delta_sigma);
        let azimuth = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);

        Ok(Inverse {
            azimuth: wrap_pi(azimuth),
            distance: distance.max(0.0),
        })
    }

    /// Destination reached from `start` after `distance` meters at initial `azimuth`.
    pub fn direct(
        &self,
        start: GeoPoint,
        distance: f64,
        azimuth: f64,
    ) -> Result<GeoPoint, GeodesicError> {
        if !start.is_finite() || !distance.is_finite() || !azimuth.is_finite() {
            return Err(GeodesicError::NonFinite("direct arguments"));
        }
        if distance < 0.0 {
            return Err(GeodesicError::NegativeDistance(distance));
        }
        if distance == 0.0 {
            return Ok(start);
        }
        let Ellipsoid { a: sa, f } = self.ellipsoid;
        let sb = self.ellipsoid.b();

        let (sin_alpha1, cos_alpha1) = azimuth.sin_cos();
        let tan_u1 = (1.0 - f) * start.lat.to_radians().tan();
        let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
        let sin_u1 = tan_u1 * cos_u1;
        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (sa * sa - sb * sb) / (sb * sb);
        let (big_a, big_b) = series_ab(u_sq);

        let sigma0 = distance / (sb * big_a);
        let mut sigma = sigma0;
        let mut iter = 0usize;
        let (sin_sigma, cos_sigma, cos_2sigma_m) = loop {
            let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            let next = sigma0 + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            iter += 1;
            if (next - sigma).abs() < self.cfg.eps || iter >= self.cfg.max_iter {
                sigma = next;
                let (sin_sigma, cos_sigma) = sigma.sin_cos();
                break (sin_sigma, cos_sigma, (2.0 * sigma1 + sigma).cos());
            }
            sigma = next;
        };

        let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
        let lambda =
            (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let l = lambda
            - (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
        let lon2 = wrap_pi(start.lon.to_radians() + l);

        Ok(GeoPoint::new(lon2.to_degrees(), lat2.to_degrees()))
    }
}

/// Vincenty's series coefficients A and B for a given u².
#[inline]
fn series_ab(u_sq: f64) -> (f64, f64) {
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (a, b)
}

#[inline]
fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * c2)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * c2)))
}

/// Wrap an angle into (-π, π].
#[inline]
pub fn wrap_pi(x: f64) -> f64 {
    let mut y = x.rem_euclid(2.0 * PI);
    if y > PI {
        y -= 2.0 * PI;
    }
    y
}
