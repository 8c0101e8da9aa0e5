//! Spherical-Earth geodesy: direct problem, great-circle distance and bearing.
//!
//! All angles are degrees at the API boundary, radians internally.
//! Polar origins (exactly ±90° latitude) are not special-cased.

use crate::constants::EARTH_RADIUS_M;
use crate::types::{normalize_bearing, GeoPoint};

/// Point reached by travelling `distance_m` from `origin` along the initial `bearing_deg`.
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let delta = distance_m / EARTH_RADIUS_M;
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let theta = bearing_deg.to_radians();

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let sin_lat2 = (sin_lat1 * cos_delta + cos_lat1 * sin_delta * theta.cos()).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();

    let y = theta.sin() * sin_delta * cos_lat1;
    let x = cos_delta - sin_lat1 * sin_lat2;
    let lon2 = lon1 + y.atan2(x);

    GeoPoint::new(lon2.to_degrees(), lat2.to_degrees())
}

/// Great-circle distance between two points (meters).
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial great-circle bearing from `a` to `b`, degrees in [0, 360).
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTER_CIRCUMFERENCE: f64 = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_M;

    #[test]
    fn test_destination_quarter_circumference_east() {
        let p = destination_point(GeoPoint::new(0.0, 0.0), 90.0, QUARTER_CIRCUMFERENCE);
        assert!((p.lon - 90.0).abs() < 1e-6, "lon: {}", p.lon);
        assert!(p.lat.abs() < 1e-6, "lat: {}", p.lat);
    }

    #[test]
    fn test_destination_zero_distance_is_origin() {
        let origin = GeoPoint::new(56.2, 26.5);
        for bearing in [0.0, 90.0, 180.0, 270.0, 360.0] {
            let p = destination_point(origin, bearing, 0.0);
            assert!(p.is_finite());
            assert!((p.lon - origin.lon).abs() < 1e-12);
            assert!((p.lat - origin.lat).abs() < 1e-12);
        }
    }

    #[test]
    fn test_destination_cardinal_bearings_finite() {
        let origin = GeoPoint::new(10.0, 45.0);
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            let p = destination_point(origin, bearing, 50_000.0);
            assert!(p.is_finite(), "NaN at bearing {bearing}");
        }
        let north = destination_point(origin, 0.0, 111_195.0);
        assert!((north.lat - 46.0).abs() < 1e-3, "lat: {}", north.lat);
        assert!((north.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_destination_wraps_antimeridian() {
        let origin = GeoPoint::new(179.9, 0.0);
        let p = destination_point(origin, 90.0, 50_000.0);
        assert!(p.lon < -179.0 && p.lon >= -180.0, "lon: {}", p.lon);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111_194.9).abs() < 1.0, "distance: {d}");
    }

    #[test]
    fn test_haversine_inverts_destination() {
        let origin = GeoPoint::new(-3.2, 55.9);
        let p = destination_point(origin, 37.0, 42_000.0);
        let d = haversine_distance(origin, p);
        assert!((d - 42_000.0).abs() < 1e-3, "distance: {d}");
    }

    #[test]
    fn test_bearing_cardinals() {
        let o = GeoPoint::new(0.0, 0.0);
        assert!(bearing(o, GeoPoint::new(0.0, 1.0)).abs() < 1e-9);
        assert!((bearing(o, GeoPoint::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(o, GeoPoint::new(0.0, -1.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(o, GeoPoint::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_inverts_destination() {
        let origin = GeoPoint::new(7.5, 46.0);
        let p = destination_point(origin, 123.4, 5_000.0);
        assert!((bearing(origin, p) - 123.4).abs() < 1e-6);
    }
}
