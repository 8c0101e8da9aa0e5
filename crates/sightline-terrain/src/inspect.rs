//! Point inspection: distance, bearing and elevation angle from the observer
//! to an arbitrary target, as shown when hovering over the map.

use std::fmt;

use sightline_core::curvature::curvature_drop;
use sightline_core::geodesy::{bearing, haversine_distance};
use sightline_core::types::{GeoPoint, Observer};

use crate::provider::{ElevationError, ElevationProvider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inspection {
    pub distance_m: f64,
    pub bearing_deg: f64,
    /// Curvature-corrected elevation angle from the observer's eye (radians).
    pub elevation_angle_rad: f64,
}

/// Measure `target` as seen from `observer`. Missing elevations count as sea level.
pub fn inspect<P>(
    provider: &P,
    observer: &Observer,
    target: GeoPoint,
) -> Result<Inspection, ElevationError>
where
    P: ElevationProvider + ?Sized,
{
    let distance_m = haversine_distance(observer.position, target);
    let bearing_deg = bearing(observer.position, target);

    let eye = provider.elevation_at(observer.position)?.unwrap_or(0.0) + observer.height;
    let ground = provider.elevation_at(target)?.unwrap_or(0.0) - curvature_drop(distance_m);

    Ok(Inspection {
        distance_m,
        bearing_deg,
        elevation_angle_rad: (ground - eye).atan2(distance_m),
    })
}

/// `"850m"` below one kilometer, `"12.3km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Radians rendered as degrees with one decimal.
pub fn format_angle(radians: f64) -> String {
    format!("{:.1}°", radians.to_degrees())
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distance: {}", format_distance(self.distance_m))?;
        writeln!(f, "Bearing: {:.1}°", self.bearing_deg)?;
        write!(f, "Elevation angle: {}", format_angle(self.elevation_angle_rad))
    }
}
