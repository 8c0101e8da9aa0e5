//! Earth curvature correction.

use crate::constants::EARTH_RADIUS_M;

/// Vertical drop of the Earth's surface below the observer's tangent plane
/// at horizontal distance `distance_m`: `d² / 2R`.
///
/// Small-angle approximation, accurate up to about `MAX_LINE_LENGTH_M`.
/// No atmospheric refraction term.
pub fn curvature_drop(distance_m: f64) -> f64 {
    distance_m * distance_m / (2.0 * EARTH_RADIUS_M)
}
