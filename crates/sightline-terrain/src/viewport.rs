//! Viewport bound: how far rays need to reach to cover the visible map.

use sightline_core::constants::MAX_LINE_LENGTH_M;
use sightline_core::geodesy::haversine_distance;
use sightline_core::types::GeoPoint;

/// Geographic bounding box of the visible map area (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Viewport {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Square viewport of half-width `half_extent_deg` around `center`.
    pub fn around(center: GeoPoint, half_extent_deg: f64) -> Self {
        Self::new(
            center.lon - half_extent_deg,
            center.lat - half_extent_deg,
            center.lon + half_extent_deg,
            center.lat + half_extent_deg,
        )
    }

    /// NE, NW, SE, SW corners.
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            GeoPoint::new(self.east, self.north),
            GeoPoint::new(self.west, self.north),
            GeoPoint::new(self.east, self.south),
            GeoPoint::new(self.west, self.south),
        ]
    }
}

/// Where a sweep gets its vantage point and viewport from.
pub trait ViewportSource {
    fn viewport_corners(&self) -> [GeoPoint; 4];
    fn vantage_point(&self) -> Option<GeoPoint>;
}

/// Distance to the farthest viewport corner, capped at [`MAX_LINE_LENGTH_M`].
pub fn max_ray_distance(vantage: GeoPoint, corners: &[GeoPoint; 4]) -> f64 {
    corners
        .iter()
        .map(|&corner| haversine_distance(vantage, corner))
        .fold(0.0, f64::max)
        .min(MAX_LINE_LENGTH_M)
}
