//! Fundamental geographic and visibility types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::BEARING_KEYS_PER_DEGREE;

/// Terrain elevation in meters above the reference surface.
pub type Elevation = f64;

/// Geographic point in degrees (WGS84-like, spherical model).
///
/// Longitude lies in [-180, 180), latitude in [-90, 90].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Build a point, normalizing longitude and clamping latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: normalize_longitude(lon),
            lat: lat.clamp(-90.0, 90.0),
        }
    }

    /// `[lon, lat]` pair, the vertex order used by GeoJSON.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Wrap a longitude into [-180, 180).
pub fn normalize_longitude(lon: f64) -> f64 {
    let shifted = (lon + 180.0).rem_euclid(360.0);
    // Same round-up as normalize_bearing: just below -180 must land on -180, not 180
    if shifted >= 360.0 {
        -180.0
    } else {
        shifted - 180.0
    }
}

/// Wrap a bearing into [0, 360).
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Dedup key for a bearing rounded to one decimal place, wrapped so 360.0 == 0.0.
pub fn bearing_key(bearing: f64) -> u32 {
    let steps = 360.0 * BEARING_KEYS_PER_DEGREE;
    ((bearing * BEARING_KEYS_PER_DEGREE).round().rem_euclid(steps)) as u32
}

/// Vantage point plus eye height above the terrain at that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub position: GeoPoint,
    /// Meters above terrain.
    pub height: f64,
}

impl Observer {
    pub fn new(position: GeoPoint, height: f64) -> Self {
        Self { position, height }
    }
}

/// One directional ray cast from an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: GeoPoint,
    /// Degrees clockwise from north, [0, 360).
    pub bearing: f64,
    /// Meters.
    pub max_distance: f64,
}

impl Ray {
    pub fn new(origin: GeoPoint, bearing: f64, max_distance: f64) -> Self {
        Self {
            origin,
            bearing: normalize_bearing(bearing),
            max_distance,
        }
    }
}

/// A point sampled along a ray during one cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: usize,
    /// Horizontal distance from the ray origin (meters).
    pub distance: f64,
    pub point: GeoPoint,
    /// Raw terrain elevation (meters).
    pub elevation: Elevation,
    /// Elevation after subtracting the curvature drop (meters).
    pub adjusted_elevation: Elevation,
    /// Elevation angle from the observer's eye (radians).
    pub angle: f64,
    pub blocked: bool,
}

/// A contiguous run of blocked samples along one ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Bearing of the ray this segment lies on (degrees).
    pub bearing: f64,
    /// Sample index of `start` (the last visible sample before the run).
    pub start_index: usize,
    /// Sample index of `end` (the last blocked sample of the run).
    pub end_index: usize,
    pub blocked: bool,
}

/// Accumulated blocked segments of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySet {
    segments: Vec<Segment>,
    /// Dedup keys (tenths of a degree) of every bearing cast so far.
    bearings: BTreeSet<u32>,
    /// Rays recorded, including ones whose bearings share a key.
    rays: usize,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one cast ray and its blocked segments. Segments are never removed.
    pub fn extend_ray(&mut self, bearing: f64, segments: impl IntoIterator<Item = Segment>) {
        self.bearings.insert(bearing_key(bearing));
        self.rays += 1;
        self.segments
            .extend(segments.into_iter().filter(|segment| segment.blocked));
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of distinct (one-decimal) bearings that contributed.
    ///
    /// Steps finer than 0.1° share keys, so this can be below [`ray_count`](Self::ray_count).
    pub fn bearing_count(&self) -> usize {
        self.bearings.len()
    }

    /// Number of rays recorded.
    pub fn ray_count(&self) -> usize {
        self.rays
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.bearings.clear();
        self.rays = 0;
    }
}
