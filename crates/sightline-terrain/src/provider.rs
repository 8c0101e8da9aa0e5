//! Elevation provider interface and simple in-memory providers.

use std::fmt;

use sightline_core::types::{Elevation, GeoPoint};

/// A terrain query source.
///
/// `Ok(None)` means "no data here" (dataset not loaded, outside coverage, void cell).
/// `Err` means the provider itself failed; callers abort the current ray.
pub trait ElevationProvider {
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError>;
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for &P {
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        (**self).elevation_at(point)
    }
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for std::sync::Arc<P> {
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        (**self).elevation_at(point)
    }
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for Box<P> {
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        (**self).elevation_at(point)
    }
}

/// Provider fault while answering an elevation query.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationError {
    pub point: GeoPoint,
    pub message: String,
}

impl ElevationError {
    pub fn new(point: GeoPoint, message: impl Into<String>) -> Self {
        Self {
            point,
            message: message.into(),
        }
    }
}

impl fmt::Display for ElevationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "elevation query failed at ({:.6}, {:.6}): {}",
            self.point.lon, self.point.lat, self.message
        )
    }
}

impl std::error::Error for ElevationError {}

/// Constant elevation everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    pub elevation: Elevation,
}

impl FlatTerrain {
    pub fn new(elevation: Elevation) -> Self {
        Self { elevation }
    }
}

impl ElevationProvider for FlatTerrain {
    fn elevation_at(&self, _point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        Ok(Some(self.elevation))
    }
}

/// Terrain that has not loaded yet: every query has no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unloaded;

impl ElevationProvider for Unloaded {
    fn elevation_at(&self, _point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        Ok(None)
    }
}

/// Provider backed by a closure, for synthetic terrain.
pub struct FnTerrain<F>(pub F);

impl<F> ElevationProvider for FnTerrain<F>
where
    F: Fn(GeoPoint) -> Result<Option<Elevation>, ElevationError>,
{
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        (self.0)(point)
    }
}
