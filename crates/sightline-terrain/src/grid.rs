//! TerrainGrid: geographic heightmap with bilinear elevation queries.

use sightline_core::types::{Elevation, GeoPoint};

use crate::provider::{ElevationError, ElevationProvider};

/// Cell value meaning "no data" (HGT void convention).
pub const VOID_ELEVATION: i16 = i16::MIN;

/// Terrain grid header metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainHeader {
    /// Southwest corner latitude (degrees).
    pub origin_lat: f64,
    /// Southwest corner longitude (degrees).
    pub origin_lon: f64,
    /// Arc-seconds per grid cell.
    pub cell_size: f64,
    /// Number of columns (west to east).
    pub width: u32,
    /// Number of rows (north to south).
    pub height: u32,
    /// Minimum elevation in the grid (meters, voids excluded).
    pub min_elevation: i16,
    /// Maximum elevation in the grid (meters).
    pub max_elevation: i16,
}

impl TerrainHeader {
    /// North edge latitude (degrees).
    pub fn north_lat(&self) -> f64 {
        self.origin_lat + (self.height as f64 * self.cell_size) / 3600.0
    }

    /// East edge longitude (degrees, may exceed 180 for grids crossing the antimeridian).
    pub fn east_lon(&self) -> f64 {
        self.origin_lon + (self.width as f64 * self.cell_size) / 3600.0
    }

    /// Center of the grid.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.origin_lon + self.east_lon()) / 2.0,
            (self.origin_lat + self.north_lat()) / 2.0,
        )
    }
}

/// Loaded terrain heightmap.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub header: TerrainHeader,
    /// Elevation values in meters, row-major (north-to-south, west-to-east).
    pub elevations: Vec<i16>,
}

impl TerrainGrid {
    /// Create a TerrainGrid from pre-loaded data.
    pub fn new(header: TerrainHeader, elevations: Vec<i16>) -> Self {
        Self { header, elevations }
    }

    /// Build a grid by evaluating `elevation(lat, lon)` at every cell.
    /// `min_elevation`/`max_elevation` are computed from the result.
    pub fn generate(
        origin_lat: f64,
        origin_lon: f64,
        cell_size: f64,
        width: u32,
        height: u32,
        elevation: impl Fn(f64, f64) -> f64,
    ) -> Self {
        let mut elevations = Vec::with_capacity(cell_count(width, height));
        let north = origin_lat + (height as f64 * cell_size) / 3600.0;
        for row in 0..height {
            let lat = north - row as f64 * cell_size / 3600.0;
            for col in 0..width {
                let lon = origin_lon + col as f64 * cell_size / 3600.0;
                let e = elevation(lat, lon).round().clamp(-32767.0, 32767.0) as i16;
                elevations.push(e);
            }
        }
        let (min_elevation, max_elevation) = elevation_range(&elevations);

        Self::new(
            TerrainHeader {
                origin_lat,
                origin_lon,
                cell_size,
                width,
                height,
                min_elevation,
                max_elevation,
            },
            elevations,
        )
    }

    /// Convert lat/lon to grid row/col (fractional).
    /// Returns None if outside grid bounds.
    fn geo_to_grid(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let h = &self.header;

        // Column: west-to-east, wrapped so grids may straddle the antimeridian
        let col = (lon - h.origin_lon).rem_euclid(360.0) * 3600.0 / h.cell_size;
        // Row: north-to-south (row 0 = north edge)
        let row = (h.north_lat() - lat) * 3600.0 / h.cell_size;

        if col < 0.0 || row < 0.0 || col >= h.width as f64 || row >= h.height as f64 {
            return None;
        }

        Some((row, col))
    }

    /// Raw elevation at integer grid coordinates. None for voids.
    fn raw_elevation(&self, row: usize, col: usize) -> Option<i16> {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return None;
        }
        let e = *self.elevations.get(row * h.width as usize + col)?;
        (e != VOID_ELEVATION).then_some(e)
    }

    /// Elevation at lat/lon with bilinear interpolation.
    /// Returns None outside the grid or when a contributing cell is void.
    pub fn elevation_at_geo(&self, lat: f64, lon: f64) -> Option<Elevation> {
        let (row, col) = self.geo_to_grid(lat, lon)?;
        self.bilinear(row, col)
    }

    /// Whether the point falls inside the grid's coverage.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.geo_to_grid(point.lat, point.lon).is_some()
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> Option<f64> {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_elevation(r0, c0)? as f64;
        let e01 = self.raw_elevation(r0, c1)? as f64;
        let e10 = self.raw_elevation(r1, c0)? as f64;
        let e11 = self.raw_elevation(r1, c1)? as f64;

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        Some(top * (1.0 - fr) + bot * fr)
    }

    /// Downsample the elevation grid to a target resolution.
    /// Returns a new flat Vec<i16> of size target_width * target_height.
    pub fn downsample(&self, target_width: u32, target_height: u32) -> Vec<i16> {
        let h = &self.header;
        let mut result = Vec::with_capacity(cell_count(target_width, target_height));

        for tr in 0..target_height {
            for tc in 0..target_width {
                // Map target cell to source cell
                let sr = (tr as f64 / target_height as f64) * h.height as f64;
                let sc = (tc as f64 / target_width as f64) * h.width as f64;
                let e = self
                    .bilinear(sr, sc)
                    .map_or(VOID_ELEVATION, |e| e.round() as i16);
                result.push(e);
            }
        }

        result
    }
}

impl ElevationProvider for TerrainGrid {
    fn elevation_at(&self, point: GeoPoint) -> Result<Option<Elevation>, ElevationError> {
        Ok(self.elevation_at_geo(point.lat, point.lon))
    }
}

/// Cells in a `width`×`height` grid, multiplied in `usize` so large grids don't wrap `u32`.
pub fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// (min, max) over non-void cells; (0, 0) for an all-void grid.
pub fn elevation_range(elevations: &[i16]) -> (i16, i16) {
    let mut valid = elevations.iter().copied().filter(|&e| e != VOID_ELEVATION);
    let Some(first) = valid.next() else {
        return (0, 0);
    };
    valid.fold((first, first), |(lo, hi), e| (lo.min(e), hi.max(e)))
}
