//! Terrain side of sightline.
//!
//! Elevation providers, heightmap loading, ray casting with horizon
//! tracking, the viewport bound and point inspection.

pub use sightline_core as core;

pub mod dtrn;
pub mod grid;
pub mod hgt;
pub mod inspect;
pub mod provider;
pub mod raycast;
pub mod viewport;

// Re-export key types for convenience.
pub use grid::{TerrainGrid, TerrainHeader};
pub use provider::{ElevationError, ElevationProvider, FlatTerrain, FnTerrain, Unloaded};
pub use raycast::{cast_ray, trace_ray, RayProfile};
pub use viewport::{max_ray_distance, Viewport, ViewportSource};
