//! Full deterministic sweep over evenly stepped bearings.

use sightline_core::config::SweepConfig;
use sightline_core::types::{Observer, Ray, VisibilitySet};
use sightline_terrain::provider::ElevationProvider;
use sightline_terrain::raycast::cast_ray;
use sightline_terrain::viewport::{max_ray_distance, ViewportSource};
use tracing::{info, warn};

/// Bearings `0, step, 2·step, …` strictly below 360°.
///
/// Computed as `k × step` so long sweeps do not accumulate drift.
/// Empty for a non-finite or non-positive step.
pub fn sweep_bearings(degree_step: f64) -> impl Iterator<Item = f64> {
    let valid = degree_step.is_finite() && degree_step > 0.0;
    (0u64..)
        .map(move |k| k as f64 * degree_step)
        .take_while(move |&bearing| valid && bearing < 360.0)
}

/// Cast one ray per stepped bearing and collect every blocked segment,
/// ordered by bearing then by distance along the ray.
pub fn full_sweep<P>(
    provider: &P,
    observer: &Observer,
    max_distance: f64,
    degree_step: f64,
    sample_count: usize,
) -> VisibilitySet
where
    P: ElevationProvider + ?Sized,
{
    let mut visibility = VisibilitySet::new();
    if !(degree_step.is_finite() && degree_step > 0.0) {
        warn!(degree_step, "invalid degree step, skipping sweep");
        return visibility;
    }

    for bearing in sweep_bearings(degree_step) {
        let ray = Ray::new(observer.position, bearing, max_distance);
        let segments = cast_ray(provider, &ray, observer.height, sample_count);
        visibility.extend_ray(bearing, segments);
    }

    info!(
        rays = visibility.ray_count(),
        bearing_keys = visibility.bearing_count(),
        segments = visibility.len(),
        max_distance,
        "full sweep complete"
    );
    visibility
}

/// Full sweep from whatever vantage point and viewport `source` currently shows.
///
/// `None` when no vantage point is set.
pub fn sweep_from_source<S, P>(
    source: &S,
    provider: &P,
    config: &SweepConfig,
) -> Option<VisibilitySet>
where
    S: ViewportSource + ?Sized,
    P: ElevationProvider + ?Sized,
{
    let vantage = source.vantage_point()?;
    let max_distance = max_ray_distance(vantage, &source.viewport_corners());
    let observer = Observer::new(vantage, config.observer_height);
    Some(full_sweep(
        provider,
        &observer,
        max_distance,
        config.degree_step,
        config.sample_count,
    ))
}
