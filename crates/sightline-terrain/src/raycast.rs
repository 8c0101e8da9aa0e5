//! Directional ray casting with horizon tracking.
//!
//! Samples terrain along a geodesic ray from the observer, applies the
//! curvature drop, and tracks the running maximum elevation angle. A sample
//! whose angle falls strictly below that horizon is hidden; consecutive hidden
//! samples are merged into one blocked [`Segment`].

use sightline_core::curvature::curvature_drop;
use sightline_core::geodesy::destination_point;
use sightline_core::types::{GeoPoint, Ray, Sample, Segment};
use tracing::warn;

use crate::provider::{ElevationError, ElevationProvider};

/// Full result of one ray cast.
#[derive(Debug, Clone, PartialEq)]
pub struct RayProfile {
    pub bearing: f64,
    pub samples: Vec<Sample>,
    pub segments: Vec<Segment>,
    /// Highest elevation angle reached along the ray (radians).
    pub horizon_angle: f64,
    /// Samples for which the provider had no data (treated as sea level).
    pub no_data_samples: usize,
}

/// Cast `ray` and return its blocked segments, ordered by distance.
///
/// A provider fault aborts the ray and yields no segments.
pub fn cast_ray<P>(
    provider: &P,
    ray: &Ray,
    observer_height: f64,
    sample_count: usize,
) -> Vec<Segment>
where
    P: ElevationProvider + ?Sized,
{
    match trace_ray(provider, ray, observer_height, sample_count) {
        Ok(profile) => profile.segments,
        Err(err) => {
            warn!(bearing = ray.bearing, %err, "ray aborted");
            Vec::new()
        }
    }
}

/// Cast `ray` keeping every sample. `sample_count` intervals give `sample_count + 1` samples.
pub fn trace_ray<P>(
    provider: &P,
    ray: &Ray,
    observer_height: f64,
    sample_count: usize,
) -> Result<RayProfile, ElevationError>
where
    P: ElevationProvider + ?Sized,
{
    let mut no_data_samples = 0usize;
    let mut elevation_at = |point: GeoPoint| -> Result<f64, ElevationError> {
        Ok(provider.elevation_at(point)?.unwrap_or_else(|| {
            no_data_samples += 1;
            0.0
        }))
    };

    let origin_elevation = elevation_at(ray.origin)?;
    let eye = origin_elevation + observer_height;

    let usable = ray.max_distance.is_finite() && ray.max_distance > 0.0;
    let last = if usable { sample_count } else { 0 };

    let mut samples: Vec<Sample> = Vec::with_capacity(last + 1);
    let mut segments = Vec::new();
    let mut open: Option<Segment> = None;
    let mut max_angle = f64::NEG_INFINITY;

    // i = 0 is the origin itself; it seeds the horizon and is never blocked
    for i in 0..=last {
        let (distance, point, elevation) = if i == 0 {
            (0.0, ray.origin, origin_elevation)
        } else {
            let distance = ray.max_distance * i as f64 / last as f64;
            let point = destination_point(ray.origin, ray.bearing, distance);
            (distance, point, elevation_at(point)?)
        };
        let adjusted_elevation = elevation - curvature_drop(distance);
        let angle = (adjusted_elevation - eye).atan2(distance);

        // Ties stay visible
        let blocked = angle < max_angle;
        if blocked {
            match open.as_mut() {
                Some(segment) => {
                    segment.end = point;
                    segment.end_index = i;
                }
                None => {
                    let (start, start_index) = samples
                        .last()
                        .map_or((point, i), |previous| (previous.point, previous.index));
                    open = Some(Segment {
                        start,
                        end: point,
                        bearing: ray.bearing,
                        start_index,
                        end_index: i,
                        blocked: true,
                    });
                }
            }
        } else {
            segments.extend(open.take());
            max_angle = angle;
        }

        samples.push(Sample {
            index: i,
            distance,
            point,
            elevation,
            adjusted_elevation,
            angle,
            blocked,
        });
    }
    segments.extend(open);

    Ok(RayProfile {
        bearing: ray.bearing,
        samples,
        segments,
        horizon_angle: max_angle,
        no_data_samples,
    })
}
