//! Physical constants and tuning defaults.

// --- Earth model ---

/// Mean Earth radius in meters (spherical model, no datum transform).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Hard ceiling on ray length in meters, regardless of viewport size.
/// The curvature model's small-angle approximation is only trusted up to here.
pub const MAX_LINE_LENGTH_M: f64 = 100_000.0;

// --- Observer ---

/// Default observer eye height above terrain (meters).
pub const DEFAULT_OBSERVER_HEIGHT_M: f64 = 1.8;

// --- Full sweep ---

/// Default angular step between rays for a full sweep (degrees).
pub const DEFAULT_DEGREE_STEP: f64 = 0.5;

/// Default number of sample intervals per ray (the ray gets one more sample than this).
pub const DEFAULT_SAMPLE_COUNT: usize = 800;

// --- Progressive sweep ---

/// Default number of new bearings cast per progressive batch.
pub const DEFAULT_BATCH_SIZE: usize = 45;

/// Default number of distinct bearings a progressive sweep aims for.
pub const DEFAULT_TARGET_ANGLE_COUNT: usize = 3000;

/// Default pause between progressive batches (milliseconds).
pub const DEFAULT_BATCH_DELAY_MS: u64 = 10;

/// Default quiet period before a restart request actually launches a sweep (milliseconds).
pub const DEFAULT_RESTART_DEBOUNCE_MS: u64 = 100;

/// Default seed for the progressive bearing sampler.
pub const DEFAULT_SEED: u64 = 42;

/// Bearings are deduplicated at one-decimal precision: keys per degree.
pub const BEARING_KEYS_PER_DEGREE: f64 = 10.0;

/// Number of distinct bearing keys available (360 degrees at 0.1 degree).
pub const MAX_DISTINCT_BEARINGS: usize = 3600;
