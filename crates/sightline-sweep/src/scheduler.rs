//! Progressive sweep scheduler.
//!
//! Instead of stepping every bearing up front, the scheduler casts batches of
//! pseudo-random, deduplicated bearings. Each batch grows the accumulated
//! [`VisibilitySet`]; the picture sharpens until the target bearing count is
//! reached. The host decides when batches run (see `worker`), so cancellation
//! is only ever observed between batches and a started ray always completes.

use std::collections::HashSet;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use sightline_core::config::SweepConfig;
use sightline_core::constants::MAX_DISTINCT_BEARINGS;
use sightline_core::types::{bearing_key, GeoPoint, Observer, Ray, VisibilitySet};
use sightline_terrain::provider::ElevationProvider;
use sightline_terrain::raycast::cast_ray;

use crate::update::{SweepState, VisibilityUpdate};

/// Everything a progressive run needs to know up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPlan {
    pub observer: Observer,
    pub max_distance: f64,
    pub target_angle_count: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub sample_count: usize,
}

impl SweepPlan {
    /// Plan for `vantage` using the configured height, batch and sampling parameters.
    pub fn from_config(vantage: GeoPoint, max_distance: f64, config: &SweepConfig) -> Self {
        Self {
            observer: Observer::new(vantage, config.observer_height),
            max_distance,
            target_angle_count: config.target_angle_count,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
            sample_count: config.sample_count,
        }
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rays cast in this batch.
    pub cast: usize,
    /// Blocked segments those rays added.
    pub new_segments: usize,
    pub distinct_bearings: usize,
    pub state: SweepState,
}

/// Owns the state of one progressive run at a time.
pub struct ProgressiveScheduler {
    state: SweepState,
    plan: Option<SweepPlan>,
    visibility: VisibilitySet,
    sampled: HashSet<u32>,
    rng: ChaCha8Rng,
    generation: u64,
    batches: u64,
}

impl ProgressiveScheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            state: SweepState::Idle,
            plan: None,
            visibility: VisibilitySet::new(),
            sampled: HashSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            generation: 0,
            batches: 0,
        }
    }

    /// Begin a fresh run, discarding everything from the previous one.
    ///
    /// A run still in progress is cancelled first. Returns the new generation.
    pub fn start(&mut self, mut plan: SweepPlan) -> u64 {
        if self.state == SweepState::Running {
            self.cancel();
        }

        if plan.target_angle_count > MAX_DISTINCT_BEARINGS {
            warn!(
                requested = plan.target_angle_count,
                max = MAX_DISTINCT_BEARINGS,
                "target bearing count exceeds distinct bearings at 0.1°, clamping"
            );
            plan.target_angle_count = MAX_DISTINCT_BEARINGS;
        }
        plan.batch_size = plan.batch_size.max(1);

        self.visibility.clear();
        self.sampled.clear();
        self.batches = 0;
        self.generation += 1;
        self.plan = Some(plan);
        self.state = SweepState::Running;

        info!(
            generation = self.generation,
            lon = plan.observer.position.lon,
            lat = plan.observer.position.lat,
            max_distance = plan.max_distance,
            target = plan.target_angle_count,
            "progressive sweep started"
        );
        self.generation
    }

    /// Stop the current run. The partial set stays available.
    ///
    /// Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        if self.state != SweepState::Running {
            return false;
        }
        self.state = SweepState::Cancelled;
        info!(
            generation = self.generation,
            bearings = self.sampled.len(),
            "progressive sweep cancelled"
        );
        true
    }

    /// Cast up to one batch of new bearings. No-op unless running.
    pub fn run_batch<P>(&mut self, provider: &P) -> BatchReport
    where
        P: ElevationProvider + ?Sized,
    {
        let Some(plan) = self.plan.filter(|_| self.state == SweepState::Running) else {
            return BatchReport {
                distinct_bearings: self.sampled.len(),
                state: self.state,
                ..BatchReport::default()
            };
        };

        let mut cast = 0usize;
        let before = self.visibility.len();
        while cast < plan.batch_size && self.sampled.len() < plan.target_angle_count {
            let bearing = self.rng.gen_range(0.0..360.0);
            if !self.sampled.insert(bearing_key(bearing)) {
                continue;
            }
            cast += 1;

            let ray = Ray::new(plan.observer.position, bearing, plan.max_distance);
            let segments = cast_ray(provider, &ray, plan.observer.height, plan.sample_count);
            self.visibility.extend_ray(bearing, segments);
        }
        self.batches += 1;

        if self.sampled.len() >= plan.target_angle_count {
            self.state = SweepState::Completed;
            info!(
                generation = self.generation,
                batches = self.batches,
                segments = self.visibility.len(),
                "progressive sweep complete"
            );
        }

        let report = BatchReport {
            cast,
            new_segments: self.visibility.len() - before,
            distinct_bearings: self.sampled.len(),
            state: self.state,
        };
        debug!(
            generation = self.generation,
            batch = self.batches,
            cast = report.cast,
            new_segments = report.new_segments,
            distinct = report.distinct_bearings,
            "batch done"
        );
        report
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn plan(&self) -> Option<&SweepPlan> {
        self.plan.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn distinct_bearings(&self) -> usize {
        self.sampled.len()
    }

    pub fn visibility(&self) -> &VisibilitySet {
        &self.visibility
    }

    /// Snapshot of the accumulated picture for renderers.
    pub fn update(&self) -> VisibilityUpdate {
        VisibilityUpdate {
            generation: self.generation,
            state: self.state,
            distinct_bearings: self.sampled.len(),
            visibility: self.visibility.clone(),
        }
    }
}

impl Default for ProgressiveScheduler {
    fn default() -> Self {
        Self::new(sightline_core::constants::DEFAULT_SEED)
    }
}
