use std::time::Duration;

use sightline_core::config::SweepConfig;
use sightline_core::geodesy::{bearing, haversine_distance};
use sightline_core::types::{GeoPoint, Observer};
use sightline_terrain::provider::{ElevationError, FlatTerrain, FnTerrain, Unloaded};
use sightline_terrain::viewport::Viewport;

use crate::scheduler::{ProgressiveScheduler, SweepPlan};
use crate::session::ViewshedSession;
use crate::sweep::{full_sweep, sweep_bearings, sweep_from_source};
use crate::update::{SweepState, VisibilityUpdate};

fn origin() -> GeoPoint {
    GeoPoint::new(0.0, 0.0)
}

type Lookup = Result<Option<f64>, ElevationError>;

/// Flat ground at 0 m with a 50 m wall 495..525 m out, between bearings 80° and 100°.
fn wall_terrain() -> FnTerrain<impl Fn(GeoPoint) -> Lookup> {
    FnTerrain(|p: GeoPoint| {
        let d = haversine_distance(origin(), p);
        if d < 1.0 {
            return Ok(Some(0.0));
        }
        let b = bearing(origin(), p);
        let on_wall = (495.0..=525.0).contains(&d) && (79.5..=100.5).contains(&b);
        Ok(Some(if on_wall { 50.0 } else { 0.0 }))
    })
}

fn plan_at(lon: f64, target_angle_count: usize, batch_size: usize) -> SweepPlan {
    SweepPlan {
        observer: Observer::new(GeoPoint::new(lon, 0.0), 2.0),
        max_distance: 20_000.0,
        target_angle_count,
        batch_size,
        batch_delay: Duration::ZERO,
        sample_count: 20,
    }
}

// ---- Full sweep ----

#[test]
fn test_sweep_bearings_step() {
    let half: Vec<f64> = sweep_bearings(0.5).collect();
    assert_eq!(half.len(), 720);
    assert_eq!(half[0], 0.0);
    assert_eq!(half[719], 359.5);

    assert_eq!(sweep_bearings(7.0).count(), 52);
    assert_eq!(sweep_bearings(0.0).count(), 0);
    assert_eq!(sweep_bearings(-1.0).count(), 0);
    assert_eq!(sweep_bearings(f64::NAN).count(), 0);
}

#[test]
fn test_full_sweep_wall_scenario() {
    let observer = Observer::new(origin(), 2.0);
    let set = full_sweep(&wall_terrain(), &observer, 2_000.0, 1.0, 200);
    assert_eq!(set.bearing_count(), 360);

    let mut blocked_bearings: Vec<u32> = set
        .segments()
        .iter()
        .map(|s| s.bearing.round() as u32)
        .collect();
    blocked_bearings.dedup();
    assert_eq!(blocked_bearings, (80..=100).collect::<Vec<u32>>());

    for segment in set.segments() {
        assert!(segment.blocked);
        let start = haversine_distance(origin(), segment.start);
        assert!(start >= 499.0, "bearing {}: blocked from {start} m", segment.bearing);
    }
}

#[test]
fn test_full_sweep_is_idempotent() {
    let observer = Observer::new(origin(), 2.0);
    let a = full_sweep(&wall_terrain(), &observer, 2_000.0, 2.5, 100);
    let b = full_sweep(&wall_terrain(), &observer, 2_000.0, 2.5, 100);
    assert_eq!(
        serde_json::to_string(&a.to_feature_collection()).unwrap(),
        serde_json::to_string(&b.to_feature_collection()).unwrap(),
    );
}

#[test]
fn test_fine_step_counts_every_ray() {
    // 0.05° puts two rays on every one-decimal bearing key
    let config = SweepConfig {
        degree_step: 0.05,
        sample_count: 1,
        ..SweepConfig::default()
    };
    let mut session = ViewshedSession::new(Viewport::around(origin(), 0.01), config);
    session.set_vantage(origin());

    let mut updates: Vec<VisibilityUpdate> = Vec::new();
    let update = session
        .run_full_sweep(&FlatTerrain::new(0.0), &mut updates)
        .unwrap();
    assert_eq!(update.visibility.ray_count(), 7200);
    assert_eq!(update.visibility.bearing_count(), 3600);
    assert_eq!(update.distinct_bearings, 7200);
}

#[test]
fn test_full_sweep_invalid_step_is_empty() {
    let observer = Observer::new(origin(), 2.0);
    for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let set = full_sweep(&wall_terrain(), &observer, 2_000.0, step, 100);
        assert!(set.is_empty());
        assert_eq!(set.bearing_count(), 0);
    }
}

#[test]
fn test_full_sweep_unloaded_terrain() {
    let observer = Observer::new(origin(), 1.8);
    let set = full_sweep(&Unloaded, &observer, 2_000.0, 10.0, 50);
    assert!(set.is_empty());
    assert_eq!(set.bearing_count(), 36);
}

#[test]
fn test_sweep_from_source_needs_vantage() {
    let config = SweepConfig {
        degree_step: 30.0,
        sample_count: 10,
        ..SweepConfig::default()
    };
    let mut session = ViewshedSession::new(Viewport::around(origin(), 0.01), config.clone());
    assert!(sweep_from_source(&session, &FlatTerrain::new(0.0), &config).is_none());

    session.set_vantage(origin());
    let set = sweep_from_source(&session, &FlatTerrain::new(0.0), &config).unwrap();
    assert_eq!(set.bearing_count(), 12);
    // ±0.01° viewport is well inside the horizon
    assert!(set.is_empty());
}

// ---- Progressive scheduler ----

#[test]
fn test_progressive_reaches_target() {
    let mut scheduler = ProgressiveScheduler::new(42);
    assert_eq!(scheduler.start(plan_at(0.0, 100, 45)), 1);

    let mut last_distinct = 0;
    let mut batches = 0;
    while scheduler.state() == SweepState::Running {
        let report = scheduler.run_batch(&FlatTerrain::new(0.0));
        batches += 1;
        assert!(report.cast <= 45);
        assert!(report.distinct_bearings >= last_distinct);
        assert_eq!(
            report.state == SweepState::Completed,
            report.distinct_bearings == 100,
        );
        last_distinct = report.distinct_bearings;
    }

    assert_eq!(batches, 3, "45 + 45 + 10");
    assert_eq!(scheduler.distinct_bearings(), 100);
    assert_eq!(scheduler.visibility().bearing_count(), 100);
    // Every 20 km ray on flat ground runs past the horizon
    assert_eq!(scheduler.visibility().len(), 100);
}

#[test]
fn test_progressive_is_reproducible() {
    let run = |seed: u64| {
        let mut scheduler = ProgressiveScheduler::new(seed);
        scheduler.start(plan_at(0.0, 60, 7));
        while scheduler.state() == SweepState::Running {
            scheduler.run_batch(&wall_terrain());
        }
        serde_json::to_string(&scheduler.update()).unwrap()
    };
    assert_eq!(run(9), run(9));
    assert_ne!(run(9), run(10));
}

#[test]
fn test_run_batch_is_noop_unless_running() {
    let mut scheduler = ProgressiveScheduler::default();
    let report = scheduler.run_batch(&FlatTerrain::new(0.0));
    assert_eq!(report.cast, 0);
    assert_eq!(report.state, SweepState::Idle);

    scheduler.start(plan_at(0.0, 50, 10));
    scheduler.run_batch(&FlatTerrain::new(0.0));
    assert!(scheduler.cancel());
    assert!(!scheduler.cancel());

    let report = scheduler.run_batch(&FlatTerrain::new(0.0));
    assert_eq!(report.cast, 0);
    assert_eq!(report.state, SweepState::Cancelled);
    // Partial picture stays available after cancel
    assert_eq!(scheduler.distinct_bearings(), 10);
}

#[test]
fn test_restart_never_mixes_observers() {
    let mut scheduler = ProgressiveScheduler::new(1);
    scheduler.start(plan_at(0.0, 200, 20));
    scheduler.run_batch(&FlatTerrain::new(0.0));
    assert_eq!(scheduler.distinct_bearings(), 20);

    assert_eq!(scheduler.start(plan_at(50.0, 200, 20)), 2);
    assert_eq!(scheduler.distinct_bearings(), 0);
    assert!(scheduler.visibility().is_empty());

    while scheduler.state() == SweepState::Running {
        scheduler.run_batch(&FlatTerrain::new(0.0));
    }
    let update = scheduler.update();
    assert_eq!(update.generation, 2);
    assert_eq!(update.state, SweepState::Completed);
    for segment in update.visibility.segments() {
        assert!((segment.start.lon - 50.0).abs() < 0.5);
    }
}

#[test]
fn test_target_clamped_to_distinct_bearings() {
    let mut scheduler = ProgressiveScheduler::new(3);
    let mut plan = plan_at(0.0, 5_000, 500);
    plan.sample_count = 1;
    scheduler.start(plan);
    assert_eq!(scheduler.plan().map(|p| p.target_angle_count), Some(3600));

    while scheduler.state() == SweepState::Running {
        scheduler.run_batch(&Unloaded);
    }
    assert_eq!(scheduler.distinct_bearings(), 3600);
    assert!(scheduler.visibility().is_empty());
}

#[test]
fn test_zero_batch_size_still_progresses() {
    let mut scheduler = ProgressiveScheduler::new(5);
    scheduler.start(plan_at(0.0, 3, 0));
    let report = scheduler.run_batch(&FlatTerrain::new(0.0));
    assert_eq!(report.cast, 1);
}
