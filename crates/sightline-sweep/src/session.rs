//! Interactive viewshed session: the vantage marker, observer height and
//! current viewport, plus whatever config the sweeps run with.
//!
//! Each setter reports whether the displayed visibility is now stale, so the
//! host knows to restart the worker.

use sightline_core::config::SweepConfig;
use sightline_core::types::{GeoPoint, Observer};
use sightline_terrain::provider::ElevationProvider;
use sightline_terrain::viewport::{max_ray_distance, Viewport, ViewportSource};

use crate::scheduler::SweepPlan;
use crate::sweep::sweep_from_source;
use crate::update::{SweepState, VisibilitySink, VisibilityUpdate};

#[derive(Debug, Clone)]
pub struct ViewshedSession {
    vantage: Option<GeoPoint>,
    viewport: Viewport,
    config: SweepConfig,
    generation: u64,
}

impl ViewshedSession {
    pub fn new(viewport: Viewport, config: SweepConfig) -> Self {
        Self {
            vantage: None,
            viewport,
            config,
            generation: 0,
        }
    }

    /// Place or move the vantage marker. Non-finite positions are ignored.
    pub fn set_vantage(&mut self, point: GeoPoint) -> bool {
        if !point.is_finite() {
            return false;
        }
        let point = GeoPoint::new(point.lon, point.lat);
        if self.vantage == Some(point) {
            return false;
        }
        self.vantage = Some(point);
        true
    }

    /// Delete the vantage marker.
    pub fn clear_vantage(&mut self) -> bool {
        self.vantage.take().is_some()
    }

    /// Ignores non-finite or negative heights and leaves the current one in place.
    pub fn set_observer_height(&mut self, height: f64) -> bool {
        if !height.is_finite() || height < 0.0 || height == self.config.observer_height {
            return false;
        }
        self.config.observer_height = height;
        self.vantage.is_some()
    }

    /// Pan or zoom. Only invalidates when a vantage point is set.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.vantage.is_some()
    }

    pub fn vantage(&self) -> Option<GeoPoint> {
        self.vantage
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn observer(&self) -> Option<Observer> {
        self.vantage
            .map(|position| Observer::new(position, self.config.observer_height))
    }

    /// Ray length needed to cover the viewport from the vantage point.
    pub fn max_distance(&self) -> Option<f64> {
        self.vantage
            .map(|vantage| max_ray_distance(vantage, &self.viewport.corners()))
    }

    /// What the background worker should run for the current view.
    pub fn plan(&self) -> Option<SweepPlan> {
        let vantage = self.vantage?;
        let max_distance = max_ray_distance(vantage, &self.viewport.corners());
        Some(SweepPlan::from_config(vantage, max_distance, &self.config))
    }

    /// Run a blocking full sweep and hand the finished picture to `sink`.
    ///
    /// `None` when no vantage point is set.
    pub fn run_full_sweep<P, S>(&mut self, provider: &P, mut sink: S) -> Option<VisibilityUpdate>
    where
        P: ElevationProvider + ?Sized,
        S: VisibilitySink,
    {
        let visibility = sweep_from_source(&*self, provider, &self.config)?;
        self.generation += 1;
        let update = VisibilityUpdate {
            generation: self.generation,
            state: SweepState::Completed,
            distinct_bearings: visibility.ray_count(),
            visibility,
        };
        sink.on_visibility_update(&update);
        Some(update)
    }
}

impl ViewportSource for ViewshedSession {
    fn viewport_corners(&self) -> [GeoPoint; 4] {
        self.viewport.corners()
    }

    fn vantage_point(&self) -> Option<GeoPoint> {
        self.vantage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_terrain::provider::FlatTerrain;

    fn session() -> ViewshedSession {
        ViewshedSession::new(
            Viewport::around(GeoPoint::new(10.0, 45.0), 0.05),
            SweepConfig::default(),
        )
    }

    #[test]
    fn test_no_vantage_no_plan() {
        let mut s = session();
        assert!(s.plan().is_none());
        assert!(s.observer().is_none());
        assert!(!s.set_viewport(Viewport::around(GeoPoint::new(11.0, 45.0), 0.05)));

        let mut updates: Vec<VisibilityUpdate> = Vec::new();
        assert!(s.run_full_sweep(&FlatTerrain::new(0.0), &mut updates).is_none());
        assert!(updates.is_empty());
    }

    #[test]
    fn test_vantage_changes_invalidate() {
        let mut s = session();
        let vantage = GeoPoint::new(10.0, 45.0);
        assert!(s.set_vantage(vantage));
        assert!(!s.set_vantage(vantage), "same spot is not a change");
        assert!(!s.set_vantage(GeoPoint::new(f64::NAN, 45.0)));
        assert_eq!(s.vantage(), Some(vantage));

        assert!(s.set_observer_height(10.0));
        assert!(!s.set_observer_height(f64::NAN));
        assert!(!s.set_observer_height(-1.0));
        assert_eq!(s.config().observer_height, 10.0);
        assert_eq!(s.observer().map(|o| o.height), Some(10.0));

        assert!(s.clear_vantage());
        assert!(!s.clear_vantage());
        assert!(s.plan().is_none());
    }

    #[test]
    fn test_plan_covers_viewport() {
        let mut s = session();
        s.set_vantage(GeoPoint::new(10.0, 45.0));
        let plan = s.plan().unwrap();
        assert_eq!(plan.observer.height, 1.8);
        assert_eq!(plan.target_angle_count, 3000);
        assert_eq!(Some(plan.max_distance), s.max_distance());
        // Corner of a ±0.05° box at 45°N is a few km away
        assert!(plan.max_distance > 5_000.0 && plan.max_distance < 8_000.0);
    }

    #[test]
    fn test_full_sweep_emits_completed_update() {
        let mut s = ViewshedSession::new(
            Viewport::around(GeoPoint::new(10.0, 45.0), 0.05),
            SweepConfig {
                degree_step: 10.0,
                sample_count: 50,
                ..SweepConfig::default()
            },
        );
        s.set_vantage(GeoPoint::new(10.0, 45.0));

        let mut updates: Vec<VisibilityUpdate> = Vec::new();
        let update = s.run_full_sweep(&FlatTerrain::new(0.0), &mut updates).unwrap();
        assert_eq!(update.state, SweepState::Completed);
        assert_eq!(update.generation, 1);
        assert_eq!(updates, vec![update.clone()]);
        // Every ray reaches past the horizon of a 1.8 m eye
        assert_eq!(update.distinct_bearings, 36);
        assert_eq!(update.visibility.len(), 36);
    }
}
