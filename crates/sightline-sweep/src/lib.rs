//! Sweeps: turning single rays into a viewshed.
//!
//! A full deterministic sweep over stepped bearings, the progressive
//! scheduler that casts random deduplicated batches, the background worker
//! that hosts it, and the session that ties a vantage marker and viewport
//! to both.

pub use sightline_core as core;
pub use sightline_terrain as terrain;

pub mod scheduler;
pub mod session;
pub mod sweep;
pub mod update;
pub mod worker;

pub use scheduler::{BatchReport, ProgressiveScheduler, SweepPlan};
pub use session::ViewshedSession;
pub use sweep::{full_sweep, sweep_bearings, sweep_from_source};
pub use update::{SweepState, VisibilitySink, VisibilityUpdate};
pub use worker::{spawn_sweep_worker, SweepCommand, SweepWorker};

#[cfg(test)]
mod tests;
