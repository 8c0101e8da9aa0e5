//! Sweep lifecycle state and the updates published to renderers.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use sightline_core::types::VisibilitySet;

/// Lifecycle of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl SweepState {
    pub fn is_finished(self) -> bool {
        matches!(self, SweepState::Completed | SweepState::Cancelled)
    }
}

/// Complete accumulated picture after a sweep or a progressive batch.
///
/// Always carries the whole set, never a delta, so a renderer can simply
/// replace what it displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityUpdate {
    /// Run counter; updates from an older generation are stale.
    pub generation: u64,
    pub state: SweepState,
    /// Rays cast so far. Progressive runs only cast distinct bearings.
    pub distinct_bearings: usize,
    pub visibility: VisibilitySet,
}

/// Receiver of visibility updates (map layer, file writer, channel...).
pub trait VisibilitySink {
    fn on_visibility_update(&mut self, update: &VisibilityUpdate);
}

impl VisibilitySink for Vec<VisibilityUpdate> {
    fn on_visibility_update(&mut self, update: &VisibilityUpdate) {
        self.push(update.clone());
    }
}

impl VisibilitySink for mpsc::Sender<VisibilityUpdate> {
    fn on_visibility_update(&mut self, update: &VisibilityUpdate) {
        // A hung-up receiver just means nobody is watching any more.
        let _ = self.send(update.clone());
    }
}

impl<S: VisibilitySink + ?Sized> VisibilitySink for &mut S {
    fn on_visibility_update(&mut self, update: &VisibilityUpdate) {
        (**self).on_visibility_update(update);
    }
}
