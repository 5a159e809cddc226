//! Hook contract between interception mechanisms and the tracker

use std::panic::Location;

use serde::Serialize;
use serde_json::Value;

use crate::error::{TrackerError, TrackerResult};
use crate::tracker::Tracker;

/// Receives every intercepted assignment
pub trait AttributeHook {
    fn on_attribute_set(&mut self, attribute: &str, old: Value, new: Value) -> TrackerResult<()>;
}

impl AttributeHook for Tracker {
    #[track_caller]
    fn on_attribute_set(&mut self, attribute: &str, old: Value, new: Value) -> TrackerResult<()> {
        self.track(attribute, old, new).map(|_| ())
    }
}

/// A subject that carries its own tracker
///
/// Implementors embed a `Tracker` and call `record_change` from their
/// setters, after the field has been assigned.
pub trait Tracked {
    fn tracker(&self) -> &Tracker;

    fn tracker_mut(&mut self) -> &mut Tracker;

    /// Snapshot `old` and `new` and track the change of `attribute`
    ///
    /// The tracker's own attribute name is reserved and rejected.
    #[track_caller]
    fn record_change<V: Serialize + ?Sized>(
        &mut self,
        attribute: &str,
        old: &V,
        new: &V,
    ) -> TrackerResult<bool> {
        let caller = Location::caller();
        check_reserved(self.tracker(), attribute)?;
        let old = serde_json::to_value(old)?;
        let new = serde_json::to_value(new)?;
        self.tracker_mut().track_at(attribute, old, new, caller)
    }
}

pub(crate) fn check_reserved(tracker: &Tracker, attribute: &str) -> TrackerResult<()> {
    if attribute == tracker.tracker_attribute() {
        return Err(TrackerError::ReservedAttribute(attribute.to_string()));
    }
    Ok(())
}
