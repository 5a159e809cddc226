//! Tracking policy and observer dispatch
//!
//! A `Tracker` decides which mutations reach its change log (tracked
//! attribute set, `changes_only`, active flag), stamps them with an
//! optional call stack and notifies the registered observers.

mod capture;
mod engine;
mod observer;

pub use capture::{CallSiteCapture, StackCapture};
pub use engine::{TrackedAttributes, Tracker, TrackerBuilder};
pub use observer::{Observer, ObserverRegistry};
