//! The tracker: tracking policy, change log ownership and observer dispatch

use std::collections::BTreeSet;
use std::fmt;
use std::panic::Location;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::capture::{CallSiteCapture, StackCapture};
use super::observer::{Observer, ObserverRegistry};
use crate::changelog::{CallStack, ChangeLog, Query};
use crate::config::settings::{TrackerSettings, DEFAULT_TRACKER_ATTRIBUTE};
use crate::error::{TrackerError, TrackerResult};

/// The set of attributes a tracker records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackedAttributes {
    /// Every attribute is tracked
    #[default]
    All,
    /// Only the named attributes are tracked
    Only(BTreeSet<String>),
}

impl TrackedAttributes {
    /// Build from a list of names; an empty list tracks everything
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    pub fn contains(&self, attribute: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(attribute),
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Only(_))
    }
}

/// Where the call stack of a recorded entry comes from
enum StackSource {
    Caller(&'static Location<'static>),
    Given(Option<CallStack>),
}

/// Records attribute mutations of one subject and notifies observers
///
/// A tracker owns exactly one `ChangeLog`. Mutations are filtered by the
/// tracked attribute set and the `changes_only` policy before they reach
/// the log; observers run after the entry has been stored.
pub struct Tracker {
    log: ChangeLog,
    attributes: TrackedAttributes,
    observers: ObserverRegistry,
    auto_notify: bool,
    capture_stack: bool,
    changes_only: bool,
    active: bool,
    tracker_attribute: String,
    initial_state: Option<Value>,
    stack_capture: Box<dyn StackCapture>,
}

impl Tracker {
    /// Create a tracker with default settings: every attribute tracked,
    /// observers notified automatically, call sites captured
    pub fn new() -> Self {
        TrackerBuilder::default().build()
    }

    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::default()
    }

    /// Create a tracker from loaded settings
    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    /// Record a mutation of `attribute`
    ///
    /// Returns whether an entry was added to the log. If an observer fails,
    /// the entry stays recorded and the observer's error is returned.
    #[track_caller]
    pub fn track(&mut self, attribute: &str, old: Value, new: Value) -> TrackerResult<bool> {
        let caller = Location::caller();
        self.record(attribute, old, new, StackSource::Caller(caller))
    }

    /// Record a mutation with a call stack supplied by the caller
    ///
    /// The stack is still dropped when stack capture is disabled.
    pub fn track_with_stack(
        &mut self,
        attribute: &str,
        old: Value,
        new: Value,
        call_stack: Option<CallStack>,
    ) -> TrackerResult<bool> {
        self.record(attribute, old, new, StackSource::Given(call_stack))
    }

    pub(crate) fn track_at(
        &mut self,
        attribute: &str,
        old: Value,
        new: Value,
        caller: &'static Location<'static>,
    ) -> TrackerResult<bool> {
        self.record(attribute, old, new, StackSource::Caller(caller))
    }

    fn record(
        &mut self,
        attribute: &str,
        old: Value,
        new: Value,
        stack: StackSource,
    ) -> TrackerResult<bool> {
        if !self.active {
            debug!("tracker inactive, skipping '{}'", attribute);
            return Ok(false);
        }
        if !self.attributes.contains(attribute) {
            debug!("attribute '{}' is not tracked", attribute);
            return Ok(false);
        }
        if self.changes_only && old == new {
            debug!("attribute '{}' unchanged, skipping", attribute);
            return Ok(false);
        }

        let call_stack = if self.capture_stack {
            match stack {
                StackSource::Caller(caller) => Some(self.stack_capture.capture(caller)),
                StackSource::Given(call_stack) => call_stack,
            }
        } else {
            None
        };

        let entry = self.log.push(attribute, old, new, call_stack);
        if self.auto_notify {
            self.observers
                .notify(&entry.attribute, &entry.old_value, &entry.new_value)?;
        }
        Ok(true)
    }

    /// Invoke the observers for `attribute` without logging anything
    pub fn notify(&mut self, attribute: &str, old: &Value, new: &Value) -> TrackerResult<()> {
        self.observers.notify(attribute, old, new)
    }

    /// Register an observer for every tracked attribute
    pub fn observe(&mut self, observer: Observer) {
        self.observers.register(observer);
    }

    /// Register an observer for one attribute
    pub fn observe_attribute(&mut self, attribute: impl Into<String>, observer: Observer) {
        self.observers.register_for(attribute, observer);
    }

    /// Whether the log holds a real change (for `attribute`, if given)
    pub fn has_changed(&self, attribute: Option<&str>) -> bool {
        self.log.has_changed(attribute)
    }

    /// Whether `attribute` is tracked and the log holds a real change for it
    pub fn has_attribute_changed(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute) && self.has_changed(Some(attribute))
    }

    pub fn is_tracked(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }

    /// Snapshot the whole subject for later comparison
    pub fn set_initial_state<T: Serialize + ?Sized>(&mut self, state: &T) -> TrackerResult<()> {
        self.initial_state = Some(serde_json::to_value(state)?);
        Ok(())
    }

    pub fn initial_state(&self) -> Option<&Value> {
        self.initial_state.as_ref()
    }

    /// Compare `current` against the initial state snapshot
    pub fn has_changed_from<T: Serialize + ?Sized>(&self, current: &T) -> TrackerResult<bool> {
        let initial = self
            .initial_state
            .as_ref()
            .ok_or(TrackerError::InitialStateMissing)?;
        Ok(*initial != serde_json::to_value(current)?)
    }

    /// Compare one attribute of `current` against the initial state snapshot
    pub fn has_attribute_changed_from<T: Serialize + ?Sized>(
        &self,
        attribute: &str,
        current: &T,
    ) -> TrackerResult<bool> {
        let initial = self
            .initial_state
            .as_ref()
            .ok_or(TrackerError::InitialStateMissing)?;
        let current = serde_json::to_value(current)?;
        Ok(initial.get(attribute) != current.get(attribute))
    }

    /// Resume recording
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Suspend recording; mutations pass through unlogged
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> &ChangeLog {
        &self.log
    }

    /// Clear the change log
    pub fn reset_log(&mut self) {
        self.log.reset_buffer();
    }

    pub fn tracked_attributes(&self) -> &TrackedAttributes {
        &self.attributes
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn auto_notify(&self) -> bool {
        self.auto_notify
    }

    pub fn capture_stack(&self) -> bool {
        self.capture_stack
    }

    pub fn changes_only(&self) -> bool {
        self.changes_only
    }

    /// Name under which the tracker is attached to its subject
    pub fn tracker_attribute(&self) -> &str {
        &self.tracker_attribute
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("log", &self.log)
            .field("attributes", &self.attributes)
            .field("observers", &self.observers)
            .field("auto_notify", &self.auto_notify)
            .field("capture_stack", &self.capture_stack)
            .field("changes_only", &self.changes_only)
            .field("active", &self.active)
            .field("tracker_attribute", &self.tracker_attribute)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.log, f)
    }
}

/// Builder for `Tracker`
pub struct TrackerBuilder {
    attributes: Vec<String>,
    observers: ObserverRegistry,
    auto_notify: bool,
    stack_trace: bool,
    changes_only: bool,
    active: bool,
    tracker_attribute: String,
    initial_state: Option<Value>,
    stack_capture: Option<Box<dyn StackCapture>>,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            observers: ObserverRegistry::new(),
            auto_notify: true,
            stack_trace: true,
            changes_only: false,
            active: true,
            tracker_attribute: DEFAULT_TRACKER_ATTRIBUTE.to_string(),
            initial_state: None,
            stack_capture: None,
        }
    }
}

impl TrackerBuilder {
    /// Restrict tracking to these attributes (empty = track everything)
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add an observer invoked on every tracked change
    pub fn observer(mut self, observer: Observer) -> Self {
        self.observers.register(observer);
        self
    }

    /// Add an observer invoked only when `attribute` changes
    pub fn attribute_observer(mut self, attribute: impl Into<String>, observer: Observer) -> Self {
        self.observers.register_for(attribute, observer);
        self
    }

    pub fn auto_notify(mut self, auto_notify: bool) -> Self {
        self.auto_notify = auto_notify;
        self
    }

    pub fn stack_trace(mut self, stack_trace: bool) -> Self {
        self.stack_trace = stack_trace;
        self
    }

    pub fn changes_only(mut self, changes_only: bool) -> Self {
        self.changes_only = changes_only;
        self
    }

    /// Start the tracker suspended
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn tracker_attribute(mut self, name: impl Into<String>) -> Self {
        self.tracker_attribute = name.into();
        self
    }

    pub fn initial_state(mut self, state: Value) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Replace the default call-site capture
    pub fn stack_capture<C: StackCapture + 'static>(mut self, capture: C) -> Self {
        self.stack_capture = Some(Box::new(capture));
        self
    }

    /// Apply every option carried by `settings`
    pub fn settings(self, settings: &TrackerSettings) -> Self {
        self.attributes(settings.attributes.iter().cloned())
            .auto_notify(settings.auto_notify)
            .stack_trace(settings.stack_trace)
            .changes_only(settings.changes_only)
            .tracker_attribute(settings.tracker_attribute.clone())
    }

    pub fn build(self) -> Tracker {
        Tracker {
            log: ChangeLog::new(),
            attributes: TrackedAttributes::from_names(self.attributes),
            observers: self.observers,
            auto_notify: self.auto_notify,
            capture_stack: self.stack_trace,
            changes_only: self.changes_only,
            active: self.active,
            tracker_attribute: self.tracker_attribute,
            initial_state: self.initial_state,
            stack_capture: self
                .stack_capture
                .unwrap_or_else(|| Box::new(CallSiteCapture::new())),
        }
    }
}
