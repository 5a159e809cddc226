//! Observer callbacks and their registry

use std::fmt;

use serde_json::Value;

use crate::error::{ObserverError, TrackerError, TrackerResult};

type Callback = dyn FnMut(&str, &Value, &Value) -> Result<(), ObserverError>;

/// A callback invoked with `(attribute, old, new)` when a tracked attribute changes
pub struct Observer {
    label: Option<String>,
    callback: Box<Callback>,
}

impl Observer {
    /// Wrap a fallible callback; an `Err` is propagated to the mutating caller
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&str, &Value, &Value) -> Result<(), ObserverError> + 'static,
    {
        Self {
            label: None,
            callback: Box::new(callback),
        }
    }

    /// Wrap a callback that cannot fail
    pub fn from_fn<F>(mut callback: F) -> Self
    where
        F: FnMut(&str, &Value, &Value) + 'static,
    {
        Self::new(move |attribute, old, new| {
            callback(attribute, old, new);
            Ok(())
        })
    }

    /// Attach a label used in debug output
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the callback
    pub fn call(&mut self, attribute: &str, old: &Value, new: &Value) -> Result<(), ObserverError> {
        (self.callback)(attribute, old, new)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Which attributes an observer is registered for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    All,
    Attribute(String),
}

impl Scope {
    fn matches(&self, attribute: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Attribute(name) => name == attribute,
        }
    }
}

#[derive(Debug)]
struct Registration {
    scope: Scope,
    observer: Observer,
}

/// Global and per-attribute observers, kept in registration order
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    registrations: Vec<Registration>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for every tracked attribute
    pub fn register(&mut self, observer: Observer) {
        self.registrations.push(Registration {
            scope: Scope::All,
            observer,
        });
    }

    /// Register an observer for a single attribute
    pub fn register_for(&mut self, attribute: impl Into<String>, observer: Observer) {
        self.registrations.push(Registration {
            scope: Scope::Attribute(attribute.into()),
            observer,
        });
    }

    /// Total number of registered observers
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of observers that would run for `attribute`
    pub fn count_for(&self, attribute: &str) -> usize {
        self.registrations
            .iter()
            .filter(|registration| registration.scope.matches(attribute))
            .count()
    }

    /// Invoke every observer matching `attribute`, in registration order
    ///
    /// Stops at the first failing observer; the ones before it have already run.
    pub fn notify(&mut self, attribute: &str, old: &Value, new: &Value) -> TrackerResult<()> {
        for registration in self
            .registrations
            .iter_mut()
            .filter(|registration| registration.scope.matches(attribute))
        {
            registration
                .observer
                .call(attribute, old, new)
                .map_err(|source| TrackerError::observer(attribute, source))?;
        }
        Ok(())
    }
}
