//! Tracker settings
//!
//! Every option a `Tracker` can be constructed with that is plain data.
//! Observers are code and are registered through the builder instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Name under which a tracker is attached to its subject by default
pub const DEFAULT_TRACKER_ATTRIBUTE: &str = "tracker";

/// Settings recognized when constructing a tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Attributes to restrict tracking to (empty = track everything)
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Invoke observers automatically on every tracked change
    #[serde(default = "default_true")]
    pub auto_notify: bool,

    /// Capture the call site of every mutation
    #[serde(default = "default_true")]
    pub stack_trace: bool,

    /// Skip writes where the old and new values are equal
    #[serde(default)]
    pub changes_only: bool,

    /// Name under which the tracker is attached to its subject
    #[serde(default = "default_tracker_attribute")]
    pub tracker_attribute: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_tracker_attribute() -> String {
    DEFAULT_TRACKER_ATTRIBUTE.to_string()
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            attributes: Vec::new(),
            auto_notify: true,
            stack_trace: true,
            changes_only: false,
            tracker_attribute: default_tracker_attribute(),
        }
    }
}

impl TrackerSettings {
    /// Check the settings for values a tracker cannot work with
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.tracker_attribute.trim().is_empty() {
            return Err(TrackerError::Config(
                "tracker_attribute cannot be empty".into(),
            ));
        }

        if self
            .attributes
            .iter()
            .any(|attribute| *attribute == self.tracker_attribute)
        {
            return Err(TrackerError::Config(format!(
                "'{}' cannot be both tracked and the tracker attribute",
                self.tracker_attribute
            )));
        }

        Ok(())
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self, TrackerError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: TrackerSettings = serde_json::from_str(&contents).map_err(|e| {
            TrackerError::Config(format!("Failed to parse settings file: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), TrackerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TrackerError::Io(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrackerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| TrackerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
