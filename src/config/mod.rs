//! Configuration module for object-tracker
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Tracker settings persistence

pub mod paths;
pub mod settings;

pub use paths::TrackerPaths;
pub use settings::TrackerSettings;
