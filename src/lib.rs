//! object-tracker - Attribute change tracking for Rust values
//!
//! This library records every assignment made to the attributes of a
//! tracked value: what changed, from what, to what, when, and from which
//! call site. Changes can be queried, replayed as text, observed through
//! callbacks and exported.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `changelog`: Entries, the append-only change log and its queries
//! - `tracker`: Tracking policy, observers and call-site capture
//! - `observable`: Wrappers and traits that route assignments to a tracker
//! - `config`: Tracker settings and path management
//! - `export`: JSON, YAML and CSV export of change logs
//! - `display`: Terminal formatting of entries
//! - `cli`: Handlers for the `object-tracker` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust
//! use object_tracker::{ObservableMap, Query, Tracked};
//! use serde_json::json;
//!
//! let mut user = ObservableMap::new();
//! user.set("name", json!("Alice"))?;
//! user.set("name", json!("Bob"))?;
//! user.set("age", json!(31))?;
//!
//! let log = user.tracker().log();
//! assert_eq!(log.filter(&["name"], false).count(), 2);
//! assert_eq!(log.last().unwrap().attribute, "age");
//! # Ok::<(), object_tracker::TrackerError>(())
//! ```

pub mod changelog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod observable;
pub mod tracker;

pub use changelog::{ChangeLog, Entry, Frame, LogView, Query};
pub use config::{TrackerPaths, TrackerSettings};
pub use error::{TrackerError, TrackerResult};
pub use observable::{AttributeHook, Observable, ObservableMap, Tracked};
pub use tracker::{Observer, Tracker, TrackerBuilder};
