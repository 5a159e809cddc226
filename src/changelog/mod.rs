//! Change log for tracked attribute mutations
//!
//! Records every observed mutation as an immutable entry and answers
//! queries over them.
//!
//! # Architecture
//!
//! - `Entry`: one mutation with its old/new value snapshots, UTC timestamp
//!   and optional call stack.
//! - `ChangeLog`: the append-only, insertion-ordered list of entries.
//! - `Query`: the read-only query surface shared by `ChangeLog` and the
//!   `LogView` projections returned by `filter` and `exclude`.
//! - `Replay`: lazy human-readable rendering of entries.
//!
//! # Example
//!
//! ```rust
//! use object_tracker::changelog::{ChangeLog, Query};
//! use serde_json::json;
//!
//! let mut log = ChangeLog::new();
//! log.push("name", json!("Alice"), json!("Bob"), None);
//! log.push("age", json!(30), json!(31), None);
//!
//! assert_eq!(log.filter(&["name"], false).count(), 1);
//! assert_eq!(log.last().unwrap().attribute, "age");
//! ```

mod changes;
mod diff;
mod entry;
mod query;
mod replay;

pub use changes::ChangeLog;
pub use diff::{describe_change, field_changes, format_value, FieldChange};
pub use entry::{CallStack, Entry, Frame};
pub use query::{LogView, Query};
pub use replay::{format_replay_entry, Replay, REPLAY_DELIMITER};
