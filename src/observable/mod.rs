//! Interception layer feeding attribute assignments into a tracker
//!
//! Rust has no transparent attribute interception, so subjects opt in
//! explicitly:
//!
//! - `Observable<T>` wraps any serde data struct; fields are assigned with
//!   `set` or mutated in bulk with `update`, and each changed field is
//!   tracked.
//! - `ObservableMap<V>` is a keyed container whose `set`/`remove` calls
//!   are tracked with the key as the attribute name.
//! - `Tracked` is implemented by any type embedding a `Tracker`, giving
//!   hand-written setters a `record_change` helper.
//! - `AttributeHook` is the single capability the tracker needs from an
//!   interception mechanism.
//!
//! # Example
//!
//! ```rust
//! use object_tracker::observable::{Observable, Tracked};
//! use object_tracker::changelog::Query;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(PartialEq, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let mut user = Observable::new(User { name: "Alice".into(), age: 30 });
//! user.set("name", "Bob").unwrap();
//! user.update(|u| u.age += 1).unwrap();
//!
//! assert_eq!(user.name, "Bob");
//! assert_eq!(user.tracker().log().count(), 2);
//! ```

mod hook;
mod map;
mod object;

pub use hook::{AttributeHook, Tracked};
pub use map::ObservableMap;
pub use object::Observable;
