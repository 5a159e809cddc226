//! Tracked wrapper around a serde data struct

use std::ops::Deref;
use std::panic::Location;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::hook::{check_reserved, Tracked};
use crate::changelog::field_changes;
use crate::error::{TrackerError, TrackerResult};
use crate::tracker::Tracker;

/// A value whose top-level fields are tracked
///
/// Reads go through `Deref`; writes go through `set` or `update` so every
/// assignment reaches the tracker. Fields are addressed by their serde
/// names.
#[derive(Debug)]
pub struct Observable<T> {
    value: T,
    tracker: Tracker,
}

impl<T> Observable<T> {
    /// Wrap `value` with an existing tracker; the initial value is not tracked
    pub fn with_tracker(value: T, tracker: Tracker) -> Self {
        Self { value, tracker }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Tracker) {
        (self.value, self.tracker)
    }
}

impl<T: Serialize + DeserializeOwned> Observable<T> {
    /// Wrap `value` with a default tracker
    pub fn new(value: T) -> Self {
        Self::with_tracker(value, Tracker::new())
    }

    /// Mutate the value in place and track every field that changed
    ///
    /// Fields are compared through their serialized form, so assignments
    /// that leave a field equal are not seen. Returns the number of
    /// entries recorded.
    #[track_caller]
    pub fn update<F: FnOnce(&mut T)>(&mut self, mutate: F) -> TrackerResult<usize> {
        let caller = Location::caller();
        let before = self.object_snapshot()?;
        mutate(&mut self.value);
        let after = self.object_snapshot()?;

        let mut recorded = 0;
        for change in field_changes(&before, &after) {
            if change.field == self.tracker.tracker_attribute() {
                continue;
            }
            if self
                .tracker
                .track_at(&change.field, change.old, change.new, caller)?
            {
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    /// Take the current value as the initial state
    pub fn mark_initial_state(&mut self) -> TrackerResult<()> {
        self.tracker.set_initial_state(&self.value)
    }

    /// Compare the current value against the initial state
    pub fn has_changed_from_initial(&self) -> TrackerResult<bool> {
        self.tracker.has_changed_from(&self.value)
    }

    /// The value's fields with the change log attached under the tracker attribute
    pub fn snapshot(&self) -> TrackerResult<Value> {
        let mut snapshot = self.object_snapshot()?;
        if let Some(fields) = snapshot.as_object_mut() {
            fields.insert(
                self.tracker.tracker_attribute().to_string(),
                serde_json::to_value(self.tracker.log())?,
            );
        }
        Ok(snapshot)
    }

    fn object_snapshot(&self) -> TrackerResult<Value> {
        let snapshot = serde_json::to_value(&self.value)?;
        if !snapshot.is_object() {
            return Err(TrackerError::NotAnObject(std::any::type_name::<T>()));
        }
        Ok(snapshot)
    }
}

impl<T: Serialize + DeserializeOwned + PartialEq> Observable<T> {
    /// Assign one field and track the change
    ///
    /// The field is assigned by rebuilding the value from its serialized
    /// form, so the value must round-trip through serde unchanged. Types
    /// with `#[serde(skip)]` fields holding data, or with asymmetric
    /// (de)serialization, are rejected with `LossyRoundTrip` before
    /// anything is touched; mutate those through `update`.
    ///
    /// Returns whether the tracker recorded an entry. Fails without
    /// touching the value if the field does not exist or `value` does not
    /// fit the field's type.
    #[track_caller]
    pub fn set<V: Serialize>(&mut self, attribute: &str, value: V) -> TrackerResult<bool> {
        let caller = Location::caller();
        check_reserved(&self.tracker, attribute)?;

        let mut snapshot = self.object_snapshot()?;
        let rebuilt: T = serde_json::from_value(snapshot.clone())?;
        if rebuilt != self.value {
            return Err(TrackerError::LossyRoundTrip(std::any::type_name::<T>()));
        }

        let new = serde_json::to_value(value)?;
        let old = match snapshot.as_object_mut().and_then(|fields| fields.get_mut(attribute)) {
            Some(slot) => std::mem::replace(slot, new.clone()),
            None => return Err(TrackerError::UnknownAttribute(attribute.to_string())),
        };

        self.value = serde_json::from_value(snapshot)?;
        self.tracker.track_at(attribute, old, new, caller)
    }
}

impl<T> Deref for Observable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Tracked for Observable<T> {
    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::Query;
    use crate::tracker::Observer;
    use serde::Deserialize;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
        tags: Vec<String>,
    }

    fn create_user() -> Observable<User> {
        Observable::new(User {
            name: "Alice".into(),
            age: 30,
            tags: Vec::new(),
        })
    }

    #[test]
    fn test_set_field() {
        let mut user = create_user();
        assert!(user.set("name", "Bob").unwrap());

        assert_eq!(user.name, "Bob");
        let entry = user.tracker().log().last().unwrap();
        assert_eq!(entry.attribute, "name");
        assert_eq!(entry.old_value, json!("Alice"));
        assert_eq!(entry.new_value, json!("Bob"));
    }

    #[test]
    fn test_set_records_call_site() {
        let mut user = create_user();
        let line = line!() + 1;
        user.set("age", 31).unwrap();

        let frame = user.tracker().log().last().unwrap().call_site().unwrap();
        assert_eq!(frame.file, file!());
        assert_eq!(frame.line, line);
    }

    #[test]
    fn test_set_unknown_field() {
        let mut user = create_user();
        let err = user.set("email", "a@b.c").unwrap_err();

        assert!(matches!(err, TrackerError::UnknownAttribute(ref name) if name == "email"));
        assert!(user.tracker().log().is_empty());
    }

    #[test]
    fn test_set_wrong_type_leaves_value() {
        let mut user = create_user();
        let err = user.set("age", "thirty").unwrap_err();

        assert!(matches!(err, TrackerError::Json(_)));
        assert_eq!(user.age, 30);
        assert!(user.tracker().log().is_empty());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Document {
        title: String,
        #[serde(skip)]
        cache: Vec<u8>,
    }

    #[test]
    fn test_set_rejects_skipped_field_data() {
        let mut doc = Observable::new(Document {
            title: "a".into(),
            cache: vec![1, 2, 3],
        });

        let err = doc.set("title", "b").unwrap_err();

        assert!(matches!(err, TrackerError::LossyRoundTrip(_)));
        assert_eq!(doc.title, "a");
        assert_eq!(doc.cache, vec![1, 2, 3]);
        assert!(doc.tracker().log().is_empty());
    }

    #[test]
    fn test_update_keeps_skipped_field_data() {
        let mut doc = Observable::new(Document {
            title: "a".into(),
            cache: vec![1, 2, 3],
        });

        assert_eq!(doc.update(|d| d.title = "b".into()).unwrap(), 1);
        assert_eq!(doc.cache, vec![1, 2, 3]);
        assert_eq!(doc.tracker().log().last().unwrap().new_value, json!("b"));
    }

    #[test]
    fn test_set_allows_empty_skipped_field() {
        let mut doc = Observable::new(Document {
            title: "a".into(),
            cache: Vec::new(),
        });

        assert!(doc.set("title", "b").unwrap());
        assert_eq!(doc.title, "b");
    }

    #[test]
    fn test_update_tracks_changed_fields() {
        let mut user = create_user();
        let recorded = user
            .update(|u| {
                u.age += 1;
                u.tags.push("admin".into());
            })
            .unwrap();

        assert_eq!(recorded, 2);
        let log = user.tracker().log();
        assert_eq!(log.unique_attributes().len(), 2);
        assert_eq!(log.filter(&["tags"], false).first().unwrap().new_value, json!(["admin"]));
        assert!(log.filter(&["name"], false).is_empty());
    }

    #[test]
    fn test_update_respects_tracked_attributes() {
        let tracker = Tracker::builder().attributes(["name"]).build();
        let mut user = Observable::with_tracker(
            User {
                name: "Alice".into(),
                age: 30,
                tags: Vec::new(),
            },
            tracker,
        );

        let recorded = user.update(|u| u.age = 40).unwrap();

        assert_eq!(recorded, 0);
        assert_eq!(user.age, 40);
        assert!(!user.tracker().has_attribute_changed("age"));
    }

    #[test]
    fn test_no_op_set_with_changes_only() {
        let tracker = Tracker::builder().changes_only(true).build();
        let mut user = Observable::with_tracker(
            User {
                name: "Alice".into(),
                age: 30,
                tags: Vec::new(),
            },
            tracker,
        );

        assert!(!user.set("name", "Alice").unwrap());
        assert!(user.tracker().log().is_empty());
    }

    #[test]
    fn test_observer_error_after_assignment() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let tracker = Tracker::builder()
            .attribute_observer(
                "name",
                Observer::new(move |_, _, new| {
                    counter.set(counter.get() + 1);
                    if new == "" {
                        return Err("name cannot be empty".into());
                    }
                    Ok(())
                }),
            )
            .build();
        let mut user = Observable::with_tracker(
            User {
                name: "Alice".into(),
                age: 30,
                tags: Vec::new(),
            },
            tracker,
        );

        assert!(user.set("name", "").is_err());
        // The assignment and its entry are not rolled back
        assert_eq!(user.name, "");
        assert_eq!(user.tracker().log().count(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut user = create_user();
        user.update(|u| u.tags.push("a".into())).unwrap();
        user.update(|u| u.tags.push("b".into())).unwrap();

        let entries = user.tracker().log().all();
        assert_eq!(entries[0].new_value, json!(["a"]));
        assert_eq!(entries[1].new_value, json!(["a", "b"]));
    }

    #[test]
    fn test_initial_state() {
        let mut user = create_user();
        assert!(matches!(
            user.has_changed_from_initial(),
            Err(TrackerError::InitialStateMissing)
        ));

        user.mark_initial_state().unwrap();
        assert!(!user.has_changed_from_initial().unwrap());

        user.set("name", "Bob").unwrap();
        assert!(user.has_changed_from_initial().unwrap());
    }

    #[test]
    fn test_snapshot_attaches_log() {
        let mut user = create_user();
        user.set("age", 31).unwrap();

        let snapshot = user.snapshot().unwrap();
        assert_eq!(snapshot["age"], json!(31));
        assert_eq!(snapshot["tracker"][0]["attribute"], "age");
    }

    #[test]
    fn test_reserved_tracker_attribute() {
        let mut user = create_user();
        assert!(matches!(
            user.set("tracker", 1),
            Err(TrackerError::ReservedAttribute(_))
        ));
    }

    #[test]
    fn test_non_object_value() {
        let mut counter = Observable::new(5u32);
        assert!(matches!(
            counter.update(|c| *c += 1),
            Err(TrackerError::NotAnObject(_))
        ));
        assert_eq!(*counter.get(), 5);
    }

    #[test]
    fn test_into_parts() {
        let mut user = create_user();
        user.set("name", "Bob").unwrap();

        let (value, tracker) = user.into_parts();
        assert_eq!(value.name, "Bob");
        assert_eq!(tracker.log().count(), 1);
    }
}
