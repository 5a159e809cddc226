//! Tracked keyed container

use std::collections::BTreeMap;
use std::ops::Index;
use std::panic::Location;

use serde::Serialize;
use serde_json::Value;

use super::hook::{check_reserved, Tracked};
use crate::changelog::CallStack;
use crate::error::TrackerResult;
use crate::tracker::Tracker;

/// A string-keyed container whose writes are tracked
///
/// `map.set(key, value)` is the container-style counterpart of an
/// attribute assignment: the key is recorded as the attribute name, a
/// missing previous value as `null`.
#[derive(Debug)]
pub struct ObservableMap<V> {
    values: BTreeMap<String, V>,
    tracker: Tracker,
}

impl<V> ObservableMap<V> {
    /// Create an empty map with a default tracker
    pub fn new() -> Self {
        Self::with_tracker(Tracker::new())
    }

    pub fn with_tracker(tracker: Tracker) -> Self {
        Self::from_values(BTreeMap::new(), tracker)
    }

    /// Seed the map with initial values; seeding is not tracked
    pub fn from_values(values: BTreeMap<String, V>, tracker: Tracker) -> Self {
        Self { values, tracker }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.values.iter()
    }

    pub fn values(&self) -> &BTreeMap<String, V> {
        &self.values
    }

    pub fn into_parts(self) -> (BTreeMap<String, V>, Tracker) {
        (self.values, self.tracker)
    }
}

impl<V: Serialize> ObservableMap<V> {
    /// Assign `value` to `key` and track the change
    ///
    /// Returns the previous value. The assignment stands even when an
    /// observer fails; the error is still returned.
    #[track_caller]
    pub fn set(&mut self, key: impl Into<String>, value: V) -> TrackerResult<Option<V>> {
        let caller = Location::caller();
        self.assign(key.into(), value, |tracker, key, old, new| {
            tracker.track_at(key, old, new, caller)
        })
    }

    /// Assign `value` to `key`, recording `call_stack` instead of the caller
    ///
    /// For assignments whose origin is not Rust code, such as a line of a
    /// script being replayed.
    pub fn set_with_stack(
        &mut self,
        key: impl Into<String>,
        value: V,
        call_stack: Option<CallStack>,
    ) -> TrackerResult<Option<V>> {
        self.assign(key.into(), value, |tracker, key, old, new| {
            tracker.track_with_stack(key, old, new, call_stack)
        })
    }

    fn assign<F>(&mut self, key: String, value: V, record: F) -> TrackerResult<Option<V>>
    where
        F: FnOnce(&mut Tracker, &str, Value, Value) -> TrackerResult<bool>,
    {
        check_reserved(&self.tracker, &key)?;

        let new = serde_json::to_value(&value)?;
        let old = match self.values.get(&key) {
            Some(previous) => serde_json::to_value(previous)?,
            None => Value::Null,
        };

        let previous = self.values.insert(key.clone(), value);
        record(&mut self.tracker, &key, old, new)?;
        Ok(previous)
    }

    /// Remove `key` and track the change to `null`
    #[track_caller]
    pub fn remove(&mut self, key: &str) -> TrackerResult<Option<V>> {
        let caller = Location::caller();
        let Some(previous) = self.values.remove(key) else {
            return Ok(None);
        };

        let old = serde_json::to_value(&previous)?;
        self.tracker.track_at(key, old, Value::Null, caller)?;
        Ok(Some(previous))
    }

    /// The entries with the change log attached under the tracker attribute
    pub fn snapshot(&self) -> TrackerResult<Value> {
        let mut fields = serde_json::Map::new();
        for (key, value) in &self.values {
            fields.insert(key.clone(), serde_json::to_value(value)?);
        }
        fields.insert(
            self.tracker.tracker_attribute().to_string(),
            serde_json::to_value(self.tracker.log())?,
        );
        Ok(Value::Object(fields))
    }
}

impl<V> Default for ObservableMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<&str> for ObservableMap<V> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        &self.values[key]
    }
}

impl<V> Tracked for ObservableMap<V> {
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
    use crate::changelog::{Frame, Query};
    use crate::error::TrackerError;
    use crate::tracker::Observer;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_set_new_key() {
        let mut map = ObservableMap::new();
        let previous = map.set("name", "Alice".to_string()).unwrap();

        assert!(previous.is_none());
        assert_eq!(map["name"], "Alice");
        let entry = map.tracker().log().last().unwrap();
        assert_eq!(entry.old_value, Value::Null);
        assert_eq!(entry.new_value, json!("Alice"));
    }

    #[test]
    fn test_set_existing_key() {
        let mut map = ObservableMap::new();
        map.set("age", 30).unwrap();
        let previous = map.set("age", 31).unwrap();

        assert_eq!(previous, Some(30));
        assert_eq!(map.get("age"), Some(&31));
        assert_eq!(map.tracker().log().filter(&["age"], false).count(), 2);
        assert_eq!(map.tracker().log().last().unwrap().old_value, json!(30));
    }

    #[test]
    fn test_seeded_values_are_not_tracked() {
        let values = BTreeMap::from([("name".to_string(), json!("Alice"))]);
        let mut map = ObservableMap::from_values(values, Tracker::new());

        assert!(!map.tracker().has_changed(None));
        map.set("name", json!("Bob")).unwrap();
        assert!(map.tracker().has_attribute_changed("name"));
        assert_eq!(map.tracker().log().count(), 1);
    }

    #[test]
    fn test_set_with_stack() {
        let mut map = ObservableMap::new();
        let frame = Frame::new("script.yaml", 2, 0).with_function("mutations[1]");
        map.set_with_stack("name", json!("Bob"), Some(vec![frame.clone()]))
            .unwrap();

        let entry = map.tracker().log().last().unwrap();
        assert_eq!(entry.call_stack, Some(vec![frame]));
        assert_eq!(map["name"], json!("Bob"));
    }

    #[test]
    fn test_remove() {
        let mut map = ObservableMap::new();
        map.set("name", "Alice").unwrap();

        assert_eq!(map.remove("name").unwrap(), Some("Alice"));
        assert_eq!(map.remove("name").unwrap(), None);
        assert!(map.is_empty());

        let log = map.tracker().log();
        assert_eq!(log.count(), 2);
        assert_eq!(log.last().unwrap().new_value, Value::Null);
    }

    #[test]
    fn test_untracked_keys() {
        let tracker = Tracker::builder().attributes(["name"]).build();
        let mut map = ObservableMap::with_tracker(tracker);
        map.set("name", json!("Bob")).unwrap();
        map.set("age", json!(31)).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.tracker().log().count(), 1);
        assert!(!map.tracker().has_attribute_changed("age"));
    }

    #[test]
    fn test_observers_per_key() {
        let name_calls = Rc::new(Cell::new(0));
        let global_calls = Rc::new(Cell::new(0));
        let (name_counter, global_counter) = (Rc::clone(&name_calls), Rc::clone(&global_calls));
        let tracker = Tracker::builder()
            .attribute_observer(
                "name",
                Observer::from_fn(move |_, _, _| name_counter.set(name_counter.get() + 1)),
            )
            .observer(Observer::from_fn(move |_, _, _| {
                global_counter.set(global_counter.get() + 1)
            }))
            .build();
        let mut map = ObservableMap::with_tracker(tracker);

        map.set("name", json!("Bob")).unwrap();
        map.set("age", json!(31)).unwrap();

        assert_eq!(name_calls.get(), 1);
        assert_eq!(global_calls.get(), 2);
    }

    #[test]
    fn test_reserved_key() {
        let tracker = Tracker::builder().tracker_attribute("history").build();
        let mut map = ObservableMap::with_tracker(tracker);

        assert!(matches!(
            map.set("history", json!(1)),
            Err(TrackerError::ReservedAttribute(_))
        ));
        assert!(!map.contains_key("history"));
    }

    #[test]
    fn test_snapshot() {
        let mut map = ObservableMap::new();
        map.set("age", 31).unwrap();

        let snapshot = map.snapshot().unwrap();
        assert_eq!(snapshot["age"], json!(31));
        assert_eq!(snapshot["tracker"].as_array().unwrap().len(), 1);
    }
}
