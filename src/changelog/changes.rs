//! Append-only change log

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::{CallStack, Entry};
use super::query::Query;

/// Ordered, append-only record of attribute mutations
///
/// Entries are only ever appended; the single way to remove them is
/// `reset_buffer`, which clears the whole log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<Entry>,
}

impl ChangeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry stamped with the current UTC time
    pub fn push(
        &mut self,
        attribute: impl Into<String>,
        old_value: Value,
        new_value: Value,
        call_stack: Option<CallStack>,
    ) -> &Entry {
        self.push_entry(Entry::new(attribute, old_value, new_value, call_stack))
    }

    /// Append an already constructed entry
    pub fn push_entry(&mut self, entry: Entry) -> &Entry {
        trace!(
            "change log: {} {} -> {}",
            entry.attribute,
            entry.old_value,
            entry.new_value
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove every entry
    pub fn reset_buffer(&mut self) {
        self.entries.clear();
    }

    /// The entries as a slice, oldest first
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Query for ChangeLog {
    fn iter_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<Entry> for ChangeLog {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ChangeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeLog: {}", self.entries.len())
    }
}
