//! Query surface shared by the change log and its filtered views
//!
//! `filter` and `exclude` are pure projections: they return a `LogView`
//! that borrows the underlying entries and answers the same queries, so
//! calls chain without touching the log itself.

use std::collections::BTreeSet;

use super::entry::Entry;
use super::replay::Replay;

/// Read-only queries over an ordered sequence of entries
pub trait Query {
    /// Iterate entries oldest to newest
    fn iter_entries(&self) -> impl Iterator<Item = &Entry>;

    /// Entries whose attribute is in `attributes`
    ///
    /// An empty `attributes` slice places no restriction on the attribute.
    /// With `changes_only`, entries where old equals new are dropped too.
    fn filter(&self, attributes: &[&str], changes_only: bool) -> LogView<'_> {
        select(self.iter_entries(), attributes, true, changes_only)
    }

    /// Entries whose attribute is not in `attributes`
    fn exclude(&self, attributes: &[&str], changes_only: bool) -> LogView<'_> {
        select(self.iter_entries(), attributes, false, changes_only)
    }

    /// Earliest entry
    fn first(&self) -> Option<&Entry> {
        self.iter_entries().next()
    }

    /// Most recent entry
    fn last(&self) -> Option<&Entry> {
        self.iter_entries().last()
    }

    /// All entries in insertion order
    fn all(&self) -> Vec<&Entry> {
        self.iter_entries().collect()
    }

    /// Number of entries
    fn count(&self) -> usize {
        self.iter_entries().count()
    }

    fn is_empty(&self) -> bool {
        self.iter_entries().next().is_none()
    }

    /// Distinct attribute names
    fn unique_attributes(&self) -> BTreeSet<&str> {
        self.iter_entries()
            .map(|entry| entry.attribute.as_str())
            .collect()
    }

    /// Whether any entry (for `attribute`, if given) changed its value
    fn has_changed(&self, attribute: Option<&str>) -> bool {
        self.iter_entries()
            .filter(|entry| attribute.map_or(true, |attr| entry.attribute == attr))
            .any(Entry::is_change)
    }

    /// First entry recorded for `attribute`
    fn first_change(&self, attribute: &str) -> Option<&Entry> {
        self.iter_entries().find(|entry| entry.attribute == attribute)
    }

    /// Last entry recorded for `attribute`
    fn last_change(&self, attribute: &str) -> Option<&Entry> {
        self.iter_entries()
            .filter(|entry| entry.attribute == attribute)
            .last()
    }

    /// Human-readable description of each entry, oldest first
    ///
    /// Each call starts a fresh sequence.
    fn replay(&self) -> Replay<'_> {
        Replay::new(self.all())
    }
}

/// Project `entries` onto those whose attribute is (or, with `keep` off,
/// is not) in `attributes`
///
/// An empty `attributes` slice matches nothing, so it keeps every entry
/// when including and drops none when excluding.
fn select<'a>(
    entries: impl Iterator<Item = &'a Entry>,
    attributes: &[&str],
    keep: bool,
    changes_only: bool,
) -> LogView<'a> {
    LogView::new(
        entries
            .filter(|entry| {
                let listed = attributes.iter().any(|attr| *attr == entry.attribute);
                if keep {
                    attributes.is_empty() || listed
                } else {
                    !listed
                }
            })
            .filter(|entry| !changes_only || entry.is_change())
            .collect(),
    )
}

/// A filtered, read-only projection of a change log
#[derive(Debug, Clone, Default)]
pub struct LogView<'a> {
    entries: Vec<&'a Entry>,
}

impl<'a> LogView<'a> {
    pub(crate) fn new(entries: Vec<&'a Entry>) -> Self {
        Self { entries }
    }

    /// The selected entries, borrowed from the log
    pub fn entries(&self) -> &[&'a Entry] {
        &self.entries
    }

    /// Narrow the view further
    ///
    /// Shadows `Query::filter` so the result borrows the log rather than
    /// this view, which lets chained projections outlive the intermediate.
    pub fn filter(&self, attributes: &[&str], changes_only: bool) -> LogView<'a> {
        select(self.entries.iter().copied(), attributes, true, changes_only)
    }

    /// Drop entries for `attributes` from the view
    pub fn exclude(&self, attributes: &[&str], changes_only: bool) -> LogView<'a> {
        select(self.entries.iter().copied(), attributes, false, changes_only)
    }
}

impl Query for LogView<'_> {
    fn iter_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().map(|entry| &**entry)
    }
}

impl<'a> IntoIterator for LogView<'a> {
    type Item = &'a Entry;
    type IntoIter = std::vec::IntoIter<&'a Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
