//! Human-readable replay of recorded entries

use super::entry::Entry;

/// Line printed at the top of every replayed entry
pub const REPLAY_DELIMITER: &str = "----------------------------------------";

/// Lazy iterator formatting one entry per item, oldest first
///
/// Formatting happens on `next`, so abandoning the iterator early costs
/// nothing for the remaining entries.
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    entries: std::vec::IntoIter<&'a Entry>,
}

impl<'a> Replay<'a> {
    pub(crate) fn new(entries: Vec<&'a Entry>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl Iterator for Replay<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.entries.next().map(format_replay_entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Replay<'_> {}

/// Format a single entry in replay form
pub fn format_replay_entry(entry: &Entry) -> String {
    let mut output = format!(
        "{}\n{} = {} (was {})\n",
        REPLAY_DELIMITER, entry.attribute, entry.new_value, entry.old_value
    );

    if let Some(stack) = entry.call_stack.as_ref().filter(|stack| !stack.is_empty()) {
        output.push('\n');
        for frame in stack {
            output.push_str(&format!("{}\n", frame));
            if let Some(source) = &frame.source {
                output.push_str(&format!("    {}\n", source.trim()));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::{ChangeLog, Frame, Query};
    use serde_json::json;

    #[test]
    fn test_replay_without_stack() {
        let mut log = ChangeLog::new();
        log.push("name", json!("Alice"), json!("Bob"), None);

        let lines: Vec<String> = log.replay().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            format!("{}\nname = \"Bob\" (was \"Alice\")\n", REPLAY_DELIMITER)
        );
    }

    #[test]
    fn test_replay_with_stack() {
        let mut log = ChangeLog::new();
        let frame = Frame::new("src/user.rs", 42, 9)
            .with_function("rename")
            .with_source("    user.set(\"name\", \"Bob\")?;");
        log.push("name", json!("Alice"), json!("Bob"), Some(vec![frame]));

        let text = log.replay().next().unwrap();
        assert!(text.starts_with(REPLAY_DELIMITER));
        assert!(text.contains("name = \"Bob\""));
        assert!(text.contains("\n\nsrc/user.rs:42 - rename\n"));
        assert!(text.ends_with("    user.set(\"name\", \"Bob\")?;\n"));
    }

    #[test]
    fn test_replay_is_ordered_and_restartable() {
        let mut log = ChangeLog::new();
        log.push("a", json!(1), json!(2), None);
        log.push("b", json!(3), json!(4), None);

        let first: Vec<String> = log.replay().collect();
        let second: Vec<String> = log.replay().collect();

        assert_eq!(first, second);
        assert!(first[0].contains("a = 2"));
        assert!(first[1].contains("b = 4"));
        assert_eq!(log.replay().len(), 2);
    }

    #[test]
    fn test_replay_filtered_view() {
        let mut log = ChangeLog::new();
        log.push("a", json!(1), json!(2), None);
        log.push("b", json!(3), json!(4), None);

        let lines: Vec<String> = log.filter(&["b"], false).replay().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("b = 4 (was 3)"));
    }
}
