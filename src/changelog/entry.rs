//! Change log entry data structures
//!
//! Defines a single recorded attribute mutation and the call-stack frames
//! that may accompany it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::diff::describe_change;

/// One frame of a captured call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Source file of the frame
    pub file: String,

    /// 1-based line number
    pub line: u32,

    /// 1-based column number
    #[serde(default)]
    pub column: u32,

    /// Function name, when the capture mechanism can resolve it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Source text of the line, when it could be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Frame {
    /// Create a frame for a file position
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            function: None,
            source: None,
        }
    }

    /// Attach a function name
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Attach the source text of the line
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// `file:line` position of the frame
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.location(),
            self.function.as_deref().unwrap_or("<unknown>")
        )
    }
}

/// Ordered frames, innermost call site first
pub type CallStack = Vec<Frame>;

/// A single recorded attribute mutation
///
/// Values are owned snapshots taken when the mutation happened, so later
/// changes to the subject never alter an entry already in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Name of the mutated attribute (or key, for keyed containers)
    pub attribute: String,

    /// Value before the mutation
    pub old_value: Value,

    /// Value after the mutation
    pub new_value: Value,

    /// When the mutation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Frames captured at mutation time, if stack capture was enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_stack: Option<CallStack>,
}

impl Entry {
    /// Create an entry stamped with the current time
    pub fn new(
        attribute: impl Into<String>,
        old_value: Value,
        new_value: Value,
        call_stack: Option<CallStack>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            old_value,
            new_value,
            timestamp: Utc::now(),
            call_stack,
        }
    }

    /// Whether the mutation actually changed the value
    pub fn is_change(&self) -> bool {
        self.old_value != self.new_value
    }

    /// The innermost captured frame, if any
    pub fn call_site(&self) -> Option<&Frame> {
        self.call_stack.as_ref().and_then(|stack| stack.first())
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.attribute
        );

        match describe_change(&self.old_value, &self.new_value) {
            Some(change) => output.push_str(&format!(": {}", change)),
            None => output.push_str(" (unchanged)"),
        }

        if let Some(frame) = self.call_site() {
            output.push_str(&format!("\n  at {}", frame));
        }

        output
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Attribute '{}' : {} --> {}",
            self.timestamp, self.attribute, self.old_value, self.new_value
        )
    }
}
