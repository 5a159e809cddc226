//! Pluggable call-stack capture
//!
//! Mutation entry points are `#[track_caller]`, so the location handed to a
//! `StackCapture` is the user's assignment, not a frame inside this crate.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::Location;

use log::debug;

use crate::changelog::{CallStack, Frame};

/// Produces the frames recorded with an entry
pub trait StackCapture {
    fn capture(&self, caller: &'static Location<'static>) -> CallStack;
}

impl<F> StackCapture for F
where
    F: Fn(&'static Location<'static>) -> CallStack,
{
    fn capture(&self, caller: &'static Location<'static>) -> CallStack {
        self(caller)
    }
}

/// Records the mutating call site and, when readable, its source line
///
/// Source files are read once and cached. Paths are the ones the compiler
/// recorded, so source text is only found when running from the crate root.
///
/// A caller `Location` carries no function name, so frames from this
/// capture leave `function` empty and replay shows `<unknown>`. Plug in a
/// custom `StackCapture` (any closure over the location works) to attach
/// names.
#[derive(Debug)]
pub struct CallSiteCapture {
    read_source: bool,
    sources: RefCell<HashMap<String, Option<Vec<String>>>>,
}

impl CallSiteCapture {
    pub fn new() -> Self {
        Self {
            read_source: true,
            sources: RefCell::new(HashMap::new()),
        }
    }

    /// Capture file positions only
    pub fn without_source() -> Self {
        Self {
            read_source: false,
            ..Self::new()
        }
    }

    fn source_line(&self, file: &str, line: u32) -> Option<String> {
        let mut sources = self.sources.borrow_mut();
        let lines = sources.entry(file.to_string()).or_insert_with(|| {
            match std::fs::read_to_string(file) {
                Ok(text) => Some(text.lines().map(str::to_string).collect()),
                Err(e) => {
                    debug!("source for {} unavailable: {}", file, e);
                    None
                }
            }
        });

        let index = line.checked_sub(1)? as usize;
        lines
            .as_ref()?
            .get(index)
            .map(|text| text.trim().to_string())
    }
}

impl Default for CallSiteCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl StackCapture for CallSiteCapture {
    fn capture(&self, caller: &'static Location<'static>) -> CallStack {
        let mut frame = Frame::new(caller.file(), caller.line(), caller.column());
        if self.read_source {
            if let Some(source) = self.source_line(caller.file(), caller.line()) {
                frame = frame.with_source(source);
            }
        }
        vec![frame]
    }
}
