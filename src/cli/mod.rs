//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the tracker library.

pub mod config;
pub mod run;

pub use config::{format_config, handle_config, handle_init};
pub use run::{handle_run, Mutation, OutputFormat, RunArgs, Script};
