//! The `run` command
//!
//! Replays a mutation script through a tracked map and prints the
//! resulting change log.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::changelog::{describe_change, Frame, Query};
use crate::config::TrackerSettings;
use crate::display::{format_entry_details, format_entry_table};
use crate::error::{TrackerError, TrackerResult};
use crate::export::{export_log_csv, export_log_json, export_log_yaml};
use crate::observable::{ObservableMap, Tracked};
use crate::tracker::{Observer, Tracker};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One block per change, with call sites
    #[default]
    Replay,
    /// Aligned table
    Table,
    /// Verbose block per change
    Details,
    /// JSON export document
    Json,
    /// YAML export document
    Yaml,
    /// One CSV row per change
    Csv,
}

/// Arguments of the `run` command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a YAML or JSON mutation script
    pub script: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "replay")]
    pub format: OutputFormat,

    /// Write the change log to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Skip assignments that leave the value unchanged
    #[arg(long)]
    pub changes_only: bool,

    /// Do not record call sites
    #[arg(long)]
    pub no_stack_trace: bool,

    /// Only track this attribute (repeatable)
    #[arg(short, long = "attribute", value_name = "NAME")]
    pub attributes: Vec<String>,

    /// Print every change of this attribute as it happens (repeatable)
    #[arg(short, long = "watch", value_name = "NAME")]
    pub watch: Vec<String>,
}

/// A single assignment in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub attribute: String,
    pub value: Value,
}

/// A mutation script
///
/// ```yaml
/// initial:
///   name: Alice
/// mutations:
///   - { attribute: name, value: Bob }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Tracker settings; the configured settings are used when absent
    #[serde(default)]
    pub settings: Option<TrackerSettings>,

    /// Values present before tracking starts
    #[serde(default)]
    pub initial: BTreeMap<String, Value>,

    /// Assignments applied in order
    #[serde(default)]
    pub mutations: Vec<Mutation>,
}

impl Script {
    /// Load a script, choosing the parser by file extension (YAML unless `.json`)
    pub fn load(path: &Path) -> TrackerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Io(format!("Failed to read script {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| {
            TrackerError::Config(format!("Failed to parse script {}: {}", path.display(), e))
        })
    }

    /// Apply the script to a fresh tracked map
    ///
    /// Initial values are assigned with the tracker suspended, so only the
    /// mutations reach the log. Each entry's frame points at the mutation
    /// in the script at `origin`: the line is the 1-based mutation number.
    pub fn apply(
        &self,
        origin: &Path,
        mut tracker: Tracker,
    ) -> TrackerResult<ObservableMap<Value>> {
        tracker.deactivate();
        let mut map = ObservableMap::with_tracker(tracker);
        for (attribute, value) in &self.initial {
            map.set(attribute.as_str(), value.clone())?;
        }
        map.tracker_mut().activate();

        for (index, mutation) in self.mutations.iter().enumerate() {
            debug!("{} = {}", mutation.attribute, mutation.value);
            let frame = mutation_frame(origin, index, mutation);
            map.set_with_stack(
                mutation.attribute.as_str(),
                mutation.value.clone(),
                Some(vec![frame]),
            )?;
        }

        Ok(map)
    }
}

/// The frame recorded for the mutation at `index` of a script
fn mutation_frame(origin: &Path, index: usize, mutation: &Mutation) -> Frame {
    let line = u32::try_from(index + 1).unwrap_or(u32::MAX);
    Frame::new(origin.display().to_string(), line, 0)
        .with_function(format!("mutations[{}]", index))
        .with_source(format!("{} = {}", mutation.attribute, mutation.value))
}

/// Settings for a run: script settings (or the configured ones), then flags
fn effective_settings(args: &RunArgs, script: &Script, configured: &TrackerSettings) -> TrackerSettings {
    let mut settings = script.settings.clone().unwrap_or_else(|| configured.clone());

    if args.changes_only {
        settings.changes_only = true;
    }
    if args.no_stack_trace {
        settings.stack_trace = false;
    }
    if !args.attributes.is_empty() {
        settings.attributes = args.attributes.clone();
    }

    settings
}

/// Build the tracker for a run, with a printing observer per watched attribute
fn build_tracker(settings: &TrackerSettings, watch: &[String]) -> Tracker {
    let mut builder = Tracker::builder().settings(settings);

    for name in watch {
        let observer = Observer::from_fn(|attribute, old, new| {
            let change = describe_change(old, new).unwrap_or_else(|| "unchanged".to_string());
            eprintln!("watch: {}: {}", attribute, change);
        })
        .with_label(format!("watch:{}", name));
        builder = builder.attribute_observer(name.clone(), observer);
    }

    builder.build()
}

/// Write the log in the requested format
pub fn write_log<Q: Query, W: Write>(
    log: &Q,
    format: OutputFormat,
    pretty: bool,
    writer: &mut W,
) -> TrackerResult<()> {
    match format {
        OutputFormat::Replay => {
            for block in log.replay() {
                write!(writer, "{}", block)?;
            }
        }
        OutputFormat::Table => writeln!(writer, "{}", format_entry_table(&log.all()))?,
        OutputFormat::Details => {
            if log.is_empty() {
                writeln!(writer, "No changes recorded.")?;
            }
            for (index, entry) in log.iter_entries().enumerate() {
                if index > 0 {
                    writeln!(writer)?;
                }
                write!(writer, "{}", format_entry_details(entry))?;
            }
        }
        OutputFormat::Json => export_log_json(log, writer, pretty)?,
        OutputFormat::Yaml => export_log_yaml(log, writer)?,
        OutputFormat::Csv => export_log_csv(log, writer)?,
    }

    writer.flush()?;
    Ok(())
}

/// Handle the `run` command
pub fn handle_run(args: RunArgs, configured: &TrackerSettings) -> TrackerResult<()> {
    let script = Script::load(&args.script)?;
    info!(
        "Loaded {} with {} initial value(s) and {} mutation(s)",
        args.script.display(),
        script.initial.len(),
        script.mutations.len()
    );

    let settings = effective_settings(&args, &script, configured);
    settings.validate()?;

    let map = script.apply(&args.script, build_tracker(&settings, &args.watch))?;
    let log = map.tracker().log();
    info!("Recorded {} change(s)", log.len());

    match &args.output {
        Some(output) => {
            let file = File::create(output).map_err(|e| {
                TrackerError::Export(format!(
                    "Failed to create file {}: {}",
                    output.display(),
                    e
                ))
            })?;
            let mut writer = BufWriter::new(file);
            write_log(log, args.format, args.pretty, &mut writer)?;
            println!("Change log written to: {}", output.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_log(log, args.format, args.pretty, &mut writer)?;
        }
    }

    Ok(())
}
