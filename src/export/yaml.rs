//! YAML Export functionality
//!
//! Exports a change log to YAML format for human reading.

use std::io::Write;

use crate::changelog::{ChangeLog, Query};
use crate::error::{TrackerError, TrackerResult};
use crate::export::json::LogExport;

/// Export a change log to YAML format
pub fn export_log_yaml<Q: Query, W: Write>(log: &Q, writer: &mut W) -> TrackerResult<()> {
    let export = LogExport::from_query(log);

    // Add a header comment
    writeln!(writer, "# object-tracker change log export")
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    writeln!(writer, "# App Version: {}", export.app_version)
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    writeln!(writer, "# Entries: {}", export.metadata.entry_count)
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| TrackerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}

/// Import a change log from a YAML export
///
/// Comment lines are part of the YAML syntax, so the header needs no
/// special handling.
pub fn import_log_yaml(yaml_str: &str) -> TrackerResult<ChangeLog> {
    let export: LogExport =
        serde_yaml::from_str(yaml_str).map_err(|e| TrackerError::Import(e.to_string()))?;

    export.validate().map_err(TrackerError::Import)?;

    Ok(export.into_change_log())
}
