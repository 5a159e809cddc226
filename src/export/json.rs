//! JSON Export functionality
//!
//! Exports a change log to JSON format with schema versioning.

use std::io::Write;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::changelog::{ChangeLog, Entry, Query};
use crate::error::{TrackerError, TrackerResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Change log export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Library version that created the export
    pub app_version: String,

    /// Entries in insertion order
    pub entries: Vec<Entry>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Summary of the exported entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Total number of entries
    pub entry_count: usize,

    /// Distinct attribute names, sorted
    pub attributes: Vec<String>,

    /// Timestamp of the oldest entry
    pub earliest: Option<DateTime<Utc>>,

    /// Timestamp of the newest entry
    pub latest: Option<DateTime<Utc>>,
}

impl LogExport {
    /// Build an export from a log or a filtered view of one
    pub fn from_query<Q: Query>(log: &Q) -> Self {
        let entries: Vec<Entry> = log.iter_entries().cloned().collect();

        let metadata = ExportMetadata {
            entry_count: entries.len(),
            attributes: log
                .unique_attributes()
                .into_iter()
                .map(str::to_string)
                .collect(),
            earliest: entries.iter().map(|e| e.timestamp).min(),
            latest: entries.iter().map(|e| e.timestamp).max(),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entries,
            metadata,
        }
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if self.metadata.entry_count != self.entries.len() {
            return Err(format!(
                "Metadata lists {} entries but the export holds {}",
                self.metadata.entry_count,
                self.entries.len()
            ));
        }

        Ok(())
    }

    /// Restore the exported entries as a change log
    ///
    /// Timestamps come from the wall clock, which may step backwards, so
    /// out-of-order entries are kept in log order with a warning.
    pub fn into_change_log(self) -> ChangeLog {
        if let Some(pair) = self
            .entries
            .windows(2)
            .find(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            warn!(
                "entry for '{}' at {} is older than the entry before it",
                pair[1].attribute, pair[1].timestamp
            );
        }
        self.entries.into_iter().collect()
    }
}

/// Export a change log to JSON
pub fn export_log_json<Q: Query, W: Write>(
    log: &Q,
    writer: &mut W,
    pretty: bool,
) -> TrackerResult<()> {
    let export = LogExport::from_query(log);

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }
    .map_err(|e| TrackerError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| TrackerError::Export(e.to_string()))?;
    Ok(())
}

/// Import a change log from a JSON export
pub fn import_log_json(json_str: &str) -> TrackerResult<ChangeLog> {
    let export: LogExport =
        serde_json::from_str(json_str).map_err(|e| TrackerError::Import(e.to_string()))?;

    export.validate().map_err(TrackerError::Import)?;

    Ok(export.into_change_log())
}
