//! CSV Export functionality
//!
//! Exports change log entries to CSV, one row per entry. Values are written
//! as compact JSON so nested data survives in a single cell.

use std::io::Write;

use crate::changelog::Query;
use crate::error::{TrackerError, TrackerResult};

/// Column names of the CSV export
pub const CSV_HEADER: [&str; 5] = ["attribute", "old_value", "new_value", "timestamp", "call_site"];

/// Export every entry of a log or view to CSV
pub fn export_log_csv<Q: Query, W: Write>(log: &Q, writer: &mut W) -> TrackerResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    for entry in log.iter_entries() {
        let call_site = entry
            .call_site()
            .map(|frame| frame.location())
            .unwrap_or_default();

        csv_writer
            .write_record([
                entry.attribute.clone(),
                entry.old_value.to_string(),
                entry.new_value.to_string(),
                entry.timestamp.to_rfc3339(),
                call_site,
            ])
            .map_err(|e| TrackerError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}
