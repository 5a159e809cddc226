//! Export module for object-tracker
//!
//! Writes a change log (or any filtered view of one) in several formats:
//! - CSV: one row per entry (spreadsheet-compatible)
//! - JSON: machine-readable document with schema versioning
//! - YAML: human-readable document with a comment header

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_log_csv;
pub use json::{export_log_json, import_log_json, ExportMetadata, LogExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_log_yaml, import_log_yaml};
