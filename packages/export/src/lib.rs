#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV export of report store snapshots.
//!
//! Produces the on-demand download offered to the authority view: one
//! header row, a fixed column order, and every field quoted so free-text
//! descriptions with commas or quotes survive a round-trip through any
//! spreadsheet tool.

use chrono::SecondsFormat;
use mangrove_watch_report_models::Report;
use thiserror::Error;

/// Suggested file name for the exported snapshot.
pub const EXPORT_FILE_NAME: &str = "mangrove-reports.csv";

/// Column order of the exported CSV.
pub const COLUMNS: [&str; 9] = [
    "id",
    "createdAt",
    "reporterName",
    "incidentType",
    "description",
    "lat",
    "lng",
    "status",
    "hasPhoto",
];

/// Errors from CSV generation.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The generated bytes were not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writing the underlying CSV buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the snapshot as a CSV document.
///
/// Timestamps are ISO 8601 with millisecond precision and a `Z` suffix,
/// matching the stored wire format.
///
/// # Errors
///
/// Returns [`ExportError`] if CSV serialization fails.
pub fn reports_to_csv(reports: &[Report]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;

    for report in reports {
        writer.write_record([
            report.id.clone(),
            report
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            report.reporter_name.clone(),
            report.incident_type.clone(),
            report.description.clone(),
            report.lat.to_string(),
            report.lng.to_string(),
            report.status.to_string(),
            report.has_photo.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}
