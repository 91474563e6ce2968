//! CSV output formatting.

use std::collections::BTreeSet;

use super::{display_value, Record};
use crate::error::UmapiError;

/// Format records as CSV.
///
/// The header is the sorted union of every record's keys. Lists are joined
/// with commas. Nothing is written for an empty slice.
///
/// # Errors
///
/// Returns `UmapiError::Csv` if a row cannot be written.
pub fn format_records_csv(records: &[Record]) -> Result<String, UmapiError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let header: BTreeSet<&str> = records.iter().flat_map(Record::keys).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for record in records {
        let row: Vec<String> = header
            .iter()
            .map(|key| record.get(key).map(display_value).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| UmapiError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
