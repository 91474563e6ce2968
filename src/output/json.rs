//! JSON output formatting.
//!
//! Records are written one object per line so the output can be fed back
//! into the bulk commands.

use serde_json::{Map, Value};

use super::Record;
use crate::error::UmapiError;

/// Format records as JSON lines.
///
/// # Errors
///
/// Returns `UmapiError::Parse` if JSON serialization fails.
pub fn format_records_json(records: &[Record]) -> Result<String, UmapiError> {
    let mut output = String::new();
    for record in records {
        let object: Map<String, Value> = record.0.iter().cloned().collect();
        output.push_str(&serde_json::to_string(&object)?);
        output.push('\n');
    }
    Ok(output)
}
