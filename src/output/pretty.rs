use colored::Colorize;

use super::{display_value, Record};
use crate::actions::ExecutionError;

/// Format records as padded `key : value` blocks separated by blank lines.
pub fn format_records_pretty(records: &[Record]) -> String {
    records
        .iter()
        .map(format_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_block(record: &Record) -> String {
    let padding = record.keys().map(str::len).max().unwrap_or(0) + 1;
    let mut output = String::new();
    for (key, value) in &record.0 {
        output.push_str(&format!("{key:<padding$}: {}\n", display_value(value)));
    }
    output
}

/// Render the error lists of failed actions, numbered from 1.
pub fn render_errors(errors: &[&[ExecutionError]]) -> String {
    let mut output = String::new();
    for (n, messages) in errors.iter().enumerate() {
        output.push_str(&format!("{}\n", format!("Error {} messages:", n + 1).red()));
        for error in *messages {
            let mut record = Record::default();
            record.push("errorCode", error.kind.as_str());
            record.push("message", error.message.as_str());
            if let Some(step) = error.step {
                record.push("step", step);
            }
            for line in format_block(&record).lines() {
                output.push_str(&format!("   {line}\n"));
            }
        }
    }
    output
}

/// Render the outcome of a bulk command.
///
/// Actions that recorded errors count as failed; everything else executed
/// counts as succeeded.
pub fn render_summary(executed: usize, errors: &[&[ExecutionError]]) -> String {
    let failed = errors.len();
    let mut record = Record::default();
    record.push("Executed", executed);
    record.push("Succeeded", executed.saturating_sub(failed));
    record.push("Errors", failed);

    let mut output = format!("{}\n", "--- Action Summary ---".bold());
    output.push_str(&format_block(&record));
    output.push_str("----------------------\n");

    if !errors.is_empty() {
        output.push_str(&format!("{}\n", "--- Error Summary ---".bold()));
        output.push_str(&render_errors(errors));
        output.push_str("--------------\n");
    }
    output
}
