//! Command implementations for umapi-cli.
//!
//! Every command returns the text to print. Commands that change something
//! build an [`ActionQueue`], execute it once and report on its errors.

mod groups;
mod users;

pub use groups::{
    group_create, group_create_bulk, group_delete, group_delete_bulk, group_read, group_read_all,
    group_update, group_update_bulk,
};
pub use users::{
    user_create, user_create_bulk, user_delete, user_delete_bulk, user_read, user_read_all,
    user_update, user_update_bulk,
};

use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;
use colored::Colorize;

use crate::actions::{ActionQueue, Operation};
use crate::cli::args::Cli;
use crate::error::{UmapiError, ValidationError};
use crate::output::{render_errors, render_summary};
use crate::umapi::Connection;

/// Generate the completion script for `shell`.
#[must_use]
pub fn completions(shell: Shell) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "umapi", &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `output` to `out_file` when given, otherwise hand it back for
/// printing.
fn write_output(output: String, out_file: Option<&Path>) -> Result<String, UmapiError> {
    match out_file {
        Some(path) => {
            std::fs::write(path, output)?;
            Ok(String::new())
        },
        None => Ok(output),
    }
}

/// Result line of a single-action command.
fn single_result<C: Connection + ?Sized>(queue: &ActionQueue<'_, C>, operation: Operation) -> String {
    let errors = queue.errors();
    if errors.is_empty() {
        format!("{operation} operation succeeded").green().to_string()
    } else {
        format!(
            "{}\n{}",
            "One or more errors occurred".red(),
            render_errors(&errors).trim_end()
        )
    }
}

/// Action and error summaries of a bulk command.
fn bulk_result<C: Connection + ?Sized>(queue: &ActionQueue<'_, C>, executed: usize) -> String {
    render_summary(executed, &queue.errors())
}

/// Attach the 1-based record number to a queuing failure.
fn at_record(index: usize) -> impl FnOnce(ValidationError) -> UmapiError {
    move |source| UmapiError::InvalidRecord {
        record: index + 1,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_mention_commands() {
        let script = completions(Shell::Bash);
        assert!(script.contains("umapi"));
        assert!(script.contains("user-create-bulk"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let printed = write_output("a,b\n".to_string(), Some(&path)).unwrap();
        assert!(printed.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");

        let printed = write_output("x".to_string(), None).unwrap();
        assert_eq!(printed, "x");
    }

    #[test]
    fn test_at_record_is_one_based() {
        let err = at_record(0)(ValidationError::MissingField("name"));
        assert!(matches!(err, UmapiError::InvalidRecord { record: 1, .. }));
    }
}
