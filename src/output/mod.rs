//! Output formatting for umapi-cli.
//!
//! Read commands turn users and groups into ordered [`Record`]s, which are then
//! written as pretty blocks, JSON lines or CSV.

mod csv;
mod json;
mod pretty;

use serde::Serialize;
use serde_json::Value;

use crate::cli::args::OutputFormat;
use crate::error::UmapiError;
use crate::umapi::{Group, User};

pub use self::csv::format_records_csv;
pub use json::format_records_json;
pub use pretty::{format_records_pretty, render_errors, render_summary};

/// Fields shown for a user, in display order.
pub const USER_FIELDS: &[&str] = &[
    "type",
    "email",
    "firstname",
    "lastname",
    "country",
    "username",
    "domain",
    "groups",
];

/// Fields shown for a group, in display order.
pub const GROUP_FIELDS: &[&str] = &[
    "groupName",
    "type",
    "adminGroupName",
    "memberCount",
    "productName",
    "licenseQuota",
];

/// Key/value pairs of one output row, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(pub Vec<(String, Value)>);

impl Record {
    /// Keep the listed fields of a serialized value. Missing and null fields
    /// are left out.
    ///
    /// # Errors
    ///
    /// Returns `UmapiError::Parse` if the value cannot be serialized.
    pub fn project<T: Serialize>(value: &T, fields: &[&str]) -> Result<Self, UmapiError> {
        let value = serde_json::to_value(value)?;
        Ok(Self(
            fields
                .iter()
                .filter_map(|field| match value.get(field) {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(((*field).to_string(), v.clone())),
                })
                .collect(),
        ))
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Project users onto [`USER_FIELDS`].
///
/// # Errors
///
/// Returns `UmapiError::Parse` if a user cannot be serialized.
pub fn user_records(users: &[User]) -> Result<Vec<Record>, UmapiError> {
    users.iter().map(|u| Record::project(u, USER_FIELDS)).collect()
}

/// Project groups onto [`GROUP_FIELDS`].
///
/// # Errors
///
/// Returns `UmapiError::Parse` if a group cannot be serialized.
pub fn group_records(groups: &[Group]) -> Result<Vec<Record>, UmapiError> {
    groups.iter().map(|g| Record::project(g, GROUP_FIELDS)).collect()
}

/// Format records based on output format
///
/// # Errors
///
/// Returns an error if JSON or CSV serialization fails.
pub fn format_records(records: &[Record], format: OutputFormat) -> Result<String, UmapiError> {
    match format {
        OutputFormat::Pretty => Ok(format_records_pretty(records)),
        OutputFormat::Json => format_records_json(records),
        OutputFormat::Csv => format_records_csv(records),
    }
}

/// Plain-text rendering of a scalar or list value.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
