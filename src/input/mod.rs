//! Bulk input files.
//!
//! Every row is first turned into a JSON object of its columns, so CSV and
//! JSON-lines files go through the same record types.

mod records;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use records::{
    parse_flag, split_list, GroupCreateRecord, GroupDeleteRecord, GroupUpdateRecord,
    UserCreateRecord, UserDeleteRecord, UserUpdateRecord,
};

use crate::error::UmapiError;

/// Format of a bulk input file.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

/// Read every record of a bulk input file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row does not match the
/// record type.
pub fn read_file<R: DeserializeOwned>(path: &Path, format: InputFormat) -> Result<Vec<R>, UmapiError> {
    let file = File::open(path)?;
    read_records(BufReader::new(file), format)
}

/// Read every record from `reader`.
///
/// # Errors
///
/// Returns an error if a row cannot be read or does not match the record type.
pub fn read_records<R: DeserializeOwned>(
    reader: impl Read,
    format: InputFormat,
) -> Result<Vec<R>, UmapiError> {
    let rows = match format {
        InputFormat::Csv => csv_rows(reader)?,
        InputFormat::Json => json_rows(reader)?,
    };

    rows.into_iter()
        .map(|row| Ok(serde_json::from_value(row)?))
        .collect()
}

fn csv_rows(reader: impl Read) -> Result<Vec<Value>, UmapiError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    reader
        .deserialize::<HashMap<String, String>>()
        .map(|row| {
            let row = row?;
            Ok(Value::Object(
                row.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            ))
        })
        .collect()
}

fn json_rows(reader: impl Read) -> Result<Vec<Value>, UmapiError> {
    let mut rows = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_read_csv_users() {
        let data = "\
type,email,firstname,lastname,country,username,domain,groups
federatedID,jdoe@example.com,John,Doe,US,,,\"Designers,Stock Users\"
adobeID,ann@example.net,Ann,,gb,,,
";
        let users: Vec<UserCreateRecord> = read_records(data.as_bytes(), InputFormat::Csv).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].groups, vec!["Designers", "Stock Users"]);
        assert_eq!(users[0].username, None);
        assert_eq!(users[1].lastname, None);
        assert!(users[1].groups.is_empty());
    }

    #[test]
    fn test_read_csv_keeps_numeric_names() {
        let data = "name,description\n2024,\n";
        let groups: Vec<GroupCreateRecord> = read_records(data.as_bytes(), InputFormat::Csv).unwrap();
        assert_eq!(groups[0].name, "2024");
        assert_eq!(groups[0].description, None);
    }

    #[test]
    fn test_read_json_lines() {
        let data = r#"{"name": "Designers", "add_users": ["a@example.com", "b@example.com"]}

{"name": "Stock", "name_new": "Stock Users", "remove_profiles": "Default Stock"}
"#;
        let groups: Vec<GroupUpdateRecord> = read_records(data.as_bytes(), InputFormat::Json).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].add_users.len(), 2);
        assert_eq!(groups[1].name_new.as_deref(), Some("Stock Users"));
        assert_eq!(groups[1].remove_profiles, vec!["Default Stock"]);
    }

    #[test]
    fn test_read_json_rejects_garbage() {
        let result: Result<Vec<GroupDeleteRecord>, _> =
            read_records("not json\n".as_bytes(), InputFormat::Json);
        assert!(matches!(result, Err(UmapiError::Parse(_))));
    }

    #[test]
    fn test_missing_required_column() {
        let data = "description\nno name\n";
        let result: Result<Vec<GroupCreateRecord>, _> = read_records(data.as_bytes(), InputFormat::Csv);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "email,hard_delete").unwrap();
        writeln!(file, "jdoe@example.com, y ").unwrap();

        let rows: Vec<UserDeleteRecord> = read_file(file.path(), InputFormat::Csv).unwrap();
        assert_eq!(rows[0].hard_delete, " y ");
        assert!(rows[0].is_hard().unwrap());
    }
}
