use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;

use crate::actions::{GroupUpdateRequest, UserCreateRequest, UserUpdateRequest};
use crate::error::ValidationError;

/// One row of a bulk user creation file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCreateRecord {
    #[serde(rename = "type")]
    pub identity_type: String,
    pub email: String,
    #[serde(default, deserialize_with = "optional")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "list")]
    pub groups: Vec<String>,
}

impl From<UserCreateRecord> for UserCreateRequest {
    fn from(record: UserCreateRecord) -> Self {
        Self {
            identity_type: record.identity_type,
            email: record.email,
            country: record.country.unwrap_or_default(),
            firstname: record.firstname,
            lastname: record.lastname,
            username: record.username,
            domain: record.domain,
            groups: record.groups,
        }
    }
}

/// One row of a bulk user removal file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDeleteRecord {
    pub email: String,
    pub hard_delete: String,
}

impl UserDeleteRecord {
    /// Whether the account should also be removed from its directory.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFlag` unless `hard_delete` is Y or N.
    pub fn is_hard(&self) -> Result<bool, ValidationError> {
        parse_flag("hard_delete", &self.hard_delete)
    }
}

/// One row of a bulk user update file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserUpdateRecord {
    pub email: String,
    #[serde(default, deserialize_with = "optional")]
    pub email_new: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "list")]
    pub add_groups: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub remove_groups: Vec<String>,
}

impl UserUpdateRecord {
    /// Split into the user's current email and the requested changes.
    #[must_use]
    pub fn into_request(self) -> (String, UserUpdateRequest) {
        let request = UserUpdateRequest {
            email_new: self.email_new,
            firstname: self.firstname,
            lastname: self.lastname,
            username: self.username,
            country: None,
            add_groups: self.add_groups,
            remove_groups: self.remove_groups,
        };
        (self.email, request)
    }
}

/// One row of a bulk group creation file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupCreateRecord {
    pub name: String,
    #[serde(default, deserialize_with = "optional")]
    pub description: Option<String>,
}

/// One row of a bulk group update file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupUpdateRecord {
    pub name: String,
    #[serde(default, deserialize_with = "optional")]
    pub name_new: Option<String>,
    #[serde(default, deserialize_with = "optional")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "list")]
    pub add_users: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub remove_users: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub add_profiles: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub remove_profiles: Vec<String>,
}

impl GroupUpdateRecord {
    /// Split into the group's current name and the requested changes.
    #[must_use]
    pub fn into_request(self) -> (String, GroupUpdateRequest) {
        let request = GroupUpdateRequest {
            name_new: self.name_new,
            description: self.description,
            add_users: self.add_users,
            remove_users: self.remove_users,
            add_profiles: self.add_profiles,
            remove_profiles: self.remove_profiles,
        };
        (self.name, request)
    }
}

/// One row of a bulk group removal file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupDeleteRecord {
    pub name: String,
}

/// Split a comma-delimited list. An empty string is an empty list.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        value.split(',').map(str::to_string).collect()
    }
}

/// Parse a Y/N flag, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFlag` for anything else.
pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "y" => Ok(true),
        "n" => Ok(false),
        _ => Err(ValidationError::InvalidFlag {
            field,
            value: value.to_string(),
        }),
    }
}

/// An empty string is the same as a missing value.
fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

/// A list column: an array of names or a comma-delimited string.
fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of names or a comma-delimited string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(split_list(value))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut names = Vec::new();
            while let Some(name) = seq.next_element::<String>()? {
                names.push(name);
            }
            Ok(names)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ListVisitor)
}
