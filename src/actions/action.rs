//! Action types for the action queue.
//!
//! An [`Action`] is one intended mutation of a user or group, made up of one
//! or more ordered [`Step`]s. Apart from its execution errors it never changes
//! after construction.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ValidationError;

static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2}$").unwrap_or_else(|e| panic!("Invalid country code regex: {e}"))
});

/// Identity-management model of a user, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    /// Personal Adobe ID owned by the user.
    #[serde(rename = "adobeID")]
    AdobeId,
    /// Enterprise ID owned by the organization.
    #[serde(rename = "enterpriseID")]
    EnterpriseId,
    /// Federated ID authenticated through the organization's SSO.
    #[serde(rename = "federatedID")]
    FederatedId,
}

impl IdentityType {
    /// Wire spelling of this identity type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdobeId => "adobeID",
            Self::EnterpriseId => "enterpriseID",
            Self::FederatedId => "federatedID",
        }
    }

    /// Name of the create step for this identity type.
    #[must_use]
    pub const fn create_command(&self) -> &'static str {
        match self {
            Self::AdobeId => "addAdobeID",
            Self::EnterpriseId => "createEnterpriseID",
            Self::FederatedId => "createFederatedID",
        }
    }
}

impl FromStr for IdentityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adobeID" => Ok(Self::AdobeId),
            "enterpriseID" => Ok(Self::EnterpriseId),
            "federatedID" => Ok(Self::FederatedId),
            other => Err(ValidationError::InvalidIdentityType(other.to_string())),
        }
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO-3166-1 alpha-2 country code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and normalize a country code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidCountryFormat` unless the input is
    /// exactly two ASCII letters.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        if COUNTRY_CODE.is_match(code) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(ValidationError::InvalidCountryFormat(code.to_string()))
        }
    }

    /// The normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an action addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A user, keyed by username (creates) or email (updates and deletes).
    User {
        /// Addressing key.
        key: String,
        /// Directory domain, when it cannot be inferred from the key.
        domain: Option<String>,
    },
    /// A user group, keyed by name.
    Group {
        /// Group name.
        name: String,
    },
}

impl Target {
    /// The kind of entity addressed.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::User { .. } => TargetKind::User,
            Self::Group { .. } => TargetKind::Group,
        }
    }

    /// The addressing key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::User { key, .. } => key,
            Self::Group { name } => name,
        }
    }
}

/// Entity kind of a [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A user account.
    User,
    /// A user group.
    Group,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Attributes of a user to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub identity_type: IdentityType,
    pub email: String,
    pub country: CountryCode,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// Attributes of a group to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
}

/// Payload of a create step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Create {
    User(NewUser),
    Group(NewGroup),
}

/// Sparse user update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub country: Option<CountryCode>,
}

impl UserUpdate {
    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.country.is_none()
    }
}

/// Sparse group update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Payload of an update step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    User(UserUpdate),
    Group(GroupUpdate),
}

/// Direction of a membership edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Add,
    Remove,
}

/// What a membership edit adds or removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// Groups a user belongs to.
    Groups,
    /// Users belonging to a group.
    Users,
    /// Product profiles associated with a group.
    ProductProfiles,
}

impl Member {
    const fn wire_key(self) -> &'static str {
        match self {
            Self::Groups => "group",
            Self::Users => "user",
            Self::ProductProfiles => "productConfiguration",
        }
    }
}

/// Add or remove a list of memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEdit {
    pub change: Change,
    pub member: Member,
    pub names: Vec<String>,
}

/// One sub-operation of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Create(Create),
    Update(Update),
    /// For users, `hard` also deletes the account from the identity directory.
    Delete { hard: bool },
    Membership(MembershipEdit),
}

impl Step {
    /// Operation kind of this step.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Update(_) => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
            Self::Membership(_) => Operation::GroupMembershipEdit,
        }
    }

    fn to_command(&self, target: TargetKind) -> Value {
        match self {
            Self::Create(Create::User(user)) => {
                let mut attrs = Map::new();
                attrs.insert("email".into(), json!(user.email));
                attrs.insert("country".into(), json!(user.country.as_str()));
                insert_opt(&mut attrs, "firstname", user.firstname.as_deref());
                insert_opt(&mut attrs, "lastname", user.lastname.as_deref());
                attrs.insert("option".into(), json!("ignoreIfAlreadyExists"));
                json!({ user.identity_type.create_command(): attrs })
            },
            Self::Create(Create::Group(group)) => {
                let mut attrs = Map::new();
                attrs.insert("name".into(), json!(group.name));
                insert_opt(&mut attrs, "description", group.description.as_deref());
                attrs.insert("option".into(), json!("ignoreIfAlreadyExists"));
                json!({ "createUserGroup": attrs })
            },
            Self::Update(Update::User(update)) => {
                let mut attrs = Map::new();
                insert_opt(&mut attrs, "email", update.email.as_deref());
                insert_opt(&mut attrs, "username", update.username.as_deref());
                insert_opt(&mut attrs, "firstname", update.firstname.as_deref());
                insert_opt(&mut attrs, "lastname", update.lastname.as_deref());
                insert_opt(&mut attrs, "country", update.country.as_ref().map(CountryCode::as_str));
                json!({ "update": attrs })
            },
            Self::Update(Update::Group(update)) => {
                let mut attrs = Map::new();
                insert_opt(&mut attrs, "name", update.name.as_deref());
                insert_opt(&mut attrs, "description", update.description.as_deref());
                json!({ "updateUserGroup": attrs })
            },
            Self::Delete { hard } => match target {
                TargetKind::User => json!({ "removeFromOrg": { "deleteAccount": hard } }),
                TargetKind::Group => json!({ "deleteUserGroup": {} }),
            },
            Self::Membership(edit) => {
                let verb = match edit.change {
                    Change::Add => "add",
                    Change::Remove => "remove",
                };
                json!({ verb: { edit.member.wire_key(): edit.names } })
            },
        }
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        map.insert(key.to_string(), json!(v));
    }
}

/// Coarse operation kind of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    GroupMembershipEdit,
}

impl Operation {
    /// Get the display name for this operation.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::GroupMembershipEdit => "Membership",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One error reported for an executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionError {
    /// Error code, e.g. `error.user.not_found`.
    pub kind: String,
    /// Human-readable reason.
    pub message: String,
    /// Index of the failing step, when the API names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

impl ExecutionError {
    /// Create an error without a step index.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            step: None,
        }
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Handle identifying an action to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u64);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "action_{}", self.0)
    }
}

/// An intended mutation of one user or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    target: Target,
    steps: Vec<Step>,
    execution_errors: Vec<ExecutionError>,
}

impl Action {
    /// Create an action from a target and its leading step.
    #[must_use]
    pub fn new(target: Target, step: Step) -> Self {
        Self {
            target,
            steps: vec![step],
            execution_errors: Vec::new(),
        }
    }

    /// Append another step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.target.key()
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Operation kind of the leading step.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.steps
            .first()
            .map_or(Operation::Update, Step::operation)
    }

    /// Identity type, known only for user creates.
    #[must_use]
    pub fn identity_type(&self) -> Option<IdentityType> {
        self.steps.iter().find_map(|step| match step {
            Step::Create(Create::User(user)) => Some(user.identity_type),
            _ => None,
        })
    }

    /// Errors recorded during execution. Empty before execution and on success.
    #[must_use]
    pub fn execution_errors(&self) -> &[ExecutionError] {
        &self.execution_errors
    }

    pub(crate) fn record_errors(&mut self, errors: Vec<ExecutionError>) {
        self.execution_errors.extend(errors);
    }

    /// Wire command for this action, tagged with `request_id`.
    #[must_use]
    pub fn to_command(&self, request_id: &str) -> Value {
        let kind = self.target.kind();
        let mut command = Map::new();
        match &self.target {
            Target::User { key, domain } => {
                command.insert("user".into(), json!(key));
                insert_opt(&mut command, "domain", domain.as_deref());
            },
            Target::Group { name } => {
                command.insert("usergroup".into(), json!(name));
            },
        }
        command.insert("requestID".into(), json!(request_id));
        let steps: Vec<Value> = self.steps.iter().map(|s| s.to_command(kind)).collect();
        command.insert("do".into(), Value::Array(steps));
        Value::Object(command)
    }
}
