//! Already-parsed inputs for the queuing helpers.
//!
//! These carry raw strings where the helper still has to validate (identity
//! type, country code), so that every construction-time failure is raised in
//! one place.

/// Input for [`super::ActionQueue::queue_user_create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCreateRequest {
    /// One of `adobeID`, `enterpriseID`, `federatedID`.
    pub identity_type: String,
    pub email: String,
    /// Two-letter country code.
    pub country: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// Defaults to `email` when absent or empty.
    pub username: Option<String>,
    pub domain: Option<String>,
    /// Groups to join at creation, in order.
    pub groups: Vec<String>,
}

/// Input for [`super::ActionQueue::queue_user_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdateRequest {
    pub email_new: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub add_groups: Vec<String>,
    pub remove_groups: Vec<String>,
}

/// Input for [`super::ActionQueue::queue_group_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdateRequest {
    pub name_new: Option<String>,
    pub description: Option<String>,
    pub add_users: Vec<String>,
    pub remove_users: Vec<String>,
    pub add_profiles: Vec<String>,
    pub remove_profiles: Vec<String>,
}
