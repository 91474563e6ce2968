use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ExecutionError;

/// Response body of an action request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionResponse {
    /// `success`, `partial` or `error`.
    pub result: Option<String>,
    pub completed: usize,
    pub not_completed: usize,
    pub completed_in_test_mode: usize,
    pub errors: Vec<ApiError>,
}

/// One error entry of an action response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiError {
    /// Position of the failing command in the request.
    pub index: Option<usize>,
    /// Position of the failing step within the command.
    pub step: Option<usize>,
    #[serde(rename = "requestID")]
    pub request_id: Option<String>,
    pub error_code: Option<String>,
    pub message: Option<String>,
}

impl From<ApiError> for ExecutionError {
    fn from(error: ApiError) -> Self {
        Self {
            kind: error.error_code.unwrap_or_else(|| "error.unknown".to_string()),
            message: error.message.unwrap_or_default(),
            step: error.step,
        }
    }
}

/// A user account as returned by the read endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "type")]
    pub identity_type: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub country: Option<String>,
    pub username: Option<String>,
    pub domain: Option<String>,
    pub status: Option<String>,
    pub groups: Vec<String>,
}

/// A user group or product profile as returned by the read endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub group_id: Option<u64>,
    pub group_name: String,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub admin_group_name: Option<String>,
    pub member_count: Option<u64>,
    pub product_name: Option<String>,
    /// A number, or `UNLIMITED`.
    pub license_quota: Option<Value>,
}

/// A GET response body with the total-count header, when present.
#[derive(Debug, Clone)]
pub struct JsonPage {
    pub body: Value,
    pub total_count: Option<usize>,
}
