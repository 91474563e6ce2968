//! Connection settings for umapi-cli.
//!
//! Settings come from an optional YAML file, with `UMAPI_*` environment
//! variables taking precedence over it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::UmapiError;

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// OAuth client ID, also sent as the API key.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Organization the actions apply to.
    pub org_id: String,
    /// Identity service host.
    pub auth_host: String,
    /// Token endpoint path on the identity service.
    pub auth_endpoint: String,
    /// Base URL of the User Management API.
    pub url: String,
    /// Maximum actions per request.
    pub batch_size: usize,
    /// Retries for throttled or unavailable responses.
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Settings file contents. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub org_id: Option<String>,
    pub auth_host: Option<String>,
    pub auth_endpoint: Option<String>,
    pub url: Option<String>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub timeout_secs: Option<u64>,
}

const DEFAULT_AUTH_HOST: &str = "ims-na1.adobelogin.com";
const DEFAULT_AUTH_ENDPOINT: &str = "/ims/token/v2";
const DEFAULT_URL: &str = "https://usermanagement.adobe.io/v2/usermanagement";
const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_MAX_RETRIES: u32 = 4;
const MAX_RETRIES_LIMIT: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

impl SettingsFile {
    /// Load a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, UmapiError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            UmapiError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            UmapiError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}

impl Settings {
    /// Resolve settings from an optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a required setting is
    /// missing from both sources.
    pub fn load(path: Option<&Path>) -> Result<Self, UmapiError> {
        let file = match path {
            Some(path) => SettingsFile::load_from_path(path)?,
            None => SettingsFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolve settings from file contents and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing.
    pub fn resolve(
        file: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, UmapiError> {
        let pick = |key: &str, from_file: Option<String>| {
            env(key).filter(|v| !v.is_empty()).or(from_file)
        };
        let require = |key: &str, from_file: Option<String>| {
            pick(key, from_file)
                .ok_or_else(|| UmapiError::Config(format!("Setting '{key}' is required")))
        };

        let batch_size = file.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(UmapiError::Config("batch_size must be at least 1".to_string()));
        }
        let max_retries = file.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(UmapiError::Config(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}"
            )));
        }

        Ok(Self {
            client_id: require("UMAPI_CLIENT_ID", file.client_id)?,
            client_secret: require("UMAPI_CLIENT_SECRET", file.client_secret)?,
            org_id: require("UMAPI_ORG_ID", file.org_id)?,
            auth_host: pick("UMAPI_AUTH_HOST", file.auth_host)
                .unwrap_or_else(|| DEFAULT_AUTH_HOST.to_string()),
            auth_endpoint: pick("UMAPI_AUTH_ENDPOINT", file.auth_endpoint)
                .unwrap_or_else(|| DEFAULT_AUTH_ENDPOINT.to_string()),
            url: pick("UMAPI_URL", file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
            batch_size,
            max_retries,
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Full URL of the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("https://{}{}", self.auth_host, self.auth_endpoint)
    }
}
