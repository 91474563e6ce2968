//! OAuth server-to-server token handling.

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::error::UmapiError;

const SCOPE: &str = "openid,AdobeID,user_management_sdk";

/// Tokens are renewed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// A bearer token and the moment it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build a token that expires `expires_in` seconds after `issued_at`.
    #[must_use]
    pub fn new(value: String, issued_at: DateTime<Utc>, expires_in: i64) -> Self {
        Self {
            value,
            expires_at: issued_at + Duration::seconds(expires_in),
        }
    }

    /// Whether the token should be renewed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Exchange the client credentials for an access token.
///
/// # Errors
///
/// Returns `UmapiError::Auth` if the identity service rejects the
/// credentials, or `UmapiError::Http` if it cannot be reached.
pub fn fetch_token(client: &Client, settings: &Settings) -> Result<AccessToken, UmapiError> {
    let url = settings.token_url();
    debug!(%url, "requesting access token");

    let response = client
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
            ("scope", SCOPE),
        ])
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(UmapiError::Auth(format!("{status}: {body}")));
    }

    let token: TokenResponse = response.json()?;
    Ok(AccessToken::new(token.access_token, Utc::now(), token.expires_in))
}
