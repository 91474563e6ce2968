//! HTTP transport for the User Management API.
//!
//! The [`Transport`] trait is the only place the connection touches the
//! network, so batching can be exercised without it.

use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::auth::{fetch_token, AccessToken};
use super::types::JsonPage;
use crate::config::Settings;
use crate::error::UmapiError;

const FIRST_RETRY_DELAY_SECS: u64 = 4;
/// Upper bound for any single wait, including server-sent `Retry-After`.
const MAX_RETRY_DELAY_SECS: u64 = 300;
const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Authenticated JSON request/response channel.
pub trait Transport {
    /// POST `body` to `path` (relative to the API base URL).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    fn post_json(&mut self, path: &str, query: &[(&str, &str)], body: &Value)
        -> Result<Value, UmapiError>;

    /// GET `path` (relative to the API base URL).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    fn get_json(&mut self, path: &str) -> Result<JsonPage, UmapiError>;
}

/// Blocking reqwest transport with token caching and retry.
pub struct HttpTransport {
    client: Client,
    settings: Settings,
    token: Option<AccessToken>,
}

impl HttpTransport {
    /// Build a transport from resolved settings. No request is made yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: Settings) -> Result<Self, UmapiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("umapi-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            settings,
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.url.trim_end_matches('/'), path)
    }

    fn bearer(&mut self) -> Result<String, UmapiError> {
        match &self.token {
            Some(token) if !token.is_expired(Utc::now()) => Ok(token.value.clone()),
            _ => {
                let token = fetch_token(&self.client, &self.settings)?;
                let value = token.value.clone();
                self.token = Some(token);
                Ok(value)
            },
        }
    }

    /// Send a request, renewing the token once on 401 and backing off on
    /// throttling or gateway errors.
    fn send(&mut self, build: impl Fn(&Client) -> RequestBuilder) -> Result<Response, UmapiError> {
        let mut attempt: u32 = 0;
        let mut renewed = false;

        loop {
            let token = self.bearer()?;
            let response = build(&self.client)
                .bearer_auth(token)
                .header("X-Api-Key", &self.settings.client_id)
                .header("Accept", "application/json")
                .send()?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED && !renewed {
                debug!("access token rejected; renewing");
                self.token = None;
                renewed = true;
                continue;
            }

            let retry_after = retry_after_secs(&response);
            let error = UmapiError::Api {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            };

            if error.is_retryable() && attempt < self.settings.max_retries {
                let delay = retry_after
                    .unwrap_or_else(|| backoff_secs(attempt))
                    .min(MAX_RETRY_DELAY_SECS);
                warn!(%status, attempt = attempt + 1, delay, "request throttled; retrying");
                std::thread::sleep(Duration::from_secs(delay));
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, UmapiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.send(|client| client.post(&url).query(query).json(body))?;
        Ok(response.json()?)
    }

    fn get_json(&mut self, path: &str) -> Result<JsonPage, UmapiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.send(|client| client.get(&url))?;
        let total_count = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        Ok(JsonPage {
            body: response.json()?,
            total_count,
        })
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Exponential backoff: 4, 8, 16, ... seconds, capped at `MAX_RETRY_DELAY_SECS`.
fn backoff_secs(attempt: u32) -> u64 {
    1u64.checked_shl(attempt)
        .map_or(u64::MAX, |factor| factor.saturating_mul(FIRST_RETRY_DELAY_SECS))
        .min(MAX_RETRY_DELAY_SECS)
}
