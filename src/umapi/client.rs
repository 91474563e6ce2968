use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::connection::{ActionFailure, Connection, ExecutionOutcome};
use super::transport::{HttpTransport, Transport};
use super::types::{ActionResponse, Group, User};
use crate::actions::{Action, ActionId, ExecutionError};
use crate::config::Settings;
use crate::error::UmapiError;

/// Kind recorded on every action of a batch that never got an answer.
pub const REQUEST_FAILED: &str = "request.failed";

/// Connection to the User Management API.
///
/// Actions are buffered and sent `batch_size` at a time.
pub struct UmapiConnection<T: Transport = HttpTransport> {
    transport: T,
    org_id: String,
    test_mode: bool,
    batch_size: usize,
    buffer: Vec<(ActionId, Value)>,
}

impl UmapiConnection<HttpTransport> {
    /// Connect with resolved settings. Authentication happens on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(settings: Settings, test_mode: bool) -> Result<Self, UmapiError> {
        let org_id = settings.org_id.clone();
        let batch_size = settings.batch_size;
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(transport, org_id, test_mode, batch_size))
    }
}

impl<T: Transport> UmapiConnection<T> {
    /// Create a connection over an existing transport.
    pub fn with_transport(
        transport: T,
        org_id: impl Into<String>,
        test_mode: bool,
        batch_size: usize,
    ) -> Self {
        Self {
            transport,
            org_id: org_id.into(),
            test_mode,
            batch_size: batch_size.max(1),
            buffer: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch one user by email. `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn user(&mut self, email: &str) -> Result<Option<User>, UmapiError> {
        let path = format!("organizations/{}/users/{email}", self.org_id);
        match self.transport.get_json(&path) {
            Ok(page) => match page.body.get("user") {
                Some(user) => Ok(Some(serde_json::from_value(user.clone())?)),
                None => Ok(None),
            },
            Err(UmapiError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch every user of the organization, page by page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched or parsed.
    pub fn users(&mut self) -> Result<Vec<User>, UmapiError> {
        let org_id = self.org_id.clone();
        self.paged(|page| format!("users/{org_id}/{page}"), "users")
    }

    /// Fetch every group and product profile of the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched or parsed.
    pub fn groups(&mut self) -> Result<Vec<Group>, UmapiError> {
        let org_id = self.org_id.clone();
        self.paged(|page| format!("groups/{org_id}/{page}"), "groups")
    }

    /// Find a group by name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the group list cannot be fetched.
    pub fn group(&mut self, name: &str) -> Result<Option<Group>, UmapiError> {
        let wanted = normalize(name);
        Ok(self
            .groups()?
            .into_iter()
            .find(|g| normalize(&g.group_name) == wanted))
    }

    fn paged<R: serde::de::DeserializeOwned>(
        &mut self,
        path: impl Fn(usize) -> String,
        key: &str,
    ) -> Result<Vec<R>, UmapiError> {
        let mut records = Vec::new();
        let mut page = 0;
        loop {
            let response = self.transport.get_json(&path(page))?;
            if page == 0 {
                if let Some(total) = response.total_count {
                    info!(total, "Total records: {total}");
                }
            }

            if let Some(items) = response.body.get(key) {
                let batch: Vec<R> = serde_json::from_value(items.clone())?;
                records.extend(batch);
            }

            let last_page = response
                .body
                .get("lastPage")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            if last_page {
                return Ok(records);
            }
            page += 1;
        }
    }

    fn flush(&mut self) -> ExecutionOutcome {
        if self.buffer.is_empty() {
            return ExecutionOutcome::empty();
        }
        let batch = std::mem::take(&mut self.buffer);
        self.send(batch)
    }

    fn send(&mut self, batch: Vec<(ActionId, Value)>) -> ExecutionOutcome {
        let (ids, commands): (Vec<ActionId>, Vec<Value>) = batch.into_iter().unzip();
        let path = format!("action/{}", self.org_id);
        let query: &[(&str, &str)] = if self.test_mode {
            &[("testOnly", "true")]
        } else {
            &[]
        };
        debug!(actions = ids.len(), test_mode = self.test_mode, "sending batch");

        let response = self
            .transport
            .post_json(&path, query, &Value::Array(commands))
            .and_then(|body| Ok(serde_json::from_value::<ActionResponse>(body)?));

        match response {
            Ok(response) => outcome_from_response(&ids, response),
            Err(e) => {
                warn!(error = %e, actions = ids.len(), "batch request failed");
                let message = e.to_string();
                ExecutionOutcome {
                    submitted: ids.len(),
                    succeeded: 0,
                    failed: ids.len(),
                    failures: ids
                        .into_iter()
                        .map(|id| ActionFailure {
                            id,
                            errors: vec![ExecutionError::new(REQUEST_FAILED, message.clone())],
                        })
                        .collect(),
                }
            },
        }
    }
}

impl<T: Transport> Connection for UmapiConnection<T> {
    fn execute_single(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
        self.buffer.push((id, action.to_command(&id.to_string())));
        if self.buffer.len() >= self.batch_size {
            self.flush()
        } else {
            ExecutionOutcome::empty()
        }
    }

    fn execute_queued(&mut self) -> ExecutionOutcome {
        self.flush()
    }

    fn execute_immediate(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
        let mut outcome = self.flush();
        outcome.merge(self.send(vec![(id, action.to_command(&id.to_string()))]));
        outcome
    }
}

/// Attribute response errors to the actions of the batch by index.
///
/// Errors without a usable index fail the whole batch.
fn outcome_from_response(ids: &[ActionId], response: ActionResponse) -> ExecutionOutcome {
    let mut by_index: BTreeMap<usize, Vec<ExecutionError>> = BTreeMap::new();
    let mut unattributed = Vec::new();

    for error in response.errors {
        match error.index {
            Some(index) if index < ids.len() => {
                by_index.entry(index).or_default().push(error.into());
            },
            _ => unattributed.push(ExecutionError::from(error)),
        }
    }

    if !unattributed.is_empty() {
        for index in 0..ids.len() {
            by_index
                .entry(index)
                .or_default()
                .extend(unattributed.iter().cloned());
        }
    }

    let failed = by_index.len();
    ExecutionOutcome {
        submitted: ids.len(),
        succeeded: ids.len() - failed,
        failed,
        failures: by_index
            .into_iter()
            .map(|(index, errors)| ActionFailure {
                id: ids[index],
                errors,
            })
            .collect(),
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
