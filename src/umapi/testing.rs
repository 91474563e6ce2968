//! Canned transport for unit tests.

use std::collections::VecDeque;

use serde_json::{json, Value};

use super::transport::Transport;
use super::types::JsonPage;
use crate::error::UmapiError;

/// Replays canned responses and records every request.
///
/// Unscripted POSTs succeed for every command in the body. Unscripted GETs
/// answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    pub posts: Vec<(String, Vec<(String, String)>, Value)>,
    pub gets: Vec<String>,
    pub post_responses: VecDeque<Result<Value, UmapiError>>,
    pub get_responses: VecDeque<Result<JsonPage, UmapiError>>,
}

impl ScriptedTransport {
    /// Every command sent so far, across all POSTs.
    pub fn commands(&self) -> Vec<&Value> {
        self.posts
            .iter()
            .filter_map(|(_, _, body)| body.as_array())
            .flatten()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, UmapiError> {
        self.posts.push((
            path.to_string(),
            query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body.clone(),
        ));
        let len = body.as_array().map_or(0, Vec::len);
        self.post_responses
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "result": "success", "completed": len })))
    }

    fn get_json(&mut self, path: &str) -> Result<JsonPage, UmapiError> {
        self.gets.push(path.to_string());
        self.get_responses.pop_front().unwrap_or_else(|| {
            Err(UmapiError::Api {
                status: 404,
                message: String::new(),
            })
        })
    }
}
