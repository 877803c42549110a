//! Shared test helpers for agent loop tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use personasmith_core::error::ProviderError;
use personasmith_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseToolCall};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue. Once the
/// queue is empty the repeated response is used, if any; otherwise it panics.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    repeat: Option<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok).collect())
    }

    pub fn from_results(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(results.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that returns the same response forever.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            repeat: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);

        match self.responses.lock().unwrap().pop_front() {
            Some(result) => result,
            None => match &self.repeat {
                Some(response) => Ok(response.clone()),
                None => panic!("ScriptedProvider: no more responses (call #{})", requests.len()),
            },
        }
    }
}

/// Helper to create a tool call without a provider-assigned ID.
pub fn call(name: &str, arguments: serde_json::Value) -> ResponseToolCall {
    ResponseToolCall {
        name: name.to_string(),
        arguments,
        id: None,
    }
}

pub fn call_with_id(name: &str, arguments: serde_json::Value, id: &str) -> ResponseToolCall {
    ResponseToolCall {
        name: name.to_string(),
        arguments,
        id: Some(id.to_string()),
    }
}
