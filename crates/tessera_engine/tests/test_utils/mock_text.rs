//! Mock text backend for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tessera_core::{TextCompletion, TokenUsage};
use tessera_error::{TesseraResult, UpstreamError, UpstreamErrorKind};
use tessera_interface::TextBackend;

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Error(UpstreamErrorKind),
}

/// Text backend replaying a fixed sequence of responses.
///
/// Once the sequence is exhausted the last response repeats.
#[derive(Debug, Clone)]
pub struct MockTextBackend {
    responses: Vec<MockResponse>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTextBackend {
    /// Backend answering every call with `text`.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_sequence(vec![MockResponse::Text(text.into())])
    }

    /// Backend replaying `responses` in order.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self {
            responses,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// User messages received, in order.
    pub fn user_messages(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for MockTextBackend {
    async fn call(&self, _system_prompt: &str, user_message: &str) -> TesseraResult<TextCompletion> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(user_message.to_string());
            calls.len() - 1
        };
        let response = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .expect("mock needs at least one response");

        match response {
            MockResponse::Text(text) => Ok(TextCompletion::new(text, TokenUsage::new(10, 20))),
            MockResponse::Error(kind) => Err(UpstreamError::new("mock", kind).into()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}
