// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Scripted client for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{GenerationRequest, GenerativeClient};
use crate::errors::QuillError;

/// Failure to inject into a scripted call
#[derive(Debug, Clone, PartialEq)]
pub enum MockFailure {
    Unavailable(String),
    Call(String),
}

impl MockFailure {
    fn into_error(self) -> QuillError {
        match self {
            MockFailure::Unavailable(reason) => QuillError::service_unavailable(reason),
            MockFailure::Call(message) => QuillError::call_failed(message),
        }
    }
}

/// Client that answers from a script
///
/// Failure rules match on the system instruction and take precedence.
/// Then queued responses are returned in order; once the queue is empty
/// every call answers with a canned text that numbers the call.
pub struct MockClient {
    responses: Mutex<VecDeque<Result<String, MockFailure>>>,
    failures: Vec<(String, MockFailure)>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            failures: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call whose system instruction contains `needle`
    pub fn failing_when(mut self, needle: impl Into<String>, failure: MockFailure) -> Self {
        self.failures.push((needle.into(), failure));
        self
    }

    pub fn add_response(&self, response: impl Into<String>) {
        lock(&self.responses).push_back(Ok(response.into()));
    }

    pub fn add_failure(&self, failure: MockFailure) {
        lock(&self.responses).push_back(Err(failure));
    }

    /// Every request received so far, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GenerativeClient for MockClient {
    async fn invoke(&self, request: &GenerationRequest) -> Result<String, QuillError> {
        let call_number = {
            let mut requests = lock(&self.requests);
            requests.push(request.clone());
            requests.len()
        };

        if let Some((_, failure)) = self
            .failures
            .iter()
            .find(|(needle, _)| request.system.contains(needle.as_str()))
        {
            return Err(failure.clone().into_error());
        }

        match lock(&self.responses).pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(format!("mock response #{}", call_number)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let client = MockClient::new();
        client.add_response("first");
        client.add_failure(MockFailure::Call("boom".into()));

        let request = GenerationRequest::new("sys", "payload");
        assert_eq!(client.invoke(&request).await.unwrap(), "first");
        assert!(matches!(
            client.invoke(&request).await,
            Err(QuillError::CallFailed { .. })
        ));
        assert_eq!(client.invoke(&request).await.unwrap(), "mock response #3");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_rule_matches_system() {
        let client =
            MockClient::new().failing_when("illustrate", MockFailure::Call("no images".into()));

        let ok = client.invoke(&GenerationRequest::new("write", "x")).await;
        let failed = client.invoke(&GenerationRequest::new("illustrate", "x")).await;

        assert!(ok.is_ok());
        assert!(matches!(failed, Err(QuillError::CallFailed { .. })));
        assert_eq!(client.requests()[1].system, "illustrate");
    }
}
