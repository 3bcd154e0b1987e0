// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Generative call client
//!
//! A single contract: system instruction and user payload in, generated
//! text out. Retry policy, if any, belongs to the caller.

mod anthropic;
mod lazy;
mod mock;

pub use anthropic::AnthropicClient;
pub use lazy::{ConnectionState, LazyClient};
pub use mock::{MockClient, MockFailure};

use async_trait::async_trait;

use crate::errors::QuillError;

/// One generative call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Instruction document content, sent in the system role
    pub system: String,
    /// Assembled user payload
    pub payload: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            payload: payload.into(),
            max_tokens: 8192,
            temperature: 0.7,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for generative-text backends
///
/// Implementations fail with [`QuillError::ServiceUnavailable`] when the
/// transport or credentials cannot be established and with
/// [`QuillError::CallFailed`] for any error during the call itself.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Run one generation and return the concatenated text
    async fn invoke(&self, request: &GenerationRequest) -> Result<String, QuillError>;

    fn name(&self) -> &str;

    fn model(&self) -> Option<String> {
        None
    }
}
