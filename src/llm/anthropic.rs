// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::{GenerationRequest, GenerativeClient};
use crate::config::ServiceSettings;
use crate::errors::QuillError;

/// HTTP client for the Messages endpoint
pub struct AnthropicClient {
    endpoint: String,
    model: String,
    api_key: String,
    api_version: String,
    http_client: Client,
    timeout: Duration,
}

impl AnthropicClient {
    /// Establish credentials and transport
    ///
    /// Fails with `ServiceUnavailable` when the API key variable is unset or
    /// the HTTP client cannot be built.
    pub fn connect(settings: &ServiceSettings, model: &str) -> Result<Self, QuillError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                QuillError::service_unavailable(format!(
                    "environment variable {} is not set",
                    settings.api_key_env
                ))
            })?;

        let timeout = Duration::from_secs(settings.timeout_secs);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuillError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: settings.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            api_version: settings.api_version.clone(),
            http_client,
            timeout,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Concatenate text blocks in order, ignoring every other block kind
fn join_text(blocks: Vec<ContentBlock>) -> String {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect()
}

#[async_trait]
impl GenerativeClient for AnthropicClient {
    async fn invoke(&self, request: &GenerationRequest) -> Result<String, QuillError> {
        let url = format!("{}/v1/messages", self.endpoint);

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.payload,
            }],
        };

        debug!(
            "Sending request: model={}, payload_length={}, temperature={}",
            self.model,
            request.payload.len(),
            request.temperature
        );

        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Request timed out after {:?}", self.timeout);
                    QuillError::call_failed(format!(
                        "request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    error!("Cannot connect to {}", self.endpoint);
                    QuillError::call_failed(format!("connection failed: {}", e))
                } else {
                    error!("Request error: {}", e);
                    QuillError::call_failed(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("Service returned error status {}: {}", status, body);

            return Err(QuillError::CallFailed {
                message: format!("HTTP {}: {}", status, body),
                status: Some(status.as_u16()),
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            error!("Failed to parse service response: {}", e);
            QuillError::call_failed(format!("malformed response: {}", e))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Usage: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        info!("Generation completed in {:.2}s", start.elapsed().as_secs_f64());

        Ok(join_text(parsed.content))
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> Option<String> {
        Some(self.model.clone())
    }
}
