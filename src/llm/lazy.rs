// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Deferred connection
//!
//! The backend is established on the first call, never at construction.
//! A failed establishment is remembered; later calls fail the same way
//! without trying again.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::{GenerationRequest, GenerativeClient};
use crate::errors::QuillError;

type Factory = Box<dyn Fn() -> Result<Arc<dyn GenerativeClient>, QuillError> + Send + Sync>;

/// Connection lifecycle
#[derive(Clone)]
pub enum ConnectionState {
    Uninitialized,
    Ready(Arc<dyn GenerativeClient>),
    Failed(String),
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Ready(_) => "ready",
            ConnectionState::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Failed(reason) => write!(f, "Failed({})", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Client wrapper that connects on first use
pub struct LazyClient {
    factory: Factory,
    state: Mutex<ConnectionState>,
    model: Option<String>,
}

impl LazyClient {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn GenerativeClient>, QuillError> + Send + Sync + 'static,
    {
        debug!("Creating LazyClient - connection deferred until first call");
        Self {
            factory: Box::new(factory),
            state: Mutex::new(ConnectionState::Uninitialized),
            model: None,
        }
    }

    /// Model name to report before the connection exists
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_ready(&self) -> Result<Arc<dyn GenerativeClient>, QuillError> {
        let mut state = self.lock();

        match &*state {
            ConnectionState::Ready(client) => return Ok(client.clone()),
            ConnectionState::Failed(reason) => {
                return Err(QuillError::service_unavailable(reason.clone()))
            }
            ConnectionState::Uninitialized => {}
        }

        debug!("Lazy initialization triggered - connecting now");
        match (self.factory)() {
            Ok(client) => {
                debug!("Connected to {}", client.name());
                *state = ConnectionState::Ready(client.clone());
                Ok(client)
            }
            Err(e) => {
                let reason = match e {
                    QuillError::ServiceUnavailable { reason } => reason,
                    other => other.to_string(),
                };
                warn!("Generative service unavailable: {}", reason);
                *state = ConnectionState::Failed(reason.clone());
                Err(QuillError::service_unavailable(reason))
            }
        }
    }
}

#[async_trait]
impl GenerativeClient for LazyClient {
    async fn invoke(&self, request: &GenerationRequest) -> Result<String, QuillError> {
        let client = self.ensure_ready()?;
        client.invoke(request).await
    }

    fn name(&self) -> &str {
        "lazy"
    }

    fn model(&self) -> Option<String> {
        self.model.clone()
    }
}
