// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Error types
//!
//! Every stage-level failure is one of the variants below. The executor
//! catches them at the stage boundary and turns them into an abort decision
//! (or a degraded success for a fallback-eligible stage).

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for quillflow operations
pub type QuillResult<T> = Result<T, QuillError>;

/// Main error type for quillflow
#[derive(Error, Debug, Diagnostic)]
pub enum QuillError {
    // ─────────────────────────────────────────────────────────────────────────
    // Stage Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Instruction document for stage '{stage}' not found: {path}")]
    #[diagnostic(
        code(quillflow::instruction_missing),
        help("Create the instruction document at the path above")
    )]
    InstructionMissing { stage: String, path: PathBuf },

    #[error("Generative service unavailable: {reason}")]
    #[diagnostic(
        code(quillflow::service_unavailable),
        help("Check that the API key environment variable is set and the endpoint is reachable")
    )]
    ServiceUnavailable { reason: String },

    #[error("Generative call failed: {message}")]
    #[diagnostic(code(quillflow::call_failed))]
    CallFailed {
        message: String,
        status: Option<u16>,
    },

    #[error("Nothing to review: terminal artifact not found at {path}")]
    #[diagnostic(
        code(quillflow::deliverable_missing),
        help("The gatekeeping stage must complete before the final review")
    )]
    DeliverableMissing { path: PathBuf },

    // ─────────────────────────────────────────────────────────────────────────
    // Registry Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid stage registry: {reason}")]
    #[diagnostic(code(quillflow::invalid_registry))]
    InvalidRegistry { reason: String },

    #[error("Stage '{stage}' requires artifact '{artifact}' which no earlier stage produces")]
    #[diagnostic(
        code(quillflow::unknown_artifact),
        help("Declare a producing stage for '{artifact}' before '{stage}'")
    )]
    UnknownArtifact { stage: String, artifact: String },

    #[error("Circular artifact dependency detected")]
    #[diagnostic(
        code(quillflow::circular_dependency),
        help("Review the stage requirements to remove the cycle")
    )]
    CircularDependency { stages: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Input / Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Topic must be a non-empty string")]
    #[diagnostic(code(quillflow::invalid_topic))]
    InvalidTopic,

    #[error("Configuration error: {reason}")]
    #[diagnostic(code(quillflow::config))]
    Config {
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(quillflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(quillflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(quillflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(quillflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(quillflow::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for QuillError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for QuillError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl QuillError {
    /// Create a call failure without an HTTP status
    pub fn call_failed(message: impl Into<String>) -> Self {
        Self::CallFailed {
            message: message.into(),
            status: None,
        }
    }

    /// Create a service-unavailable error
    pub fn service_unavailable(reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            reason: reason.into(),
        }
    }

    /// Short machine-friendly name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InstructionMissing { .. } => "InstructionMissing",
            Self::ServiceUnavailable { .. } => "ServiceUnavailable",
            Self::CallFailed { .. } => "CallFailed",
            Self::DeliverableMissing { .. } => "DeliverableMissing",
            Self::InvalidRegistry { .. }
            | Self::UnknownArtifact { .. }
            | Self::CircularDependency { .. } => "InvalidRegistry",
            Self::InvalidTopic | Self::Config { .. } => "Config",
            Self::FileReadError { .. }
            | Self::FileWriteError { .. }
            | Self::Io { .. }
            | Self::Yaml { .. }
            | Self::Json { .. } => "Io",
        }
    }

    /// Recovery suggestion matching this failure, if one exists
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::InstructionMissing { path, .. } => {
                Some(RecoverySuggestion::create_instruction(path))
            }
            Self::ServiceUnavailable { .. } => Some(RecoverySuggestion::configure_service()),
            Self::CallFailed { status, .. } => Some(RecoverySuggestion::retry_call(*status)),
            Self::DeliverableMissing { path } => {
                Some(RecoverySuggestion::missing_deliverable(path))
            }
            Self::CircularDependency { stages } => {
                Some(RecoverySuggestion::fix_circular_dependency(stages))
            }
            Self::InvalidRegistry { .. } | Self::UnknownArtifact { .. } => {
                Some(RecoverySuggestion::fix_registry(&self.to_string()))
            }
            _ => None,
        }
    }
}
