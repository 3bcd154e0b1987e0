// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! # quillflow - staged article pipeline
//!
//! `quillflow` turns a single topic into a finished article by running a
//! fixed sequence of generative stages. Each stage reads artifacts written
//! by earlier stages, calls a generative-text service with its own
//! instruction document, and writes a new artifact. A final review pass
//! re-checks the assembled article before delivery.
//!
//! ## Quick Start
//!
//! ```bash
//! # Walk the whole pipeline without calling the service
//! quillflow --dry-run "how to brew pour-over coffee"
//!
//! # Live run (needs ANTHROPIC_API_KEY)
//! quillflow "how to brew pour-over coffee"
//!
//! # Show the stage graph
//! quillflow --plan mermaid
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use errors::{QuillError, QuillResult};
pub use pipeline::{PipelineExecutor, RunReport, StageDefinition, StageRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
