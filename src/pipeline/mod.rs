// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Pipeline definitions and execution
//!
//! The stage registry, its dependency graph, and the executor that walks
//! it for one topic.

mod dag;
mod definition;
mod executor;
mod flavor;
pub mod payload;
mod registry;
mod review;
mod state;
mod validation;

pub use dag::DagBuilder;
pub use definition::*;
pub use executor::{ExecutionOptions, PipelineExecutor, RunReport, FALLBACK_ANNOTATION};
pub use registry::{builtin_stages, StageRegistry};
pub use review::{delivered_artifact, FinalReviewer, REVIEW_INSTRUCTION};
pub use state::{RunMode, RunState};
pub use validation::{RegistryValidator, ValidationResult};
