// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! User payload assembly
//!
//! A payload is a list of markdown sections joined by horizontal rules.
//! It always opens with the topic directive.

use tracing::{debug, warn};

use crate::errors::QuillResult;
use crate::pipeline::{ArtifactRef, StageDefinition};
use crate::store::ArtifactStore;

/// Separator between payload sections
pub const SECTION_RULE: &str = "\n\n---\n\n";

/// Stand-in for an input that has not been produced
pub const NOT_PRODUCED: &str = "(not yet produced)";

/// Builder for a sectioned payload
#[derive(Debug, Clone)]
pub struct Payload {
    sections: Vec<String>,
}

impl Payload {
    /// Start a payload with the topic as the authoritative directive
    pub fn new(topic: &str) -> Self {
        Self {
            sections: vec![format!(
                "# Commissioned topic\n\n\"{}\"\n\nThis topic is authoritative. Everything below serves it.",
                topic
            )],
        }
    }

    /// Start a payload without the directive
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Add an upstream artifact, or the placeholder when it is absent
    pub fn reference(mut self, artifact: &ArtifactRef, content: Option<&str>) -> Self {
        self.sections.push(format!(
            "## Reference: {}\n\n{}",
            artifact,
            content.unwrap_or(NOT_PRODUCED)
        ));
        self
    }

    /// Add the shared context; skipped when empty
    pub fn shared_context(mut self, context: &str) -> Self {
        if !context.trim().is_empty() {
            self.sections.push(format!("## Shared context\n\n{}", context));
        }
        self
    }

    pub fn section(mut self, text: impl Into<String>) -> Self {
        self.sections.push(text.into());
        self
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn build(self) -> String {
        self.sections.join(SECTION_RULE)
    }
}

/// Payload for a registry stage
///
/// Inputs are read from `store` in declared order. An input that is absent
/// or unreadable is replaced by the placeholder. `shared_context` is given
/// only to early stages.
pub fn for_stage(
    topic: &str,
    stage: &StageDefinition,
    store: &ArtifactStore,
    shared_context: Option<&str>,
) -> QuillResult<String> {
    let mut payload = Payload::new(topic);

    for artifact in &stage.requires {
        let content = match store.read(artifact) {
            Ok(Some(content)) => Some(content),
            Ok(None) => {
                debug!("{}: input {} not produced, using placeholder", stage.id, artifact);
                None
            }
            Err(e) => {
                warn!("{}: cannot read input {}, using placeholder: {}", stage.id, artifact, e);
                None
            }
        };
        payload = payload.reference(artifact, content.as_deref());
    }

    if let Some(context) = shared_context {
        payload = payload.shared_context(context);
    }

    Ok(payload.build())
}

/// Payload for the final review
pub fn for_review(topic: &str, article: &str, policy: Option<&str>) -> String {
    Payload::empty()
        .section(format!("# Gatekeeper-approved article\n\n{}", article))
        .section(format!(
            "# Policy document (strategy guide)\n\n{}",
            policy.unwrap_or_default()
        ))
        .section(format!(
            "Commissioned topic: \"{}\"\n\n\
             This article has passed the gatekeeper's inspection. Give it a final review. \
             If nothing needs changing, output it unchanged as the final article. \
             Otherwise output the corrected article.",
            topic
        ))
        .build()
}
