// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Stage registry
//!
//! The ordered, immutable list of stages a run walks through. Construction
//! validates the registry, so a `StageRegistry` value is always well formed.

use tracing::warn;

use crate::errors::{QuillError, QuillResult};
use crate::pipeline::{
    Area, ArtifactRef, DagBuilder, Fallback, Phase, RegistryValidator, StageDefinition,
};

/// Validated, ordered stage list
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<StageDefinition>,
}

impl StageRegistry {
    /// Validate `stages` (in declared order) and wrap them
    ///
    /// Every problem found is reported together in one `InvalidRegistry`.
    pub fn new(stages: Vec<StageDefinition>) -> QuillResult<Self> {
        let report = RegistryValidator::validate(&stages);
        for warning in &report.warnings {
            warn!("registry: {}", warning);
        }
        if !report.is_valid() {
            return Err(QuillError::InvalidRegistry {
                reason: report.errors.join("; "),
            });
        }

        Ok(Self { stages })
    }

    /// The built-in article pipeline
    pub fn builtin() -> QuillResult<Self> {
        Self::new(builtin_stages())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter()
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a stage by id
    pub fn get(&self, id: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Declared position (0-based) of a stage
    pub fn position(&self, id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == id)
    }

    /// Declared inputs of a stage
    pub fn inputs_of(&self, id: &str) -> Option<&[ArtifactRef]> {
        self.get(id).map(|s| s.requires.as_slice())
    }

    /// Declared output of a stage
    pub fn output_of(&self, id: &str) -> Option<&ArtifactRef> {
        self.get(id).map(|s| &s.produces)
    }

    /// Output of the last gatekeeping stage, handed to the final review
    pub fn terminal_artifact(&self) -> &ArtifactRef {
        // Validation guarantees a gatekeeping stage exists
        self.stages
            .iter()
            .rev()
            .find(|s| s.phase == Phase::Gatekeeping)
            .map(|s| &s.produces)
            .unwrap_or(&self.stages[self.stages.len() - 1].produces)
    }

    /// Dependency graph for rendering
    pub fn dag(&self) -> QuillResult<DagBuilder> {
        DagBuilder::build(&self.stages)
    }
}

fn strategy(name: &str) -> ArtifactRef {
    ArtifactRef::new(Area::Strategy, name)
}

fn blueprint(name: &str) -> ArtifactRef {
    ArtifactRef::new(Area::Blueprint, name)
}

fn library(name: &str) -> ArtifactRef {
    ArtifactRef::new(Area::Library, name)
}

fn writing(name: &str) -> ArtifactRef {
    ArtifactRef::new(Area::Writing, name)
}

/// Stage definitions of the built-in pipeline, in execution order
///
/// Sequence numbers are stable identifiers: the illustrator (13) runs
/// before the gatekeeper (12).
pub fn builtin_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new(1, "persona", "Strategist", Phase::Strategy, strategy("persona.md"))
            .with_role("designs the reader persona"),
        StageDefinition::new(2, "keywords", "Scout", Phase::Strategy, strategy("keywords.md"))
            .with_role("researches search keywords")
            .requiring(vec![strategy("persona.md")]),
        StageDefinition::new(3, "serp", "Lookout", Phase::Strategy, strategy("serp_analysis.md"))
            .with_role("analyses top-ranking competitor articles")
            .requiring(vec![strategy("keywords.md")]),
        StageDefinition::new(
            4,
            "structure",
            "Architect",
            Phase::Structure,
            blueprint("structure_draft.md"),
        )
        .with_role("drafts the article outline")
        .requiring(vec![
            strategy("persona.md"),
            strategy("keywords.md"),
            strategy("serp_analysis.md"),
        ]),
        StageDefinition::new(5, "audit", "Auditor", Phase::Structure, blueprint("structure_fixed.md"))
            .with_role("audits and fixes the outline")
            .requiring(vec![blueprint("structure_draft.md"), strategy("persona.md")]),
        StageDefinition::new(6, "research", "Scholar", Phase::Drafting, library("fact_sheet.md"))
            .with_role("collects primary sources")
            .requiring(vec![blueprint("structure_fixed.md")]),
        StageDefinition::new(7, "draft", "Scribe", Phase::Drafting, writing("draft_v1.md"))
            .with_role("writes the first draft")
            .requiring(vec![blueprint("structure_fixed.md"), library("fact_sheet.md")]),
        StageDefinition::new(8, "critique", "Critic", Phase::Drafting, writing("critique_report.md"))
            .with_role("reviews the draft without mercy")
            .requiring(vec![writing("draft_v1.md"), library("fact_sheet.md")]),
        StageDefinition::new(9, "rewrite", "Ghostwriter", Phase::Drafting, writing("draft_v2.md"))
            .with_role("rewrites the draft from the critique")
            .requiring(vec![writing("draft_v1.md"), writing("critique_report.md")]),
        StageDefinition::new(10, "count", "Accountant", Phase::Polishing, writing("count_report.md"))
            .with_role("counts characters per section")
            .requiring(vec![writing("draft_v2.md")]),
        StageDefinition::new(11, "link", "Archivist", Phase::Polishing, writing("draft_v3_linked.md"))
            .with_role("inserts source links")
            .requiring(vec![writing("draft_v2.md"), library("fact_sheet.md")]),
        StageDefinition::new(
            13,
            "visuals",
            "Illustrator",
            Phase::Polishing,
            writing("draft_v4_visuals.md"),
        )
        .with_role("places images and visual elements")
        .requiring(vec![writing("draft_v3_linked.md")])
        .with_fallback(Fallback::PassthroughWithAnnotation {
            source: writing("draft_v3_linked.md"),
        }),
        StageDefinition::new(
            12,
            "gatekeeper",
            "Gatekeeper",
            Phase::Gatekeeping,
            ArtifactRef::new(Area::Review, "final_draft.md"),
        )
        .with_role("inspects the article before delivery")
        .requiring(vec![writing("draft_v4_visuals.md")]),
    ]
}
