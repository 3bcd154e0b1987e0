// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Registry validation
//!
//! Structural checks run once at startup, before any stage executes.

use std::collections::HashSet;

use crate::errors::QuillError;
use crate::pipeline::{DagBuilder, Fallback, Phase, StageDefinition};

/// Stage registry validator
pub struct RegistryValidator;

impl RegistryValidator {
    /// Validate a list of stages in declared order
    pub fn validate(stages: &[StageDefinition]) -> ValidationResult {
        let mut result = ValidationResult::new();

        if stages.is_empty() {
            result.add_error("Registry has no stages defined");
            return result;
        }

        let mut seen_ids = HashSet::new();
        let mut seen_sequences = HashSet::new();
        for stage in stages {
            if !seen_ids.insert(&stage.id) {
                result.add_error(&format!("Duplicate stage id: '{}'", stage.id));
            }
            if !seen_sequences.insert(stage.sequence) {
                result.add_error(&format!(
                    "Duplicate sequence number {} (stage '{}')",
                    stage.sequence, stage.id
                ));
            }
        }

        // Dependency structure (unknown artifacts, cycles, declared order)
        match DagBuilder::build(stages) {
            Ok(_) => {}
            Err(QuillError::CircularDependency { stages }) => {
                result.add_error(&format!("Circular dependency: {}", stages.join(" → ")));
            }
            Err(QuillError::UnknownArtifact { stage, artifact }) => {
                result.add_error(&format!(
                    "Stage '{}' requires '{}' which no stage produces",
                    stage, artifact
                ));
            }
            Err(e) => {
                result.add_error(&format!("Dependency validation error: {}", e));
            }
        }

        Self::validate_phases(stages, &mut result);

        for (position, stage) in stages.iter().enumerate() {
            Self::validate_stage(stage, &stages[..position], &mut result);
        }

        let eligible = stages.iter().filter(|s| s.fallback.is_eligible()).count();
        if eligible > 1 {
            result.add_warning(&format!(
                "{} stages are fallback-eligible; usually only one stage degrades instead of aborting",
                eligible
            ));
        }

        result
    }

    /// Phases must be non-decreasing and stay inside the registry's range
    fn validate_phases(stages: &[StageDefinition], result: &mut ValidationResult) {
        let mut last = Phase::Opening;
        for stage in stages {
            if stage.phase < last {
                result.add_error(&format!(
                    "Stage '{}' is in phase {} after a {} stage; phases must not decrease",
                    stage.id, stage.phase, last
                ));
            }
            if stage.phase == Phase::Final {
                result.add_error(&format!(
                    "Stage '{}': the FINAL phase is reserved for the final review",
                    stage.id
                ));
            }
            last = last.max(stage.phase);
        }

        if !stages.iter().any(|s| s.phase == Phase::Gatekeeping) {
            result.add_error("Registry has no GATEKEEPING stage to hand over to the final review");
        }
    }

    /// Validate a single stage against the stages declared before it
    fn validate_stage(
        stage: &StageDefinition,
        earlier: &[StageDefinition],
        result: &mut ValidationResult,
    ) {
        if stage.id.trim().is_empty() {
            result.add_error(&format!("Stage #{} has an empty id", stage.sequence));
        }

        if stage.instruction.trim().is_empty() {
            result.add_error(&format!("Stage '{}': instruction name is empty", stage.id));
        }

        if let Fallback::PassthroughWithAnnotation { source } = &stage.fallback {
            if !earlier.iter().any(|s| &s.produces == source) {
                result.add_error(&format!(
                    "Stage '{}': fallback source '{}' is not produced by an earlier stage",
                    stage.id, source
                ));
            }
            if !stage.requires.contains(source) {
                result.add_warning(&format!(
                    "Stage '{}': fallback source '{}' is not one of its inputs",
                    stage.id, source
                ));
            }
        }

        let mut seen = HashSet::new();
        for required in &stage.requires {
            if !seen.insert(required) {
                result.add_warning(&format!(
                    "Stage '{}': '{}' is listed twice in its inputs",
                    stage.id, required
                ));
            }
        }
    }
}

/// Result of registry validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Area, ArtifactRef};

    fn stage(seq: u32, id: &str, phase: Phase, requires: &[&str]) -> StageDefinition {
        StageDefinition::new(
            seq,
            id,
            id,
            phase,
            ArtifactRef::new(Area::Writing, format!("{}.md", id)),
        )
        .requiring(
            requires
                .iter()
                .map(|r| ArtifactRef::new(Area::Writing, format!("{}.md", r)))
                .collect(),
        )
    }

    #[test]
    fn test_validate_empty_registry() {
        let result = RegistryValidator::validate(&[]);
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no stages"));
    }

    #[test]
    fn test_validate_minimal_registry() {
        let stages = vec![
            stage(1, "draft", Phase::Drafting, &[]),
            stage(2, "gate", Phase::Gatekeeping, &["draft"]),
        ];
        let result = RegistryValidator::validate(&stages);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_duplicate_ids_and_sequences() {
        let stages = vec![
            stage(1, "dup", Phase::Drafting, &[]),
            stage(1, "dup", Phase::Gatekeeping, &[]),
        ];
        let result = RegistryValidator::validate(&stages);
        assert!(result.errors.iter().any(|e| e.contains("Duplicate stage id")));
        assert!(result.errors.iter().any(|e| e.contains("Duplicate sequence")));
    }

    #[test]
    fn test_validate_decreasing_phase() {
        let stages = vec![
            stage(1, "a", Phase::Polishing, &[]),
            stage(2, "b", Phase::Strategy, &["a"]),
            stage(3, "gate", Phase::Gatekeeping, &["b"]),
        ];
        let result = RegistryValidator::validate(&stages);
        assert!(result.errors.iter().any(|e| e.contains("must not decrease")));
    }

    #[test]
    fn test_validate_missing_gatekeeper() {
        let stages = vec![stage(1, "a", Phase::Drafting, &[])];
        let result = RegistryValidator::validate(&stages);
        assert!(result.errors.iter().any(|e| e.contains("GATEKEEPING")));
    }

    #[test]
    fn test_validate_fallback_source_must_be_upstream() {
        let stages = vec![
            stage(1, "a", Phase::Drafting, &[]),
            stage(2, "b", Phase::Polishing, &["a"]).with_fallback(
                Fallback::PassthroughWithAnnotation {
                    source: ArtifactRef::new(Area::Writing, "gate.md"),
                },
            ),
            stage(3, "gate", Phase::Gatekeeping, &["b"]),
        ];
        let result = RegistryValidator::validate(&stages);
        assert!(result.errors.iter().any(|e| e.contains("fallback source")));
        assert!(result.has_warnings());
    }
}
