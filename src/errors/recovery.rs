// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions printed after an aborted run.

use std::path::Path;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest creating a missing instruction document
    pub fn create_instruction(path: &Path) -> Self {
        Self {
            action: "Provide the stage instruction document".into(),
            steps: vec![
                format!("Expected file: {}", path.display()),
                "Its contents are sent verbatim as the system instruction".into(),
            ],
            commands: vec![
                "# Check a run without calling the service:".into(),
                "quillflow \"<topic>\" --dry-run".into(),
            ],
        }
    }

    /// Suggest configuring the generative service
    pub fn configure_service() -> Self {
        Self {
            action: "Configure access to the generative service".into(),
            steps: vec![
                "The API key is read from the environment on first use".into(),
                "The variable name can be changed with `service.api_key_env` in .quillflow.yaml".into(),
            ],
            commands: vec![
                "export ANTHROPIC_API_KEY=<your key>".into(),
            ],
        }
    }

    /// Suggest retrying after a failed call
    pub fn retry_call(status: Option<u16>) -> Self {
        let mut steps = Vec::new();
        match status {
            Some(401) | Some(403) => steps.push("The service rejected the credentials".into()),
            Some(404) => steps.push("The model identifier may be wrong (see --model)".into()),
            Some(429) => steps.push("Rate limit or quota exceeded; wait before re-running".into()),
            Some(code) => steps.push(format!("The service answered with HTTP {}", code)),
            None => steps.push("The request did not complete (network or malformed reply)".into()),
        }
        steps.push("Runs start from scratch; earlier artifacts are overwritten".into());

        Self {
            action: "Re-run once the service is healthy".into(),
            steps,
            commands: vec![],
        }
    }

    /// Suggest how to get a terminal artifact for the final review
    pub fn missing_deliverable(path: &Path) -> Self {
        Self {
            action: "Produce the gatekeeping artifact".into(),
            steps: vec![
                format!("Final review reads {}", path.display()),
                "Re-run the full pipeline so the gatekeeping stage writes it".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing a malformed stage registry
    pub fn fix_registry(reason: &str) -> Self {
        Self {
            action: "Fix the stage registry".into(),
            steps: vec![
                reason.to_string(),
                "Stages must be declared in dependency order with unique ids and outputs".into(),
            ],
            commands: vec![
                "# Inspect the declared stages:".into(),
                "quillflow --plan".into(),
            ],
        }
    }

    /// Suggest fixing a circular dependency
    pub fn fix_circular_dependency(stages: &[String]) -> Self {
        Self {
            action: "Remove circular dependency".into(),
            steps: vec![
                format!("Detected cycle: {}", stages.join(" → ")),
                "Each stage may only require artifacts of earlier stages".into(),
            ],
            commands: vec![
                "# Visualize the stage graph:".into(),
                "quillflow --plan mermaid".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_call_mentions_status() {
        let suggestion = RecoverySuggestion::retry_call(Some(429));
        assert!(suggestion.to_string().contains("quota"));

        let suggestion = RecoverySuggestion::retry_call(Some(500));
        assert!(suggestion.to_string().contains("HTTP 500"));
    }
}
