// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Per-run mutable state

use std::collections::HashMap;

use crate::logging::RunLogger;
use crate::pipeline::Phase;

/// Whether stages call the generative service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Live,
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// State owned by the executor for the duration of one run
pub struct RunState {
    pub topic: String,
    pub mode: RunMode,
    pub model: String,
    pub logger: RunLogger,
    results: HashMap<String, String>,
    current_phase: Option<Phase>,
    phases: Vec<Phase>,
}

impl RunState {
    pub fn new(topic: impl Into<String>, mode: RunMode, model: impl Into<String>, logger: RunLogger) -> Self {
        Self {
            topic: topic.into(),
            mode,
            model: model.into(),
            logger,
            results: HashMap::new(),
            current_phase: None,
            phases: Vec::new(),
        }
    }

    /// Move to `phase`, logging a transition header if it differs from the
    /// current one. Returns whether a transition happened.
    pub fn enter_phase(&mut self, phase: Phase) -> bool {
        if self.current_phase == Some(phase) {
            return false;
        }
        debug_assert!(
            self.current_phase.map_or(true, |current| current < phase),
            "phase moved backwards"
        );
        self.current_phase = Some(phase);
        self.phases.push(phase);
        self.logger.phase_start(phase);
        true
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current_phase
    }

    /// Phases entered so far, in order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn record(&mut self, stage_id: &str, text: String) {
        self.results.insert(stage_id.to_string(), text);
    }

    pub fn result(&self, stage_id: &str) -> Option<&str> {
        self.results.get(stage_id).map(String::as_str)
    }

    /// Number of registry stages that completed (including fallbacks)
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn into_results(self) -> HashMap<String, String> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::EventKind;
    use tempfile::TempDir;

    #[test]
    fn test_phase_transition_logged_once() {
        let temp_dir = TempDir::new().unwrap();
        let logger = RunLogger::new(temp_dir.path()).quiet(true);
        let mut state = RunState::new("t", RunMode::DryRun, "m", logger);

        assert!(state.enter_phase(Phase::Opening));
        assert!(state.enter_phase(Phase::Strategy));
        assert!(!state.enter_phase(Phase::Strategy));

        assert_eq!(state.phases(), &[Phase::Opening, Phase::Strategy]);
        assert_eq!(state.logger.count(EventKind::PhaseTransition), 2);
    }

    #[test]
    fn test_results() {
        let temp_dir = TempDir::new().unwrap();
        let logger = RunLogger::new(temp_dir.path()).quiet(true);
        let mut state = RunState::new("t", RunMode::Live, "m", logger);

        state.record("persona", "text".into());
        assert_eq!(state.result("persona"), Some("text"));
        assert_eq!(state.completed(), 1);
        assert!(!state.mode.is_dry_run());
    }
}
