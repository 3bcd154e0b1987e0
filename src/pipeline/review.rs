// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Final review
//!
//! Runs once after every registry stage. Re-reviews the gatekeeper's
//! output against the strategy guide and writes the delivered article.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::GenerationSettings;
use crate::errors::{QuillError, QuillResult};
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::pipeline::payload;
use crate::pipeline::state::RunState;
use crate::pipeline::{Area, ArtifactRef, Phase};
use crate::store::{ArtifactStore, InstructionLibrary, ReferenceContext};
use crate::utils::CallSpinner;

/// Instruction document of the final review
pub const REVIEW_INSTRUCTION: &str = "00_final_review.md";

/// Where the reviewed article is delivered
pub fn delivered_artifact() -> ArtifactRef {
    ArtifactRef::new(Area::Review, "FINAL_ARTICLE.md")
}

/// Terminal, out-of-registry review stage
pub struct FinalReviewer<'a> {
    pub store: &'a ArtifactStore,
    pub instructions: &'a InstructionLibrary,
    pub context: &'a ReferenceContext,
    pub client: &'a dyn GenerativeClient,
    pub generation: &'a GenerationSettings,
    pub show_spinner: bool,
}

impl FinalReviewer<'_> {
    /// Review `terminal` and deliver it
    ///
    /// Every failure is narrated before it is returned.
    pub async fn run(&self, terminal: &ArtifactRef, state: &mut RunState) -> QuillResult<PathBuf> {
        state.enter_phase(Phase::Final);
        state
            .logger
            .narrate("Very well. Let us examine what the gatekeeper has sent up.");

        let article = match self.store.read(terminal) {
            Ok(Some(article)) => article,
            Ok(None) => {
                state
                    .logger
                    .narrate("What is this? The gatekeeper's report has not arrived!");
                return Err(QuillError::DeliverableMissing {
                    path: self.store.path_of(terminal),
                });
            }
            Err(e) => {
                state.logger.narrate(&format!("An unforeseen problem: {}", e));
                return Err(e);
            }
        };

        let result = if state.mode.is_dry_run() {
            self.deliver(&article)
        } else {
            self.review(&article, &state.topic).await
        };

        match result {
            Ok(path) => {
                state
                    .logger
                    .narrate("Well done, all of you. The article is ready for delivery.");
                state.logger.delivery(&display_path(&path, self.store.root()));
                info!("Delivered {}", path.display());
                Ok(path)
            }
            Err(e) => {
                state.logger.narrate(&format!("An unforeseen problem: {}", e));
                Err(e)
            }
        }
    }

    async fn review(&self, article: &str, topic: &str) -> QuillResult<PathBuf> {
        let system = self.instructions.load("final_review", REVIEW_INSTRUCTION)?;
        let policy = self.context.policy();
        let request = GenerationRequest::new(system, payload::for_review(topic, article, policy.as_deref()))
            .with_max_tokens(self.generation.max_tokens)
            .with_temperature(self.generation.review_temperature);

        let reviewed = {
            let _spinner = CallSpinner::start("Final review in progress...", !self.show_spinner);
            self.client.invoke(&request).await?
        };

        self.deliver(&reviewed)
    }

    fn deliver(&self, content: &str) -> QuillResult<PathBuf> {
        self.store.write(&delivered_artifact(), content)
    }
}

/// Show `path` relative to the workroom's parent when possible
fn display_path(path: &Path, workroom: &Path) -> String {
    let base = workroom.parent().unwrap_or(workroom);
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockClient, MockFailure};
    use crate::logging::{EventKind, RunLogger};
    use crate::pipeline::state::RunMode;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        store: ArtifactStore,
        instructions: InstructionLibrary,
        context: ReferenceContext,
        generation: GenerationSettings,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        std::fs::create_dir_all(root.join("instructions")).unwrap();
        Fixture {
            store: ArtifactStore::new(root.join("workroom")),
            instructions: InstructionLibrary::new(root.join("instructions")),
            context: ReferenceContext::new(&root),
            generation: GenerationSettings::default(),
            _temp_dir: temp_dir,
        }
    }

    fn state(fixture: &Fixture, mode: RunMode) -> RunState {
        let logger = RunLogger::new(fixture.store.root()).quiet(true);
        RunState::new("example topic", mode, "mock-model", logger)
    }

    fn terminal() -> ArtifactRef {
        ArtifactRef::new(Area::Review, "final_draft.md")
    }

    #[tokio::test]
    async fn test_dry_run_copies_terminal_artifact() {
        let fx = fixture();
        let client = MockClient::new();
        fx.store.write(&terminal(), "approved text").unwrap();

        let reviewer = FinalReviewer {
            store: &fx.store,
            instructions: &fx.instructions,
            context: &fx.context,
            client: &client,
            generation: &fx.generation,
            show_spinner: false,
        };
        let mut state = state(&fx, RunMode::DryRun);

        let path = reviewer.run(&terminal(), &mut state).await.unwrap();
        assert!(path.ends_with("05_review/FINAL_ARTICLE.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "approved text");
        assert_eq!(client.call_count(), 0);
        assert_eq!(state.current_phase(), Some(Phase::Final));
        assert_eq!(state.logger.count(EventKind::Delivery), 1);
    }

    #[tokio::test]
    async fn test_missing_terminal_is_deliverable_missing() {
        let fx = fixture();
        let client = MockClient::new();
        let reviewer = FinalReviewer {
            store: &fx.store,
            instructions: &fx.instructions,
            context: &fx.context,
            client: &client,
            generation: &fx.generation,
            show_spinner: false,
        };
        let mut state = state(&fx, RunMode::DryRun);

        let result = reviewer.run(&terminal(), &mut state).await;
        assert!(matches!(result, Err(QuillError::DeliverableMissing { .. })));
        assert_eq!(state.logger.count(EventKind::Delivery), 0);
    }

    #[tokio::test]
    async fn test_live_review_uses_review_temperature_and_policy() {
        let fx = fixture();
        let root = fx.store.root().parent().unwrap().to_path_buf();
        std::fs::write(root.join("instructions").join(REVIEW_INSTRUCTION), "Review it.").unwrap();
        std::fs::create_dir_all(root.join("Strategy")).unwrap();
        std::fs::write(root.join("Strategy/Strategy.md"), "Short sentences.").unwrap();
        fx.store.write(&terminal(), "approved text").unwrap();

        let client = MockClient::new();
        client.add_response("reviewed text");
        let reviewer = FinalReviewer {
            store: &fx.store,
            instructions: &fx.instructions,
            context: &fx.context,
            client: &client,
            generation: &fx.generation,
            show_spinner: false,
        };
        let mut state = state(&fx, RunMode::Live);

        let path = reviewer.run(&terminal(), &mut state).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "reviewed text");

        let request = &client.requests()[0];
        assert_eq!(request.system, "Review it.");
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert!(request.payload.contains("approved text"));
        assert!(request.payload.contains("Short sentences."));
        assert!(request.payload.contains("\"example topic\""));
    }

    #[tokio::test]
    async fn test_live_review_failure_is_narrated() {
        let fx = fixture();
        let root = fx.store.root().parent().unwrap().to_path_buf();
        std::fs::write(root.join("instructions").join(REVIEW_INSTRUCTION), "Review it.").unwrap();
        fx.store.write(&terminal(), "approved text").unwrap();

        let client = MockClient::new();
        client.add_failure(MockFailure::Call("quota exceeded".into()));
        let reviewer = FinalReviewer {
            store: &fx.store,
            instructions: &fx.instructions,
            context: &fx.context,
            client: &client,
            generation: &fx.generation,
            show_spinner: false,
        };
        let mut state = state(&fx, RunMode::Live);

        let result = reviewer.run(&terminal(), &mut state).await;
        assert!(matches!(result, Err(QuillError::CallFailed { .. })));
        assert!(!fx.store.exists(&delivered_artifact()));
        assert!(state
            .logger
            .lines()
            .iter()
            .any(|l| l.contains("An unforeseen problem") && l.contains("quota exceeded")));
    }
}
