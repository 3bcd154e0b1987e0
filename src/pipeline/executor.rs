// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Pipeline executor
//!
//! Walks the registry in declared order, one stage at a time, then hands
//! the terminal artifact to the final review.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::errors::{QuillError, QuillResult};
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::logging::{LogEntry, RunLogger};
use crate::pipeline::review::FinalReviewer;
use crate::pipeline::state::{RunMode, RunState};
use crate::pipeline::{flavor, payload, Fallback, Phase, StageDefinition, StageRegistry};
use crate::store::{ArtifactStore, InstructionLibrary, ReferenceContext};
use crate::utils::CallSpinner;

/// Comment appended to a passthrough fallback artifact
pub const FALLBACK_ANNOTATION: &str =
    "\n\n<!-- quillflow: visual augmentation failed; placeholder passthrough -->\n";

/// Per-run options
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    pub topic: String,
    /// Write placeholders instead of calling the service
    pub dry_run: bool,
    /// Silence console rendering of run events
    pub quiet: bool,
}

impl ExecutionOptions {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            dry_run: false,
            quiet: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct RunReport {
    pub success: bool,
    /// Registry stages completed (fallbacks included) plus the final review
    pub completed: usize,
    /// Id of the stage that aborted the run
    pub failed_stage: Option<String>,
    pub error: Option<QuillError>,
    pub delivered: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    /// Stage id to produced text
    pub results: HashMap<String, String>,
    pub phases: Vec<Phase>,
    pub events: Vec<LogEntry>,
    pub duration: Duration,
}

/// What a failed stage turned into
enum StageOutcome {
    Recovered,
    /// Fallback-eligible stage left without output; the run moves on
    Skipped,
    Abort,
}

/// Sequential pipeline executor
pub struct PipelineExecutor {
    registry: StageRegistry,
    settings: Settings,
    store: ArtifactStore,
    instructions: InstructionLibrary,
    context: ReferenceContext,
    client: Arc<dyn GenerativeClient>,
}

impl PipelineExecutor {
    /// Create an executor rooted at `root`, with directories taken from
    /// `settings.paths`
    pub fn new(
        registry: StageRegistry,
        settings: Settings,
        root: &Path,
        client: Arc<dyn GenerativeClient>,
    ) -> Self {
        let store = ArtifactStore::new(settings.paths.workroom_in(root));
        let instructions = InstructionLibrary::new(settings.paths.instructions_in(root));
        let context = ReferenceContext::new(settings.paths.context_in(root));
        Self {
            registry,
            settings,
            store,
            instructions,
            context,
            client,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Execute a full run
    ///
    /// Stage failures do not surface as `Err`; they end up in the report.
    /// `Err` means the run could not start.
    pub async fn execute(&self, options: &ExecutionOptions) -> QuillResult<RunReport> {
        let topic = options.topic.trim();
        if topic.is_empty() {
            return Err(QuillError::InvalidTopic);
        }

        self.store.ensure_layout()?;

        let mode = if options.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        };
        let logger = RunLogger::new(self.store.root()).quiet(options.quiet);
        let mut state = RunState::new(topic, mode, &self.settings.model, logger);
        let show_spinner = !options.quiet && !mode.is_dry_run();

        info!(
            "Starting run: topic={:?}, mode={:?}, model={}, stages={}",
            topic,
            mode,
            self.settings.model,
            self.registry.len()
        );

        state.logger.banner(crate::VERSION);
        state.enter_phase(Phase::Opening);
        state.logger.narrate(&format!(
            "A commission has arrived: \"{}\". Everyone to your posts!",
            topic
        ));
        if mode.is_dry_run() {
            state
                .logger
                .narrate("Dry run: every stage writes a placeholder, no service calls.");
        }

        let shared_context = if mode.is_dry_run() {
            String::new()
        } else {
            self.context.load()
        };

        for (position, stage) in self.registry.iter().enumerate() {
            state.enter_phase(stage.phase);
            state.logger.stage_start(stage, &flavor::start_line(&stage.id));

            let result = if mode.is_dry_run() {
                self.placeholder_stage(stage, &mut state)
            } else {
                self.live_stage(stage, position, &shared_context, show_spinner, &mut state)
                    .await
            };

            let error = match result {
                Ok(()) => continue,
                Err(e) => e,
            };

            warn!("Stage {} failed: {}", stage.id, error);
            state
                .logger
                .stage_error(stage, &flavor::error_line(&stage.id, &error.to_string()));

            match self.apply_fallback(stage, &mut state) {
                StageOutcome::Recovered => continue,
                StageOutcome::Skipped => {
                    state.logger.narrate(&format!(
                        "{} left nothing behind. We press on without it.",
                        stage.display_name
                    ));
                    continue;
                }
                StageOutcome::Abort => {
                    state.logger.narrate(&format!(
                        "{} has fallen. The run is suspended.",
                        stage.display_name
                    ));
                    return Ok(self.finish(state, false, Some(stage.id.clone()), Some(error), None));
                }
            }
        }

        let reviewer = FinalReviewer {
            store: &self.store,
            instructions: &self.instructions,
            context: &self.context,
            client: self.client.as_ref(),
            generation: &self.settings.generation,
            show_spinner,
        };

        match reviewer.run(self.registry.terminal_artifact(), &mut state).await {
            Ok(path) => Ok(self.finish(state, true, None, None, Some(path))),
            Err(e) => Ok(self.finish(state, false, Some("final_review".to_string()), Some(e), None)),
        }
    }

    /// Deterministic stand-in output for dry runs
    pub fn placeholder(stage: &StageDefinition, topic: &str) -> String {
        format!(
            "# #{:02} {} ({})\n\nTopic: {}\n\n> Dry run: placeholder output, no generative call was made.\n",
            stage.sequence, stage.display_name, stage.id, topic
        )
    }

    fn placeholder_stage(&self, stage: &StageDefinition, state: &mut RunState) -> QuillResult<()> {
        let content = Self::placeholder(stage, &state.topic);
        self.store.write(&stage.produces, &content)?;
        state.record(&stage.id, content);
        state.logger.stage_done(
            stage,
            &format!("{} (dry run)", flavor::done_line(&stage.id, &stage.produces.to_string())),
        );
        Ok(())
    }

    async fn live_stage(
        &self,
        stage: &StageDefinition,
        position: usize,
        shared_context: &str,
        show_spinner: bool,
        state: &mut RunState,
    ) -> QuillResult<()> {
        let system = self.instructions.load(&stage.id, &stage.instruction)?;

        let missing = self.store.missing(&stage.requires);
        if !missing.is_empty() {
            debug!("{}: {} input(s) not produced yet", stage.id, missing.len());
        }

        let early = position < self.settings.generation.early_stage_threshold;
        let user_payload = payload::for_stage(
            &state.topic,
            stage,
            &self.store,
            early.then_some(shared_context),
        )?;

        let request = GenerationRequest::new(system, user_payload)
            .with_max_tokens(self.settings.generation.max_tokens)
            .with_temperature(self.settings.generation.stage_temperature);

        let text = {
            let _spinner = CallSpinner::start(
                &format!("{} is working...", stage.display_name),
                !show_spinner,
            );
            self.client.invoke(&request).await?
        };

        self.store.write(&stage.produces, &text)?;
        if let Ok(Some(digest)) = self.store.digest(&stage.produces) {
            debug!("{} -> {} ({})", stage.id, stage.produces, &digest[..12]);
        }
        state.record(&stage.id, text);
        state
            .logger
            .stage_done(stage, &flavor::done_line(&stage.id, &stage.produces.to_string()));
        Ok(())
    }

    /// Apply the stage's fallback policy after a failure
    ///
    /// A fallback-eligible stage never aborts the run. When its source
    /// cannot be passed through, the stage is skipped and later stages see
    /// the not-produced placeholder.
    fn apply_fallback(&self, stage: &StageDefinition, state: &mut RunState) -> StageOutcome {
        let source = match &stage.fallback {
            Fallback::None => return StageOutcome::Abort,
            Fallback::PassthroughWithAnnotation { source } => source,
        };

        let content = match self.store.read(source) {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!("{}: fallback source {} is absent", stage.id, source);
                return StageOutcome::Skipped;
            }
            Err(e) => {
                warn!("{}: cannot read fallback source: {}", stage.id, e);
                return StageOutcome::Skipped;
            }
        };

        let passthrough = format!("{}{}", content, FALLBACK_ANNOTATION);
        if let Err(e) = self.store.write(&stage.produces, &passthrough) {
            warn!("{}: cannot write fallback artifact: {}", stage.id, e);
            return StageOutcome::Skipped;
        }

        state.record(&stage.id, passthrough);
        state
            .logger
            .stage_done(stage, "Continuing with a placeholder passthrough.");
        StageOutcome::Recovered
    }

    fn finish(
        &self,
        mut state: RunState,
        success: bool,
        failed_stage: Option<String>,
        error: Option<QuillError>,
        delivered: Option<PathBuf>,
    ) -> RunReport {
        let completed = state.completed() + usize::from(success);
        state.logger.summary(success, completed);
        let log_path = state.logger.persist(&state.topic);

        let duration = state.logger.elapsed();
        let events = state.logger.entries().to_vec();
        let phases = state.phases().to_vec();

        info!(
            "Run finished: success={}, completed={}, duration={:.2}s",
            success,
            completed,
            duration.as_secs_f64()
        );

        RunReport {
            success,
            completed,
            failed_stage,
            error,
            delivered,
            log_path,
            results: state.into_results(),
            phases,
            events,
            duration,
        }
    }
}
