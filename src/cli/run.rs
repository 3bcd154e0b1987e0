// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Run command - execute the pipeline for one topic

use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::errors::QuillError;
use crate::llm::{AnthropicClient, GenerativeClient, LazyClient};
use crate::pipeline::{ExecutionOptions, PipelineExecutor, RunReport, StageRegistry};
use crate::utils::{print_error, print_info, print_success};

/// Arguments of a run
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub topic: String,
    pub model: Option<String>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
}

/// Resolve settings: explicit file, else `.quillflow.yaml` in `root`, then
/// the model override
pub fn load_settings(root: &Path, config: Option<&Path>, model: Option<String>) -> Result<Settings> {
    let settings = match config {
        Some(path) if !path.exists() => {
            return Err(QuillError::Config {
                reason: format!("configuration file not found: {}", path.display()),
                help: Some("Omit --config to use .quillflow.yaml or built-in defaults".into()),
            }
            .into())
        }
        Some(path) => Settings::load(path)?,
        None => Settings::load_from_root(root)?,
    };
    Ok(settings.with_model(model))
}

/// Client that connects to the service on first use
fn deferred_client(settings: &Settings) -> Arc<dyn GenerativeClient> {
    let service = settings.service.clone();
    let model = settings.model.clone();
    let client = LazyClient::new(move || {
        AnthropicClient::connect(&service, &model).map(|c| Arc::new(c) as Arc<dyn GenerativeClient>)
    })
    .with_model(settings.model.clone());
    Arc::new(client)
}

/// Run the pipeline
pub async fn run(args: RunArgs) -> Result<()> {
    let root = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let settings = load_settings(&root, args.config.as_deref(), args.model.clone())?;
    let registry = StageRegistry::builtin()?;

    if args.verbose && !args.quiet {
        print_info(&format!(
            "model {} | {} stages | workroom {}",
            settings.model,
            registry.len(),
            settings.paths.workroom_in(&root).display()
        ));
    }

    let client = deferred_client(&settings);
    let executor = PipelineExecutor::new(registry, settings, &root, client);

    let options = ExecutionOptions::new(args.topic)
        .dry_run(args.dry_run)
        .quiet(args.quiet);

    let report = executor.execute(&options).await?;
    report_outcome(report, args.quiet)
}

fn report_outcome(report: RunReport, quiet: bool) -> Result<()> {
    if !quiet {
        if let Some(path) = &report.log_path {
            println!();
            println!("  {} {}", "Run record:".bold(), path.display());
        }
    }

    if report.success {
        if let Some(path) = &report.delivered {
            if !quiet {
                print_success(&format!("Delivered {}", path.display()));
            }
        }
        return Ok(());
    }

    let stage = report.failed_stage.as_deref().unwrap_or("unknown");
    eprintln!();
    eprintln!("{}", format!("Stage '{}' failed:", stage).red().bold());
    if let Some(error) = &report.error {
        print_error(&error.to_string());
        if let Some(suggestion) = error.recovery() {
            eprintln!();
            eprintln!("{}", suggestion);
        }
    }

    Err(miette::miette!(
        "Run aborted after {} completed stage(s)",
        report.completed
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_flag_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".quillflow.yaml"), "model: from-file\n").unwrap();

        let settings = load_settings(temp_dir.path(), None, None).unwrap();
        assert_eq!(settings.model, "from-file");

        let settings = load_settings(temp_dir.path(), None, Some("from-flag".into())).unwrap();
        assert_eq!(settings.model, "from-flag");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yaml");
        assert!(load_settings(temp_dir.path(), Some(&missing), None).is_err());
    }
}
