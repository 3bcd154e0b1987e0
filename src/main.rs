// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! quillflow - staged article pipeline

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillflow::cli::run::RunArgs;
use quillflow::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "quillflow=debug"
    } else {
        "quillflow=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    quillflow::utils::configure();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    if let Some(format) = cli.plan {
        return quillflow::cli::plan::run(format);
    }

    let topic = cli
        .topic
        .ok_or_else(|| miette::miette!("A topic is required"))?;

    quillflow::cli::run::run(RunArgs {
        topic,
        model: cli.model,
        dry_run: cli.dry_run,
        config: cli.config,
        quiet: cli.quiet,
        verbose: cli.verbose,
    })
    .await
}
