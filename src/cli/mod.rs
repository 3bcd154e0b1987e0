// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! CLI definition and handlers

pub mod plan;
pub mod run;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Staged article pipeline
///
/// Turns one topic into a reviewed article through a fixed sequence of
/// generative stages.
#[derive(Parser, Debug)]
#[clap(
    name = "quillflow",
    version,
    about = "Turn a topic into a reviewed article through staged generative passes",
    long_about = None,
    after_help = "Examples:\n\
        quillflow \"pour-over coffee\" --dry-run   Walk every stage without service calls\n\
        quillflow \"pour-over coffee\"             Live run (needs ANTHROPIC_API_KEY)\n\
        quillflow --plan mermaid                 Print the stage graph"
)]
pub struct Cli {
    /// Topic of the article
    #[clap(required_unless_present = "plan")]
    pub topic: Option<String>,

    /// Model identifier for the generative service
    #[clap(long, env = "QUILLFLOW_MODEL", value_name = "ID")]
    pub model: Option<String>,

    /// Write placeholder artifacts instead of calling the service
    #[clap(long)]
    pub dry_run: bool,

    /// Print the stage graph and exit
    #[clap(
        long,
        value_enum,
        value_name = "FORMAT",
        num_args = 0..=1,
        default_missing_value = "text"
    )]
    pub plan: Option<PlanFormat>,

    /// Configuration file (default: .quillflow.yaml in the working root)
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Silence run events on the console (the run record is still written)
    #[clap(short, long)]
    pub quiet: bool,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

/// Stage graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Text,
    Dot,
    Mermaid,
}
