// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Run logger
//!
//! The user-facing event stream of a run. Each event is printed to the
//! console with decoration and appended in plain form to an in-memory
//! buffer, which is written to a markdown run record at the end.
//!
//! Diagnostics for developers go through `tracing`; this is separate.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use colored::Colorize;
use tracing::{debug, warn};

use crate::pipeline::{Phase, StageDefinition};

const BOX_WIDTH: usize = 58;

/// Kind of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Banner,
    Narration,
    PhaseTransition,
    StageStart,
    StageDone,
    StageError,
    Delivery,
    Summary,
}

/// One buffered event in plain form
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub kind: EventKind,
    pub text: String,
}

/// Append-only run event log
pub struct RunLogger {
    log_dir: PathBuf,
    entries: Vec<LogEntry>,
    started: Instant,
    quiet: bool,
}

impl RunLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            entries: Vec::new(),
            started: Instant::now(),
            quiet: false,
        }
    }

    /// Suppress console output; the buffer is unaffected
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn push(&mut self, kind: EventKind, styled: colored::ColoredString, plain: String) {
        let ts = Self::timestamp();
        if !self.quiet {
            println!("{} {}", format!("[{}]", ts).dimmed(), styled);
        }
        self.entries.push(LogEntry {
            kind,
            text: format!("[{}] {}", ts, plain),
        });
    }

    /// Push a multi-line boxed event as a single entry, every line stamped
    fn push_box(
        &mut self,
        kind: EventKind,
        lines: &[String],
        style: fn(&str) -> colored::ColoredString,
    ) {
        let ts = Self::timestamp();
        let stamped: Vec<String> = lines.iter().map(|l| format!("[{}] {}", ts, l)).collect();
        if !self.quiet {
            for line in lines {
                println!("{} {}", format!("[{}]", ts).dimmed(), style(line));
            }
        }
        self.entries.push(LogEntry {
            kind,
            text: stamped.join("\n"),
        });
    }

    /// Opening banner
    pub fn banner(&mut self, version: &str) {
        let rule = "═".repeat(BOX_WIDTH);
        let title = format!("quillflow {}  ~  the writing room is open", version);
        if !self.quiet {
            println!();
            println!("{}", format!("╔{}╗", rule).yellow());
            println!("{}", format!("║  {:<width$}║", title, width = BOX_WIDTH - 2).yellow());
            println!("{}", format!("╚{}╝", rule).yellow());
            println!();
        }
        self.entries.push(LogEntry {
            kind: EventKind::Banner,
            text: format!("[{}] {}", Self::timestamp(), title),
        });
    }

    /// A line spoken by the steward
    pub fn narrate(&mut self, message: &str) {
        let plain = format!("  [Steward] {}", message);
        self.push(
            EventKind::Narration,
            format!("  ◆ [Steward] {}", message).yellow(),
            plain,
        );
    }

    /// Boxed three-line header for a new phase, logged as one event
    pub fn phase_start(&mut self, phase: Phase) {
        let rule = "═".repeat(BOX_WIDTH);
        let label = format!("Phase: {} ({})", phase, phase.title());
        let lines = [
            format!("╔{}╗", rule),
            format!("║  {:<width$}║", label, width = BOX_WIDTH - 2),
            format!("╚{}╝", rule),
        ];
        self.push_box(EventKind::PhaseTransition, &lines, |l| l.cyan());
    }

    pub fn stage_start(&mut self, stage: &StageDefinition, message: &str) {
        let plain = format!("  [{}] {}", stage.label(), message);
        self.push(
            EventKind::StageStart,
            format!("  → [{}] {}", stage.label(), message).green(),
            plain,
        );
    }

    pub fn stage_done(&mut self, stage: &StageDefinition, message: &str) {
        let plain = format!("  [done: {}] {}", stage.display_name, message);
        self.push(
            EventKind::StageDone,
            format!("  ✓ [{}] {}", stage.display_name, message).green(),
            plain,
        );
    }

    pub fn stage_error(&mut self, stage: &StageDefinition, message: &str) {
        let plain = format!("  [failed: {}] {}", stage.display_name, message);
        self.push(
            EventKind::StageError,
            format!("  ✗ [{}] {}", stage.display_name, message).red(),
            plain,
        );
    }

    /// Boxed delivery notice
    pub fn delivery(&mut self, delivered: &str) {
        let rule = "═".repeat(BOX_WIDTH);
        let inner = BOX_WIDTH - 2;
        let lines = [
            format!("╔{}╗", rule),
            format!("║  {:<inner$}║", "The article is ready for delivery."),
            format!("║  {:<inner$}║", ""),
            format!("║  {:<inner$}║", format!("Delivered to: {}", delivered)),
            format!("╚{}╝", rule),
        ];

        if !self.quiet {
            println!();
        }
        self.push_box(EventKind::Delivery, &lines, |l| l.yellow().bold());
        if !self.quiet {
            println!();
        }
    }

    /// Final tally of the run
    pub fn summary(&mut self, success: bool, completed: usize) {
        let status = if success { "success" } else { "aborted" };
        let body = format!(
            "Run result: {} | stages completed: {} | elapsed: {}",
            status,
            completed,
            format_elapsed(self.elapsed())
        );
        self.push(
            EventKind::Summary,
            format!("  ■ {}", body).magenta(),
            format!("  {}", body),
        );
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Plain lines in event order
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Render the full run record
    pub fn render(&self, topic: &str) -> String {
        let mut out = format!("# Run record — \"{}\"\n\n", topic);
        out.push_str(&format!(
            "Date: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("---\n\n");
        out.push_str(&self.lines().join("\n"));
        out.push('\n');
        out
    }

    /// Write the run record; failures are reported through tracing only
    pub fn persist(&self, topic: &str) -> Option<PathBuf> {
        if let Err(e) = std::fs::create_dir_all(&self.log_dir) {
            warn!("Cannot create log directory {}: {}", self.log_dir.display(), e);
            return None;
        }

        let path = self.next_log_path();
        match std::fs::write(&path, self.render(topic)) {
            Ok(()) => {
                debug!("Run record written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to write run record {}: {}", path.display(), e);
                None
            }
        }
    }

    fn next_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let base = self.log_dir.join(format!("run_log_{}.md", stamp));
        if !base.exists() {
            return base;
        }
        (1..)
            .map(|n| self.log_dir.join(format!("run_log_{}_{}.md", stamp, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }
}

/// Format a duration as `MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Area, ArtifactRef};
    use tempfile::TempDir;

    fn stage() -> StageDefinition {
        StageDefinition::new(
            1,
            "persona",
            "Strategist",
            Phase::Strategy,
            ArtifactRef::new(Area::Strategy, "persona.md"),
        )
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "01:15");
        assert_eq!(format_elapsed(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn test_events_are_buffered_plain() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = RunLogger::new(temp_dir.path()).quiet(true);
        let stage = stage();

        logger.phase_start(Phase::Strategy);
        logger.stage_start(&stage, "Drawing up the reader persona.");
        logger.stage_error(&stage, "call failed");
        logger.summary(false, 0);

        assert_eq!(logger.count(EventKind::PhaseTransition), 1);
        assert_eq!(logger.count(EventKind::StageError), 1);

        let lines = logger.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Phase: STRATEGY"));
        assert!(lines[1].ends_with("[Strategist (persona)] Drawing up the reader persona."));
        assert!(lines[2].contains("[failed: Strategist] call failed"));
        assert!(lines[3].contains("Run result: aborted | stages completed: 0"));
        // Plain lines carry no ANSI escapes
        assert!(lines.iter().all(|l| !l.contains('\x1b')));
    }

    fn is_stamped(line: &str) -> bool {
        let bytes = line.as_bytes();
        line.len() > 11
            && bytes[0] == b'['
            && bytes[3] == b':'
            && bytes[6] == b':'
            && &line[9..11] == "] "
            && line[1..9].chars().filter(char::is_ascii_digit).count() == 6
    }

    #[test]
    fn test_phase_header_is_one_stamped_entry() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = RunLogger::new(temp_dir.path()).quiet(true);

        logger.phase_start(Phase::Drafting);

        assert_eq!(logger.entries().len(), 1);
        let rows: Vec<&str> = logger.entries()[0].text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| is_stamped(r)));
        assert!(rows[0].ends_with('╗'));
        assert!(rows[1].contains("Phase: DRAFTING"));
        assert!(rows[2].ends_with('╝'));
    }

    #[test]
    fn test_delivery_is_stamped() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = RunLogger::new(temp_dir.path()).quiet(true);

        logger.delivery("workroom/05_review/FINAL_ARTICLE.md");

        assert_eq!(logger.count(EventKind::Delivery), 1);
        let rows: Vec<&str> = logger.entries()[0].text.lines().collect();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| is_stamped(r)), "{:?}", rows);
        assert!(rows[3].contains("Delivered to: workroom/05_review/FINAL_ARTICLE.md"));
    }

    #[test]
    fn test_persist_writes_header_and_lines() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = RunLogger::new(temp_dir.path().join("workroom")).quiet(true);
        logger.narrate("Let us begin.");
        logger.delivery("workroom/05_review/FINAL_ARTICLE.md");

        let path = logger.persist("example topic").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("run_log_"));
        assert!(name.ends_with(".md"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Run record — \"example topic\"\n\nDate: "));
        assert!(content.contains("\n---\n\n"));
        assert!(content.contains("[Steward] Let us begin."));
        assert!(content.contains("Delivered to: workroom/05_review/FINAL_ARTICLE.md"));
    }

    #[test]
    fn test_persist_does_not_overwrite_same_second() {
        let temp_dir = TempDir::new().unwrap();
        let logger = RunLogger::new(temp_dir.path()).quiet(true);

        let first = logger.persist("a").unwrap();
        let second = logger.persist("b").unwrap();
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_persist_failure_yields_none() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let logger = RunLogger::new(blocker.join("logs")).quiet(true);
        assert!(logger.persist("topic").is_none());
    }
}
