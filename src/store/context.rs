// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Shared reference context
//!
//! Up to three optional documents (strategy guide, article template,
//! expression assets) that early stages receive in addition to their inputs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Named context documents, in injection order
const SOURCES: [(&str, &str); 3] = [
    ("Strategy/Strategy.md", "Strategy guide"),
    ("Templates/Article.md", "Article template"),
    ("Assets/Assets.md", "Assets (reference expressions)"),
];

/// Loader for the optional reference documents under a context root
#[derive(Debug, Clone)]
pub struct ReferenceContext {
    root: PathBuf,
}

impl ReferenceContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All present documents as `## <title>` sections joined by rules;
    /// empty when none exist
    pub fn load(&self) -> String {
        let parts: Vec<String> = SOURCES
            .iter()
            .filter_map(|(rel, title)| {
                self.read(rel)
                    .map(|content| format!("## {}\n\n{}", title, content))
            })
            .collect();

        debug!("Reference context: {} of {} documents", parts.len(), SOURCES.len());
        parts.join("\n\n---\n\n")
    }

    /// The strategy guide alone, used as the final review's policy document
    pub fn policy(&self) -> Option<String> {
        self.read(SOURCES[0].0)
    }

    fn read(&self, rel: &str) -> Option<String> {
        let path = self.root.join(rel);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Skipping unreadable context document {}: {}", path.display(), e);
                None
            }
        }
    }
}
