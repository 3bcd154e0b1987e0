// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Instruction documents
//!
//! One markdown file per stage, sent verbatim as the system instruction.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::QuillError;

/// Directory of instruction documents
#[derive(Debug, Clone)]
pub struct InstructionLibrary {
    dir: PathBuf,
}

impl InstructionLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Load the instruction `name` on behalf of `stage`
    pub fn load(&self, stage: &str, name: &str) -> Result<String, QuillError> {
        let path = self.path_of(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(QuillError::InstructionMissing {
                stage: stage.to_string(),
                path,
            }),
            Err(e) => Err(QuillError::FileReadError {
                path,
                error: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_existing_instruction() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("01_persona.md"), "You design personas.").unwrap();

        let library = InstructionLibrary::new(temp_dir.path());
        let text = library.load("persona", "01_persona.md").unwrap();
        assert_eq!(text, "You design personas.");
    }

    #[test]
    fn test_missing_instruction_is_instruction_missing() {
        let temp_dir = TempDir::new().unwrap();
        let library = InstructionLibrary::new(temp_dir.path());

        match library.load("persona", "01_persona.md") {
            Err(QuillError::InstructionMissing { stage, path }) => {
                assert_eq!(stage, "persona");
                assert!(path.ends_with("01_persona.md"));
            }
            other => panic!("Expected InstructionMissing, got {:?}", other),
        }
    }
}
