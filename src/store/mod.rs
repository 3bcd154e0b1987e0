// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Artifact storage
//!
//! Stage outputs are plain text files under area-scoped directories of a
//! workroom. A missing artifact is never an error here; callers decide how
//! to degrade.

mod context;
mod instructions;

pub use context::ReferenceContext;
pub use instructions::InstructionLibrary;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::QuillError;
use crate::pipeline::{Area, ArtifactRef};

/// Filesystem-backed artifact store
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Workroom root containing the area directories
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root` (nothing is created yet)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every area directory; safe to call repeatedly
    pub fn ensure_layout(&self) -> Result<(), QuillError> {
        for area in Area::ALL {
            let dir = self.root.join(area.dir_name());
            std::fs::create_dir_all(&dir).map_err(|e| QuillError::FileWriteError {
                path: dir.clone(),
                error: e.to_string(),
            })?;
        }
        debug!("Workroom layout ready at {}", self.root.display());
        Ok(())
    }

    /// Absolute location of an artifact
    pub fn path_of(&self, artifact: &ArtifactRef) -> PathBuf {
        self.root.join(artifact.relative_path())
    }

    pub fn exists(&self, artifact: &ArtifactRef) -> bool {
        self.path_of(artifact).is_file()
    }

    /// Persist an artifact, overwriting any previous content
    pub fn write(&self, artifact: &ArtifactRef, content: &str) -> Result<PathBuf, QuillError> {
        let path = self.path_of(artifact);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| QuillError::FileWriteError {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        std::fs::write(&path, content).map_err(|e| QuillError::FileWriteError {
            path: path.clone(),
            error: e.to_string(),
        })?;

        debug!("Wrote {} ({} bytes)", artifact, content.len());
        Ok(path)
    }

    /// Read an artifact; `None` if it has not been produced
    pub fn read(&self, artifact: &ArtifactRef) -> Result<Option<String>, QuillError> {
        let path = self.path_of(artifact);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuillError::FileReadError {
                path,
                error: e.to_string(),
            }),
        }
    }

    /// Which of `artifacts` have not been produced yet
    pub fn missing<'a>(&self, artifacts: &'a [ArtifactRef]) -> Vec<&'a ArtifactRef> {
        artifacts.iter().filter(|a| !self.exists(a)).collect()
    }

    /// blake3 digest of a stored artifact, hex encoded
    pub fn digest(&self, artifact: &ArtifactRef) -> Result<Option<String>, QuillError> {
        let path = self.path_of(artifact);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(blake3::hash(&bytes).to_hex().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
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
    fn test_ensure_layout_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("workroom"));

        store.ensure_layout().unwrap();
        store.ensure_layout().unwrap();

        for area in Area::ALL {
            assert!(store.root().join(area.dir_name()).is_dir());
        }
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let artifact = ArtifactRef::new(Area::Library, "fact_sheet.md");

        // Parent directories are created on demand
        let path = store.write(&artifact, "facts").unwrap();
        assert!(path.ends_with("03_library/fact_sheet.md"));
        assert_eq!(store.read(&artifact).unwrap().as_deref(), Some("facts"));

        store.write(&artifact, "newer facts").unwrap();
        assert_eq!(store.read(&artifact).unwrap().as_deref(), Some("newer facts"));
    }

    #[test]
    fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let artifact = ArtifactRef::new(Area::Writing, "draft_v1.md");

        assert!(store.read(&artifact).unwrap().is_none());
        assert!(store.digest(&artifact).unwrap().is_none());
    }

    #[test]
    fn test_missing_reports_absent_inputs() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let present = ArtifactRef::new(Area::Strategy, "persona.md");
        let absent = ArtifactRef::new(Area::Strategy, "keywords.md");
        store.write(&present, "persona").unwrap();

        let inputs = vec![present, absent.clone()];
        assert_eq!(store.missing(&inputs), vec![&absent]);
    }

    #[test]
    fn test_digest_tracks_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let artifact = ArtifactRef::new(Area::Review, "final_draft.md");

        store.write(&artifact, "same").unwrap();
        let first = store.digest(&artifact).unwrap().unwrap();
        store.write(&artifact, "same").unwrap();
        assert_eq!(store.digest(&artifact).unwrap().unwrap(), first);

        store.write(&artifact, "different").unwrap();
        assert_ne!(store.digest(&artifact).unwrap().unwrap(), first);
    }
}
