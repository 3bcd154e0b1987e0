// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Run configuration
//!
//! Optional `.quillflow.yaml` in the working root. Every field has a
//! default, so a missing file (or a partial one) is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::QuillError;

/// Default configuration file name
pub const CONFIG_FILE: &str = ".quillflow.yaml";

/// Default generative model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model identifier passed to the service
    pub model: String,

    pub generation: GenerationSettings,

    pub service: ServiceSettings,

    pub paths: PathSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationSettings::default(),
            service: ServiceSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub max_tokens: u32,

    /// Temperature for registry stages
    pub stage_temperature: f32,

    /// Temperature for the final review
    pub review_temperature: f32,

    /// Stages declared before this position receive the shared context
    pub early_stage_threshold: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 8192,
            stage_temperature: 0.7,
            review_temperature: 0.3,
            early_stage_threshold: 4,
        }
    }
}

/// Connection to the generative service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub api_version: String,

    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout_secs: 600,
        }
    }
}

/// Directory layout, relative to the working root unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub workroom: PathBuf,
    pub instructions: PathBuf,
    /// Root of the reference context documents; the working root if unset
    pub context: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            workroom: PathBuf::from("workroom"),
            instructions: PathBuf::from("instructions"),
            context: None,
        }
    }
}

impl PathSettings {
    pub fn workroom_in(&self, root: &Path) -> PathBuf {
        root.join(&self.workroom)
    }

    pub fn instructions_in(&self, root: &Path) -> PathBuf {
        root.join(&self.instructions)
    }

    pub fn context_in(&self, root: &Path) -> PathBuf {
        match &self.context {
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        }
    }
}

impl Settings {
    /// Load from file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, QuillError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| QuillError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let settings: Settings = serde_yaml::from_str(&content).map_err(|e| QuillError::Config {
            reason: format!("{}: {}", path.display(), e),
            help: Some("Check the YAML syntax and field names".into()),
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load `.quillflow.yaml` from the working root
    pub fn load_from_root(root: &Path) -> Result<Self, QuillError> {
        Self::load(&root.join(CONFIG_FILE))
    }

    fn validate(&self) -> Result<(), QuillError> {
        if self.model.trim().is_empty() {
            return Err(QuillError::Config {
                reason: "model must not be empty".into(),
                help: None,
            });
        }
        if self.generation.max_tokens == 0 {
            return Err(QuillError::Config {
                reason: "generation.max_tokens must be positive".into(),
                help: None,
            });
        }
        for (name, value) in [
            ("stage_temperature", self.generation.stage_temperature),
            ("review_temperature", self.generation.review_temperature),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QuillError::Config {
                    reason: format!("generation.{} must be within 0.0..=1.0", name),
                    help: None,
                });
            }
        }
        Ok(())
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_root(temp_dir.path()).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.generation.max_tokens, 8192);
        assert_eq!(settings.generation.early_stage_threshold, 4);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "model: claude-test\ngeneration:\n  max_tokens: 2048\npaths:\n  context: refs\n",
        )
        .unwrap();

        let settings = Settings::load_from_root(temp_dir.path()).unwrap();
        assert_eq!(settings.model, "claude-test");
        assert_eq!(settings.generation.max_tokens, 2048);
        assert!((settings.generation.review_temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.service.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(
            settings.paths.context_in(Path::new("/work")),
            PathBuf::from("/work/refs")
        );
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "model: [unclosed").unwrap();

        let result = Settings::load_from_root(temp_dir.path());
        assert!(matches!(result, Err(QuillError::Config { .. })));
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "generation:\n  stage_temperature: 1.5\n",
        )
        .unwrap();

        let result = Settings::load_from_root(temp_dir.path());
        assert!(matches!(result, Err(QuillError::Config { .. })));
    }

    #[test]
    fn test_model_override() {
        let settings = Settings::default().with_model(Some("other".into()));
        assert_eq!(settings.model, "other");

        let settings = Settings::default().with_model(None);
        assert_eq!(settings.model, DEFAULT_MODEL);
    }
}
