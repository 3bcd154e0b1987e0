// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Stage definition structures
//!
//! Phases, working areas, artifact references and the immutable
//! description of a single pipeline stage.

use std::fmt;
use std::path::PathBuf;

/// Coarse grouping of consecutive stages, used for log structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Opening,
    Strategy,
    Structure,
    Drafting,
    Polishing,
    Gatekeeping,
    Final,
}

impl Phase {
    /// All phases in run order
    pub const ALL: [Phase; 7] = [
        Self::Opening,
        Self::Strategy,
        Self::Structure,
        Self::Drafting,
        Self::Polishing,
        Self::Gatekeeping,
        Self::Final,
    ];

    /// Header title shown in phase-transition boxes
    pub fn title(&self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Strategy => "Strategy & Research",
            Self::Structure => "Structure & Audit",
            Self::Drafting => "Drafting, Critique & Rewrite",
            Self::Polishing => "Finishing & Decoration",
            Self::Gatekeeping => "Gatekeeper Review",
            Self::Final => "Delivery",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opening => write!(f, "OPENING"),
            Self::Strategy => write!(f, "STRATEGY"),
            Self::Structure => write!(f, "STRUCTURE"),
            Self::Drafting => write!(f, "DRAFTING"),
            Self::Polishing => write!(f, "POLISHING"),
            Self::Gatekeeping => write!(f, "GATEKEEPING"),
            Self::Final => write!(f, "FINAL"),
        }
    }
}

/// On-disk working area an artifact lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Strategy,
    Blueprint,
    Library,
    Writing,
    Review,
    Gallery,
}

impl Area {
    /// Every area, in layout order
    pub const ALL: [Area; 6] = [
        Self::Strategy,
        Self::Blueprint,
        Self::Library,
        Self::Writing,
        Self::Review,
        Self::Gallery,
    ];

    /// Directory name under the workroom
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Strategy => "01_strategy",
            Self::Blueprint => "02_blueprint",
            Self::Library => "03_library",
            Self::Writing => "04_writing",
            Self::Review => "05_review",
            Self::Gallery => "06_gallery",
        }
    }
}

/// Reference to a named artifact inside an area
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef {
    pub area: Area,
    pub name: String,
}

impl ArtifactRef {
    pub fn new(area: Area, name: impl Into<String>) -> Self {
        Self {
            area,
            name: name.into(),
        }
    }

    /// Path relative to the workroom root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.area.dir_name()).join(&self.name)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.area.dir_name(), self.name)
    }
}

/// What happens when a stage's generative call fails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fallback {
    /// Fail fast: the run aborts
    #[default]
    None,
    /// Copy `source` forward with an annotation appended, then continue
    PassthroughWithAnnotation { source: ArtifactRef },
}

impl Fallback {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A single pipeline stage
#[derive(Debug, Clone)]
pub struct StageDefinition {
    /// Ordinal used in diagnostics and dry-run output (may have gaps)
    pub sequence: u32,

    /// Stable short name, unique within the registry
    pub id: String,

    /// Human-facing name
    pub display_name: String,

    /// One-line description of the stage's job
    pub role: String,

    /// Instruction document file name, relative to the instructions directory
    pub instruction: String,

    /// Upstream artifacts, in payload order
    pub requires: Vec<ArtifactRef>,

    /// Artifact this stage writes
    pub produces: ArtifactRef,

    pub phase: Phase,

    pub fallback: Fallback,
}

impl StageDefinition {
    /// Create a stage with no requirements and the conventional instruction name
    pub fn new(
        sequence: u32,
        id: impl Into<String>,
        display_name: impl Into<String>,
        phase: Phase,
        produces: ArtifactRef,
    ) -> Self {
        let id = id.into();
        Self {
            sequence,
            instruction: format!("{:02}_{}.md", sequence, id),
            display_name: display_name.into(),
            role: String::new(),
            requires: Vec::new(),
            produces,
            phase,
            fallback: Fallback::None,
            id,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn requiring(mut self, requires: Vec<ArtifactRef>) -> Self {
        self.requires = requires;
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Label used in log lines, e.g. `Strategist (persona)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.id)
    }
}
