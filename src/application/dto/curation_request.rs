use crate::resolution::domain::{ArtifactPattern, ResolutionMode};
use std::path::PathBuf;

/// CurationRequest - request DTO for building an application model
#[derive(Debug, Clone)]
pub struct CurationRequest {
    /// Path to the project directory containing pom.xml
    pub project_path: PathBuf,
    pub mode: ResolutionMode,
    /// Artifacts removed from the model, on top of extension exclusions
    pub excluded_artifacts: Vec<ArtifactPattern>,
    /// Fail instead of warning when platform BOMs are misaligned
    pub strict_alignment: bool,
    /// Reuse the persisted model when its inputs are unchanged
    pub reuse: bool,
    /// Directory holding the persisted model
    pub output_dir: PathBuf,
}

impl CurationRequest {
    pub fn new(project_path: PathBuf, mode: ResolutionMode, output_dir: PathBuf) -> Self {
        Self {
            project_path,
            mode,
            excluded_artifacts: Vec::new(),
            strict_alignment: false,
            reuse: false,
            output_dir,
        }
    }

    pub fn with_excluded_artifacts(mut self, patterns: Vec<ArtifactPattern>) -> Self {
        self.excluded_artifacts = patterns;
        self
    }

    pub fn with_strict_alignment(mut self, strict: bool) -> Self {
        self.strict_alignment = strict;
        self
    }

    pub fn with_reuse(mut self, reuse: bool) -> Self {
        self.reuse = reuse;
        self
    }
}
