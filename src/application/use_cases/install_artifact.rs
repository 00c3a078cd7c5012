use crate::ports::outbound::{ArtifactResolver, ProgressReporter};
use crate::resolution::domain::ArtifactCoords;
use crate::shared::error::CuratorError;
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// InstallArtifactUseCase - places a built artifact into the local repository
pub struct InstallArtifactUseCase<R, P> {
    repository: R,
    progress_reporter: P,
}

impl<R: ArtifactResolver, P: ProgressReporter> InstallArtifactUseCase<R, P> {
    pub fn new(repository: R, progress_reporter: P) -> Self {
        Self {
            repository,
            progress_reporter,
        }
    }

    /// Installs `file` under `coords`.
    ///
    /// # Returns
    /// The installed path
    ///
    /// # Errors
    /// Returns an error if `file` is not a regular file or the install fails
    pub fn execute(&self, coords: &ArtifactCoords, file: &Path) -> Result<PathBuf> {
        if !file.is_file() {
            return Err(CuratorError::FileReadError {
                path: file.to_path_buf(),
                details: "Not a regular file".to_string(),
            }
            .into());
        }
        self.progress_reporter
            .report(&format!("📦 Installing {}", coords.to_compact_string()));
        let installed = self.repository.install(coords, file)?;
        self.progress_reporter
            .report_completion(&format!("Installed to {}", installed.display()));
        Ok(installed)
    }
}
