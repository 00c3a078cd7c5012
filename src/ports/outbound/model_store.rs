use crate::resolution::domain::ApplicationModel;
use crate::shared::error::ModelLoadError;
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// ModelStore port for persisting the application model between runs
pub trait ModelStore {
    /// Persists the model and its build-system properties under `output_dir`
    ///
    /// # Returns
    /// Path of the written model file
    ///
    /// # Errors
    /// Returns an error if the output directory cannot be created or written
    fn persist(&self, model: &ApplicationModel, output_dir: &Path) -> Result<PathBuf>;

    /// Loads the model persisted under `output_dir`
    ///
    /// # Errors
    /// Returns a `ModelLoadError` describing why the model cannot be reused
    fn load(&self, output_dir: &Path) -> std::result::Result<ApplicationModel, ModelLoadError>;
}
