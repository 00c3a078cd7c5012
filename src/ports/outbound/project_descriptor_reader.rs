use crate::resolution::domain::{ArtifactCoords, Dependency};
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// The application project as declared in its descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub coords: ArtifactCoords,
    pub dependencies: Vec<Dependency>,
    /// Managed dependencies, with imported BOMs expanded
    pub managed_dependencies: Vec<Dependency>,
    /// Location of the project descriptor file
    pub path: PathBuf,
    /// Raw descriptor content, used to fingerprint the resolution inputs
    pub content: String,
}

/// ProjectDescriptorReader port for reading the application project
pub trait ProjectDescriptorReader {
    /// Reads the project descriptor in `project_path`
    ///
    /// # Arguments
    /// * `project_path` - Path to the project directory containing pom.xml
    ///
    /// # Errors
    /// Returns an error if:
    /// - The directory has no pom.xml
    /// - The descriptor cannot be parsed or its parents resolved
    fn read_project(&self, project_path: &Path) -> Result<ProjectDescriptor>;
}
