use crate::resolution::domain::{ArtifactCoords, ArtifactDescriptor, CollectRequest, DependencyNode};
use crate::resolution::services::DependencyCollector;
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// A located artifact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coords: ArtifactCoords,
    pub path: PathBuf,
    /// True when the artifact is a module of the project workspace
    pub workspace_module: bool,
}

/// ArtifactResolver port for locating artifacts and their descriptors
///
/// This port abstracts the repository system: workspace modules first, then
/// the local repository, then remote repositories in declaration order.
pub trait ArtifactResolver {
    /// Locates the file of an artifact
    ///
    /// # Arguments
    /// * `coords` - Coordinates of the artifact
    ///
    /// # Returns
    /// The artifact path and whether it came from the workspace
    ///
    /// # Errors
    /// Returns an error if:
    /// - The artifact is in none of the configured repositories
    /// - A remote repository cannot be reached
    fn resolve(&self, coords: &ArtifactCoords) -> Result<ResolvedArtifact>;

    /// Reads the declared and managed dependencies of an artifact
    ///
    /// # Errors
    /// Returns an error if the descriptor cannot be located or parsed, or a
    /// version cannot be interpolated
    fn read_descriptor(&self, coords: &ArtifactCoords) -> Result<ArtifactDescriptor>;

    /// Collects the raw dependency tree of a request
    ///
    /// # Errors
    /// Returns an error if any descriptor in the tree cannot be read
    fn collect_dependencies(&self, request: &CollectRequest) -> Result<DependencyNode> {
        DependencyCollector::collect(request, |coords| self.read_descriptor(coords))
    }

    /// Installs an artifact file into the local repository
    ///
    /// # Arguments
    /// * `coords` - Coordinates to install under
    /// * `file` - The artifact file
    ///
    /// # Returns
    /// The installed path
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the repository written
    fn install(&self, coords: &ArtifactCoords, file: &Path) -> Result<PathBuf>;
}
