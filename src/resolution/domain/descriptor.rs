use crate::resolution::domain::{ArtifactCoords, ArtifactPattern, Dependency};
use crate::resolution::policies::DependencySelector;

/// What an artifact declares about its own dependencies, after parent
/// inheritance, property interpolation and BOM import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
}

impl ArtifactDescriptor {
    pub fn new(dependencies: Vec<Dependency>, managed_dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            managed_dependencies,
        }
    }
}

/// Input of a dependency tree collection.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// Artifact at the root of the tree
    pub root: ArtifactCoords,
    /// Direct dependencies; when `None` they are read from the root's descriptor
    pub root_dependencies: Option<Vec<Dependency>>,
    /// Versions pinned for transitive dependencies
    pub managed_dependencies: Vec<Dependency>,
    /// Exclusions applied to the whole tree
    pub exclusions: Vec<ArtifactPattern>,
    pub selector: DependencySelector,
    /// Depth of the root in the graph the tree will join; 0 for an application
    pub root_depth: usize,
}

impl CollectRequest {
    pub fn for_artifact(root: ArtifactCoords, selector: DependencySelector) -> Self {
        Self {
            root,
            root_dependencies: None,
            managed_dependencies: Vec::new(),
            exclusions: Vec::new(),
            selector,
            root_depth: 0,
        }
    }

    pub fn for_dependencies(
        root: ArtifactCoords,
        dependencies: Vec<Dependency>,
        selector: DependencySelector,
    ) -> Self {
        Self {
            root,
            root_dependencies: Some(dependencies),
            managed_dependencies: Vec::new(),
            exclusions: Vec::new(),
            selector,
            root_depth: 0,
        }
    }

    /// Tree of `root` as a dependency of the application: its own
    /// dependencies are transitive, so managed versions and transitive
    /// selection rules apply to them.
    pub fn for_dependency(root: ArtifactCoords, selector: DependencySelector) -> Self {
        Self {
            root_depth: 1,
            ..Self::for_artifact(root, selector)
        }
    }

    pub fn with_managed(mut self, managed: Vec<Dependency>) -> Self {
        self.managed_dependencies = managed;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<ArtifactPattern>) -> Self {
        self.exclusions = exclusions;
        self
    }
}
