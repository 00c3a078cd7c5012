use crate::resolution::domain::{ArtifactCoords, ArtifactKey, DependencyFlags, Scope};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A dependency of the application after resolution: one per artifact key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    coords: ArtifactCoords,
    scope: Scope,
    #[serde(default)]
    paths: Vec<PathBuf>,
    flags: DependencyFlags,
    /// Direct dependencies of this artifact that survived resolution
    #[serde(default)]
    dependencies: Vec<ArtifactCoords>,
}

impl ResolvedDependency {
    pub fn new(coords: ArtifactCoords, scope: Scope) -> Self {
        Self {
            coords,
            scope,
            paths: Vec::new(),
            flags: DependencyFlags::NONE,
            dependencies: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: DependencyFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.paths.push(path);
        self
    }

    pub fn coords(&self) -> &ArtifactCoords {
        &self.coords
    }

    pub fn key(&self) -> &ArtifactKey {
        self.coords.key()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn flags(&self) -> DependencyFlags {
        self.flags
    }

    pub fn dependencies(&self) -> &[ArtifactCoords] {
        &self.dependencies
    }

    pub fn is_flag_set(&self, flag: DependencyFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_runtime_cp(&self) -> bool {
        self.is_flag_set(DependencyFlags::RUNTIME_CP)
    }

    pub fn is_deployment_cp(&self) -> bool {
        self.is_flag_set(DependencyFlags::DEPLOYMENT_CP)
    }

    pub fn is_runtime_extension(&self) -> bool {
        self.is_flag_set(DependencyFlags::RUNTIME_EXTENSION_ARTIFACT)
    }

    pub fn is_reloadable(&self) -> bool {
        self.is_flag_set(DependencyFlags::RELOADABLE)
    }

    pub fn set_flags(&mut self, flags: DependencyFlags) {
        self.flags.set(flags);
    }

    pub fn clear_flags(&mut self, flags: DependencyFlags) {
        self.flags.clear(flags);
    }

    pub fn set_paths(&mut self, paths: Vec<PathBuf>) {
        self.paths = paths;
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<ArtifactCoords>) {
        self.dependencies = dependencies;
    }
}
