use app_curator::ports::outbound::{ProjectDescriptor, ResolvedArtifact};
use app_curator::prelude::*;
use app_curator::resolution::domain::ArtifactDescriptor;
use app_curator::shared::error::CuratorError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory artifact repository
///
/// Descriptors are declared up front. Artifact files live under `root` in the
/// Maven layout and are only created by [`InMemoryArtifactResolver::materialize`].
#[derive(Clone)]
pub struct InMemoryArtifactResolver {
    root: PathBuf,
    project: Option<ProjectDescriptor>,
    descriptors: HashMap<ArtifactCoords, ArtifactDescriptor>,
    pub descriptor_reads: Arc<Mutex<usize>>,
}

impl InMemoryArtifactResolver {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            project: None,
            descriptors: HashMap::new(),
            descriptor_reads: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_project(mut self, coords: &str, dependencies: Vec<Dependency>) -> Self {
        self.project = Some(ProjectDescriptor {
            coords: coords.parse().unwrap(),
            dependencies,
            managed_dependencies: Vec::new(),
            path: self.root.join("project").join("pom.xml"),
            content: format!("<project>{}</project>", coords),
        });
        self
    }

    pub fn with_artifact(mut self, coords: &str, dependencies: Vec<Dependency>) -> Self {
        self.descriptors.insert(
            coords.parse().unwrap(),
            ArtifactDescriptor::new(dependencies, Vec::new()),
        );
        self
    }

    pub fn path_of(&self, coords: &ArtifactCoords) -> PathBuf {
        self.root.join(coords.repository_path())
    }

    /// Writes an empty file for every declared artifact.
    pub fn materialize(&self) {
        for coords in self.descriptors.keys() {
            let path = self.path_of(coords);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"").unwrap();
        }
    }

    pub fn reads(&self) -> usize {
        *self.descriptor_reads.lock().unwrap()
    }
}

impl ArtifactResolver for InMemoryArtifactResolver {
    fn resolve(&self, coords: &ArtifactCoords) -> Result<ResolvedArtifact> {
        Ok(ResolvedArtifact {
            coords: coords.clone(),
            path: self.path_of(coords),
            workspace_module: false,
        })
    }

    fn read_descriptor(&self, coords: &ArtifactCoords) -> Result<ArtifactDescriptor> {
        *self.descriptor_reads.lock().unwrap() += 1;
        self.descriptors.get(coords).cloned().ok_or_else(|| {
            CuratorError::ArtifactNotFound {
                coords: coords.to_string(),
                searched: "in-memory".to_string(),
            }
            .into()
        })
    }

    fn install(&self, coords: &ArtifactCoords, file: &Path) -> Result<PathBuf> {
        let target = self.path_of(coords);
        fs::create_dir_all(target.parent().unwrap())?;
        fs::copy(file, &target)?;
        Ok(target)
    }
}

impl ProjectDescriptorReader for InMemoryArtifactResolver {
    fn read_project(&self, _project_path: &Path) -> Result<ProjectDescriptor> {
        self.project
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no project declared"))
    }
}
