use super::interpolation::{has_unresolved, interpolate};
use super::pom_parser::{parse_pom, RawPom};
use crate::resolution::domain::ArtifactCoords;
use crate::shared::security::{read_bounded_to_string, MAX_FILE_SIZE};
use crate::shared::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Nesting limit when walking `<modules>`
const MAX_MODULE_DEPTH: usize = 16;

/// A project module whose artifact is built locally instead of coming from a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceModule {
    pub coords: ArtifactCoords,
    /// Classes directory or built jar
    pub output_path: PathBuf,
    pub pom: PathBuf,
}

/// Modules of the project workspace, matched by group, artifact and version.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    modules: Vec<WorkspaceModule>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, replacing one with the same coordinates.
    pub fn add(&mut self, module: WorkspaceModule) {
        self.modules.retain(|m| {
            !(m.coords.group_id() == module.coords.group_id()
                && m.coords.artifact_id() == module.coords.artifact_id())
        });
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[WorkspaceModule] {
        &self.modules
    }

    /// The module providing `coords`, if any. Classified artifacts other than
    /// the main jar and the POM are never served from the workspace.
    pub fn module(&self, coords: &ArtifactCoords) -> Option<&WorkspaceModule> {
        if !coords.classifier().is_empty() {
            return None;
        }
        self.modules.iter().find(|m| {
            m.coords.group_id() == coords.group_id()
                && m.coords.artifact_id() == coords.artifact_id()
                && m.coords.version() == coords.version()
        })
    }

    /// Discovers the modules of the multi-module build containing `project_dir`.
    ///
    /// The build root is found by climbing parent directories for as long as
    /// their pom.xml lists the directory below as a module.
    pub fn discover(project_dir: &Path) -> Result<Self> {
        let mut root = project_dir.to_path_buf();
        while let Some(parent_dir) = root.parent() {
            let parent_pom = parent_dir.join("pom.xml");
            if !parent_pom.is_file() {
                break;
            }
            let Ok(raw) = read_raw(&parent_pom) else {
                break;
            };
            let lists_root = raw
                .modules
                .iter()
                .any(|m| same_dir(&parent_dir.join(m), &root));
            if !lists_root {
                break;
            }
            root = parent_dir.to_path_buf();
        }

        let mut workspace = Self::new();
        workspace.walk(&root, &HashMap::new(), 0)?;
        debug!(
            root = %root.display(),
            modules = workspace.modules.len(),
            "workspace discovered"
        );
        Ok(workspace)
    }

    fn walk(&mut self, dir: &Path, inherited: &HashMap<String, String>, depth: usize) -> Result<()> {
        if depth > MAX_MODULE_DEPTH {
            warn!(dir = %dir.display(), "module nesting too deep, not descending further");
            return Ok(());
        }
        let pom_path = dir.join("pom.xml");
        if !pom_path.is_file() {
            return Ok(());
        }
        let raw = read_raw(&pom_path)?;

        let mut properties = inherited.clone();
        for (k, v) in &raw.properties {
            properties.insert(k.clone(), v.clone());
        }
        let group_id = raw.effective_group_id().map(|g| interpolate(g, &properties));
        let version = raw.effective_version().map(|v| interpolate(v, &properties));

        match (group_id, raw.artifact_id.as_deref(), version) {
            (Some(g), Some(a), Some(v)) if !has_unresolved(&g) && !has_unresolved(&v) => {
                if raw.packaging.as_deref() != Some("pom") {
                    match ArtifactCoords::jar(&g, a, &v) {
                        Ok(coords) => self.add(WorkspaceModule {
                            coords,
                            output_path: dir.join("target").join("classes"),
                            pom: pom_path.clone(),
                        }),
                        Err(e) => warn!(pom = %pom_path.display(), error = %e, "skipping module"),
                    }
                }
                properties.insert("project.version".to_string(), v);
            }
            _ => debug!(pom = %pom_path.display(), "module coordinates not resolvable"),
        }

        for module in &raw.modules {
            self.walk(&dir.join(module), &properties, depth + 1)?;
        }
        Ok(())
    }
}

fn read_raw(pom: &Path) -> Result<RawPom> {
    let content = read_bounded_to_string(pom, "pom.xml", MAX_FILE_SIZE)?;
    parse_pom(&content)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
