use super::http_transport::HttpTransport;
use super::interpolation::{has_unresolved, interpolate};
use super::pom_parser::{parse_pom, RawDependency, RawPom};
use super::workspace::Workspace;
use crate::ports::outbound::{
    ArtifactResolver, ProjectDescriptor, ProjectDescriptorReader, ResolvedArtifact,
};
use crate::resolution::domain::{
    ArtifactCoords, ArtifactDescriptor, ArtifactKey, ArtifactPattern, Dependency, Scope,
};
use crate::shared::error::CuratorError;
use crate::shared::security::{read_bounded_to_string, validate_not_symlink, MAX_FILE_SIZE};
use crate::shared::Result;
use anyhow::Context;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Parent and BOM import chains longer than this are treated as cycles
const MAX_POM_DEPTH: usize = 32;

/// A remote Maven repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn maven_central() -> Self {
        Self {
            id: "central".to_string(),
            url: "https://repo.maven.apache.org/maven2".to_string(),
        }
    }
}

/// A POM after parent inheritance, interpolation and BOM import
#[derive(Debug, Clone)]
struct EffectivePom {
    coords: ArtifactCoords,
    packaging: String,
    properties: HashMap<String, String>,
    dependencies: Vec<Dependency>,
    managed_dependencies: Vec<Dependency>,
}

/// MavenRepository adapter resolving artifacts from the workspace, the local
/// repository and remote repositories, in that order.
///
/// Downloads are stored in the local repository. POMs and descriptors are
/// cached for the lifetime of the instance.
pub struct MavenRepository {
    local_repository: PathBuf,
    remote_repositories: Vec<RemoteRepository>,
    transport: Option<HttpTransport>,
    workspace: Workspace,
    poms: RefCell<HashMap<ArtifactCoords, Rc<EffectivePom>>>,
    descriptors: RefCell<HashMap<ArtifactCoords, ArtifactDescriptor>>,
}

impl MavenRepository {
    /// Creates a repository.
    ///
    /// # Arguments
    /// * `local_repository` - Local repository root
    /// * `remote_repositories` - Searched in order on a local miss
    /// * `transport` - `None` for offline operation
    /// * `workspace` - Modules served from the project build
    pub fn new(
        local_repository: PathBuf,
        remote_repositories: Vec<RemoteRepository>,
        transport: Option<HttpTransport>,
        workspace: Workspace,
    ) -> Self {
        Self {
            local_repository,
            remote_repositories,
            transport,
            workspace,
            poms: RefCell::new(HashMap::new()),
            descriptors: RefCell::new(HashMap::new()),
        }
    }

    /// Offline repository with no remotes
    pub fn offline(local_repository: PathBuf, workspace: Workspace) -> Self {
        Self::new(local_repository, Vec::new(), None, workspace)
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn locate(&self, coords: &ArtifactCoords) -> Result<ResolvedArtifact> {
        if let Some(module) = self.workspace.module(coords) {
            let path = if coords.artifact_type() == "pom" {
                module.pom.clone()
            } else {
                module.output_path.clone()
            };
            debug!(artifact = %coords, path = %path.display(), "resolved from workspace");
            return Ok(ResolvedArtifact {
                coords: coords.clone(),
                path,
                workspace_module: true,
            });
        }

        let relative = coords.repository_path();
        let local_path = self.local_repository.join(&relative);
        if local_path.exists() {
            return Ok(ResolvedArtifact {
                coords: coords.clone(),
                path: local_path,
                workspace_module: false,
            });
        }

        let mut searched = vec![self.local_repository.display().to_string()];
        if let Some(transport) = &self.transport {
            let relative_url = relative
                .iter()
                .map(|s| s.to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            for remote in &self.remote_repositories {
                let url = format!("{}/{}", remote.url.trim_end_matches('/'), relative_url);
                searched.push(remote.url.clone());
                if let Some(body) = transport.fetch(&url)? {
                    info!(artifact = %coords, repository = remote.id.as_str(), "downloaded");
                    write_atomically(&local_path, &body)?;
                    return Ok(ResolvedArtifact {
                        coords: coords.clone(),
                        path: local_path,
                        workspace_module: false,
                    });
                }
            }
        } else {
            searched.push("(offline)".to_string());
        }

        Err(CuratorError::ArtifactNotFound {
            coords: coords.to_string(),
            searched: searched.join(", "),
        }
        .into())
    }

    /// Effective POM of an artifact, from the cache when already built.
    fn effective_pom(&self, coords: &ArtifactCoords, depth: usize) -> Result<Rc<EffectivePom>> {
        let pom_coords = coords.to_pom()?;
        if let Some(pom) = self.poms.borrow().get(&pom_coords) {
            return Ok(Rc::clone(pom));
        }
        if depth > MAX_POM_DEPTH {
            anyhow::bail!(
                "POM inheritance or import chain of {} is deeper than {}",
                coords,
                MAX_POM_DEPTH
            );
        }

        let located = self.locate(&pom_coords)?;
        let content = read_bounded_to_string(&located.path, "pom", MAX_FILE_SIZE)?;
        let raw = parse_pom(&content).map_err(|e| CuratorError::DescriptorParse {
            coords: pom_coords.to_string(),
            details: format!("{:#}", e),
        })?;
        let base_dir = if located.workspace_module {
            located.path.parent().map(Path::to_path_buf)
        } else {
            None
        };
        let pom = Rc::new(self.build_effective_pom(raw, base_dir.as_deref(), depth)?);
        self.poms
            .borrow_mut()
            .insert(pom_coords, Rc::clone(&pom));
        Ok(pom)
    }

    fn parent_pom(
        &self,
        raw: &RawPom,
        base_dir: Option<&Path>,
        depth: usize,
    ) -> Result<Option<Rc<EffectivePom>>> {
        let Some(parent) = &raw.parent else {
            return Ok(None);
        };
        let parent_coords = ArtifactCoords::pom(&parent.group_id, &parent.artifact_id, &parent.version)
            .context("Invalid <parent> coordinates")?;

        if let Some(dir) = base_dir {
            let relative = parent.relative_path.as_deref().unwrap_or("../pom.xml");
            if !relative.is_empty() {
                let mut candidate = dir.join(relative);
                if candidate.is_dir() {
                    candidate = candidate.join("pom.xml");
                }
                if candidate.is_file() {
                    let content = read_bounded_to_string(&candidate, "parent pom.xml", MAX_FILE_SIZE)?;
                    let parent_raw = parse_pom(&content)?;
                    let matches = parent_raw.artifact_id.as_deref() == Some(parent.artifact_id.as_str())
                        && parent_raw.effective_group_id() == Some(parent.group_id.as_str());
                    if matches {
                        let parent_dir = candidate.parent().map(Path::to_path_buf);
                        let pom = self.build_effective_pom(parent_raw, parent_dir.as_deref(), depth + 1)?;
                        return Ok(Some(Rc::new(pom)));
                    }
                }
            }
        }
        self.effective_pom(&parent_coords, depth + 1).map(Some)
    }

    fn build_effective_pom(
        &self,
        raw: RawPom,
        base_dir: Option<&Path>,
        depth: usize,
    ) -> Result<EffectivePom> {
        let parent = self.parent_pom(&raw, base_dir, depth)?;

        let mut properties: HashMap<String, String> = parent
            .as_ref()
            .map(|p| p.properties.clone())
            .unwrap_or_default();
        for (key, value) in &raw.properties {
            properties.insert(key.clone(), value.clone());
        }

        let group_id = raw
            .effective_group_id()
            .ok_or_else(|| anyhow::anyhow!("POM has no groupId"))?
            .to_string();
        let artifact_id = raw
            .artifact_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("POM has no artifactId"))?;
        let version = raw
            .effective_version()
            .ok_or_else(|| anyhow::anyhow!("POM of {}:{} has no version", group_id, artifact_id))?
            .to_string();

        if let Some(p) = &raw.parent {
            properties.insert("project.parent.groupId".to_string(), p.group_id.clone());
            properties.insert("project.parent.artifactId".to_string(), p.artifact_id.clone());
            properties.insert("project.parent.version".to_string(), p.version.clone());
        }
        let group_id = interpolate(&group_id, &properties);
        let version = interpolate(&version, &properties);
        for (key, value) in [
            ("project.groupId", &group_id),
            ("pom.groupId", &group_id),
            ("project.artifactId", &artifact_id),
            ("project.version", &version),
            ("pom.version", &version),
            ("version", &version),
        ] {
            properties.insert(key.to_string(), value.clone());
        }

        let coords = ArtifactCoords::pom(&group_id, &artifact_id, &version)?;
        let packaging = raw.packaging.clone().unwrap_or_else(|| "jar".to_string());

        let mut managed_dependencies = Vec::new();
        let mut imports = Vec::new();
        for entry in &raw.managed_dependencies {
            let dependency = to_dependency(&coords, entry, &properties, None)?;
            if dependency.scope() == Scope::Import && dependency.coords().artifact_type() == "pom" {
                imports.push(dependency);
            } else {
                managed_dependencies.push(dependency);
            }
        }
        if let Some(p) = &parent {
            managed_dependencies.extend(p.managed_dependencies.iter().cloned());
        }
        for bom in imports {
            let imported = self
                .effective_pom(bom.coords(), depth + 1)
                .with_context(|| format!("Failed to import BOM {} into {}", bom.coords(), coords))?;
            managed_dependencies.extend(imported.managed_dependencies.iter().cloned());
        }

        let managed_by_key: HashMap<&ArtifactKey, &Dependency> = managed_dependencies
            .iter()
            .rev()
            .map(|d| (d.key(), d))
            .collect();

        let mut dependencies: Vec<Dependency> = Vec::new();
        for entry in &raw.dependencies {
            dependencies.push(to_dependency(&coords, entry, &properties, Some(&managed_by_key))?);
        }
        if let Some(p) = &parent {
            let inherited: Vec<Dependency> = p
                .dependencies
                .iter()
                .filter(|d| !dependencies.iter().any(|own| own.key() == d.key()))
                .cloned()
                .collect();
            dependencies.splice(0..0, inherited);
        }

        Ok(EffectivePom {
            coords,
            packaging,
            properties,
            dependencies,
            managed_dependencies,
        })
    }
}

/// Converts a raw `<dependency>`, filling the version (and a missing scope)
/// from dependency management when `managed` is given.
fn to_dependency(
    owner: &ArtifactCoords,
    raw: &RawDependency,
    properties: &HashMap<String, String>,
    managed: Option<&HashMap<&ArtifactKey, &Dependency>>,
) -> Result<Dependency> {
    let descriptor_error = |details: String| CuratorError::DescriptorParse {
        coords: owner.to_string(),
        details,
    };

    let group_id = interpolate(&raw.group_id, properties);
    let artifact_id = interpolate(&raw.artifact_id, properties);
    let classifier = raw
        .classifier
        .as_deref()
        .map(|c| interpolate(c, properties))
        .unwrap_or_default();
    let dependency_type = raw
        .dependency_type
        .as_deref()
        .map(|t| interpolate(t, properties))
        .unwrap_or_else(|| "jar".to_string());
    let key = ArtifactKey::new(
        group_id.clone(),
        artifact_id.clone(),
        classifier.clone(),
        dependency_type.clone(),
    );
    let pinned = managed.and_then(|m| m.get(&key).copied());

    let version = match raw.version.as_deref() {
        Some(v) => interpolate(v, properties),
        None => match pinned {
            Some(p) => p.coords().version().to_string(),
            None => {
                return Err(descriptor_error(format!(
                    "no version for dependency {}:{}",
                    group_id, artifact_id
                ))
                .into())
            }
        },
    };
    if has_unresolved(&version) || has_unresolved(&group_id) || has_unresolved(&artifact_id) {
        return Err(descriptor_error(format!(
            "unresolved property in dependency {}:{}:{}",
            group_id, artifact_id, version
        ))
        .into());
    }

    let scope = match raw.scope.as_deref() {
        Some(s) => interpolate(s, properties).parse()?,
        None => pinned.map(|p| p.scope()).unwrap_or_default(),
    };
    let optional = raw
        .optional
        .as_deref()
        .map(|o| interpolate(o, properties).trim() == "true")
        .unwrap_or(false);

    let coords = ArtifactCoords::new(&group_id, &artifact_id, &classifier, &dependency_type, &version)
        .map_err(|e| descriptor_error(format!("{:#}", e)))?;

    let mut exclusions: Vec<ArtifactPattern> = raw
        .exclusions
        .iter()
        .map(|(g, a)| {
            format!("{}:{}", interpolate(g, properties), interpolate(a, properties)).parse()
        })
        .collect::<Result<_>>()?;
    if let Some(p) = pinned {
        for pattern in p.exclusions() {
            if !exclusions.contains(pattern) {
                exclusions.push(pattern.clone());
            }
        }
    }

    Ok(Dependency::new(coords, scope)
        .optional(optional)
        .with_exclusions(exclusions))
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", path.display()))?;
    fs::create_dir_all(dir).map_err(|e| CuratorError::FileWriteError {
        path: dir.to_path_buf(),
        details: e.to_string(),
    })?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.persist(path).map_err(|e| CuratorError::FileWriteError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(())
}

fn minimal_pom(coords: &ArtifactCoords) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  \
         <modelVersion>4.0.0</modelVersion>\n  \
         <groupId>{}</groupId>\n  \
         <artifactId>{}</artifactId>\n  \
         <version>{}</version>\n  \
         <packaging>{}</packaging>\n\
         </project>\n",
        coords.group_id(),
        coords.artifact_id(),
        coords.version(),
        coords.artifact_type()
    )
}

impl ArtifactResolver for MavenRepository {
    fn resolve(&self, coords: &ArtifactCoords) -> Result<ResolvedArtifact> {
        self.locate(coords)
    }

    fn read_descriptor(&self, coords: &ArtifactCoords) -> Result<ArtifactDescriptor> {
        if let Some(descriptor) = self.descriptors.borrow().get(coords) {
            return Ok(descriptor.clone());
        }
        let descriptor = match self.effective_pom(coords, 0) {
            Ok(pom) => ArtifactDescriptor::new(
                pom.dependencies.clone(),
                pom.managed_dependencies.clone(),
            ),
            Err(e)
                if matches!(
                    e.downcast_ref::<CuratorError>(),
                    Some(CuratorError::ArtifactNotFound { .. })
                ) && self.locate(coords).is_ok() =>
            {
                warn!(artifact = %coords, "POM is missing, no dependency information available");
                ArtifactDescriptor::default()
            }
            Err(e) => return Err(e),
        };
        self.descriptors
            .borrow_mut()
            .insert(coords.clone(), descriptor.clone());
        Ok(descriptor)
    }

    fn install(&self, coords: &ArtifactCoords, file: &Path) -> Result<PathBuf> {
        validate_not_symlink(file, "install")?;
        let content = fs::read(file).map_err(|e| CuratorError::FileReadError {
            path: file.to_path_buf(),
            details: e.to_string(),
        })?;
        let target = self.local_repository.join(coords.repository_path());
        write_atomically(&target, &content)?;

        if coords.is_jar() && coords.classifier().is_empty() {
            let pom_path = self.local_repository.join(coords.to_pom()?.repository_path());
            if !pom_path.exists() {
                write_atomically(&pom_path, minimal_pom(coords).as_bytes())?;
            }
        }
        self.descriptors.borrow_mut().remove(coords);
        info!(artifact = %coords, path = %target.display(), "installed");
        Ok(target)
    }
}

impl ProjectDescriptorReader for MavenRepository {
    fn read_project(&self, project_path: &Path) -> Result<ProjectDescriptor> {
        if !project_path.is_dir() {
            return Err(CuratorError::InvalidProjectPath {
                path: project_path.to_path_buf(),
                reason: "Directory does not exist".to_string(),
            }
            .into());
        }
        let pom_path = project_path.join("pom.xml");
        if !pom_path.is_file() {
            return Err(CuratorError::InvalidProjectPath {
                path: project_path.to_path_buf(),
                reason: "No pom.xml found".to_string(),
            }
            .into());
        }

        let content = read_bounded_to_string(&pom_path, "pom.xml", MAX_FILE_SIZE)?;
        let raw = parse_pom(&content).map_err(|e| CuratorError::DescriptorParse {
            coords: pom_path.display().to_string(),
            details: format!("{:#}", e),
        })?;
        let pom = self.build_effective_pom(raw, Some(project_path), 0)?;

        let artifact_type = match pom.packaging.as_str() {
            "pom" => "pom",
            _ => "jar",
        };
        let coords = ArtifactCoords::new(
            pom.coords.group_id(),
            pom.coords.artifact_id(),
            "",
            artifact_type,
            pom.coords.version(),
        )?;
        debug!(
            project = %coords,
            dependencies = pom.dependencies.len(),
            managed = pom.managed_dependencies.len(),
            properties = pom.properties.len(),
            "project descriptor read"
        );

        Ok(ProjectDescriptor {
            coords,
            dependencies: pom.dependencies,
            managed_dependencies: pom.managed_dependencies,
            path: pom_path,
            content,
        })
    }
}
