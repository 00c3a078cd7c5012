use crate::resolution::domain::{
    ArtifactKey, ArtifactPattern, DependencyFlags, ExtensionCapabilities, ExtensionDescriptor,
    PlatformImports, ResolutionMode, ResolvedDependency,
};
use crate::shared::Properties;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::debug;

/// Build-system property recording the mode a model was resolved for
pub const MODE_PROPERTY: &str = "quarkus.app-model.mode";

/// The resolved application: what goes on the runtime classpath, what only the
/// build (deployment) classpath sees, and how each artifact is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationModel {
    app_artifact: ResolvedDependency,
    mode: ResolutionMode,
    dependencies: Vec<ResolvedDependency>,
    #[serde(default)]
    parent_first: BTreeSet<ArtifactKey>,
    #[serde(default)]
    runner_parent_first: BTreeSet<ArtifactKey>,
    #[serde(default)]
    lesser_priority: BTreeSet<ArtifactKey>,
    #[serde(default)]
    excluded_artifacts: Vec<ArtifactPattern>,
    #[serde(default)]
    reloadable_workspace_modules: BTreeSet<ArtifactKey>,
    #[serde(default)]
    platform_imports: PlatformImports,
    #[serde(default)]
    extension_capabilities: Vec<ExtensionCapabilities>,
    fingerprint: String,
}

impl ApplicationModel {
    pub fn app_artifact(&self) -> &ResolvedDependency {
        &self.app_artifact
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// All dependencies in resolution order
    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.dependencies
    }

    pub fn dependency(&self, key: &ArtifactKey) -> Option<&ResolvedDependency> {
        self.dependencies.iter().find(|d| d.key() == key)
    }

    /// Dependencies carrying every flag in `flags`
    pub fn dependencies_with_flags(
        &self,
        flags: DependencyFlags,
    ) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.iter().filter(move |d| d.is_flag_set(flags))
    }

    pub fn runtime_dependencies(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies_with_flags(DependencyFlags::RUNTIME_CP)
    }

    pub fn deployment_only_dependencies(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies
            .iter()
            .filter(|d| d.is_deployment_cp() && !d.is_runtime_cp())
    }

    pub fn compile_only_dependencies(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies_with_flags(DependencyFlags::COMPILE_ONLY)
    }

    pub fn runtime_extensions(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies_with_flags(DependencyFlags::RUNTIME_EXTENSION_ARTIFACT)
    }

    pub fn parent_first(&self) -> &BTreeSet<ArtifactKey> {
        &self.parent_first
    }

    pub fn runner_parent_first(&self) -> &BTreeSet<ArtifactKey> {
        &self.runner_parent_first
    }

    pub fn lesser_priority(&self) -> &BTreeSet<ArtifactKey> {
        &self.lesser_priority
    }

    pub fn excluded_artifacts(&self) -> &[ArtifactPattern] {
        &self.excluded_artifacts
    }

    pub fn reloadable_workspace_modules(&self) -> &BTreeSet<ArtifactKey> {
        &self.reloadable_workspace_modules
    }

    pub fn platform_imports(&self) -> &PlatformImports {
        &self.platform_imports
    }

    pub fn extension_capabilities(&self) -> &[ExtensionCapabilities] {
        &self.extension_capabilities
    }

    /// sha-256 of the inputs this model was resolved from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Resolved paths that no longer exist on disk.
    pub fn missing_paths(&self) -> Vec<&Path> {
        std::iter::once(&self.app_artifact)
            .chain(self.dependencies.iter())
            .flat_map(|d| d.paths())
            .map(|p| p.as_path())
            .filter(|p| !p.exists())
            .collect()
    }

    /// Properties persisted next to the model for the build system.
    pub fn build_system_properties(&self) -> Properties {
        let mut props: Properties = self
            .platform_imports
            .platform_properties()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for platform in self.platform_imports.platforms() {
            for stream in platform.streams() {
                for release in stream.releases() {
                    props.insert(release.property_name(), release.property_value());
                }
            }
        }
        props.insert(MODE_PROPERTY, self.mode.as_str());
        props
    }
}

/// Accumulates dependencies and classification data while the model is resolved.
///
/// Dependencies are kept in insertion order and are unique by key. Descriptor
/// lists (parent-first, excluded artifacts, ...) are merged as extensions are
/// discovered and applied as flags in [`ApplicationModelBuilder::build`].
#[derive(Debug, Clone)]
pub struct ApplicationModelBuilder {
    app_artifact: ResolvedDependency,
    mode: ResolutionMode,
    dependencies: Vec<ResolvedDependency>,
    index: HashMap<ArtifactKey, usize>,
    parent_first: BTreeSet<ArtifactKey>,
    runner_parent_first: BTreeSet<ArtifactKey>,
    lesser_priority: BTreeSet<ArtifactKey>,
    excluded_artifacts: Vec<ArtifactPattern>,
    platform_imports: PlatformImports,
    extension_capabilities: Vec<ExtensionCapabilities>,
    fingerprint: String,
}

impl ApplicationModelBuilder {
    pub fn new(app_artifact: ResolvedDependency, mode: ResolutionMode) -> Self {
        Self {
            app_artifact,
            mode,
            dependencies: Vec::new(),
            index: HashMap::new(),
            parent_first: BTreeSet::new(),
            runner_parent_first: BTreeSet::new(),
            lesser_priority: BTreeSet::new(),
            excluded_artifacts: Vec::new(),
            platform_imports: PlatformImports::new(),
            extension_capabilities: Vec::new(),
            fingerprint: String::new(),
        }
    }

    pub fn app_artifact(&self) -> &ResolvedDependency {
        &self.app_artifact
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Adds a dependency, or merges its flags into the one already recorded
    /// under the same key.
    pub fn add_dependency(&mut self, dependency: ResolvedDependency) {
        match self.index.get(dependency.key()) {
            Some(&i) => self.dependencies[i].set_flags(dependency.flags()),
            None => {
                self.index
                    .insert(dependency.key().clone(), self.dependencies.len());
                self.dependencies.push(dependency);
            }
        }
    }

    pub fn dependency(&self, key: &ArtifactKey) -> Option<&ResolvedDependency> {
        self.index.get(key).map(|&i| &self.dependencies[i])
    }

    pub fn dependency_mut(&mut self, key: &ArtifactKey) -> Option<&mut ResolvedDependency> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.dependencies[i]),
            None => None,
        }
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.dependencies
    }

    /// Dependencies for in-place flag updates. Keys must not change.
    pub fn dependencies_mut(&mut self) -> &mut [ResolvedDependency] {
        &mut self.dependencies
    }

    /// Merges the classloading lists, exclusions and capabilities of an extension.
    pub fn handle_extension_descriptor(&mut self, descriptor: &ExtensionDescriptor) {
        self.parent_first
            .extend(descriptor.parent_first_artifacts().iter().cloned());
        self.runner_parent_first
            .extend(descriptor.runner_parent_first_artifacts().iter().cloned());
        self.lesser_priority
            .extend(descriptor.lesser_priority_artifacts().iter().cloned());
        self.add_excluded_artifacts(descriptor.excluded_artifacts().iter().cloned());

        let capabilities = descriptor.capabilities();
        if !self
            .extension_capabilities
            .iter()
            .any(|c| c.extension == capabilities.extension)
        {
            self.extension_capabilities.push(capabilities);
        }
    }

    pub fn add_excluded_artifacts(&mut self, patterns: impl IntoIterator<Item = ArtifactPattern>) {
        for pattern in patterns {
            if !self.excluded_artifacts.contains(&pattern) {
                self.excluded_artifacts.push(pattern);
            }
        }
    }

    pub fn extension_capabilities(&self) -> &[ExtensionCapabilities] {
        &self.extension_capabilities
    }

    pub fn set_platform_imports(&mut self, platform_imports: PlatformImports) {
        self.platform_imports = platform_imports;
    }

    pub fn platform_imports(&self) -> &PlatformImports {
        &self.platform_imports
    }

    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.fingerprint = fingerprint.into();
    }

    /// Drops excluded artifacts, applies classification flags and freezes the model.
    pub fn build(self) -> ApplicationModel {
        let Self {
            app_artifact,
            mode,
            dependencies,
            parent_first,
            runner_parent_first,
            lesser_priority,
            excluded_artifacts,
            platform_imports,
            extension_capabilities,
            fingerprint,
            ..
        } = self;

        let (kept, removed): (Vec<_>, Vec<_>) = dependencies
            .into_iter()
            .partition(|d| !excluded_artifacts.iter().any(|p| p.matches(d.coords())));
        for dep in &removed {
            debug!(artifact = %dep.coords(), "removing excluded artifact");
        }
        let removed_keys: BTreeSet<ArtifactKey> =
            removed.iter().map(|d| d.key().clone()).collect();

        let dependencies: Vec<ResolvedDependency> = kept
            .into_iter()
            .map(|mut dep| {
                if parent_first.contains(dep.key()) {
                    dep.set_flags(DependencyFlags::CLASSLOADER_PARENT_FIRST);
                }
                if runner_parent_first.contains(dep.key()) {
                    dep.set_flags(DependencyFlags::CLASSLOADER_RUNNER_PARENT_FIRST);
                }
                if lesser_priority.contains(dep.key()) {
                    dep.set_flags(DependencyFlags::CLASSLOADER_LESSER_PRIORITY);
                }
                if !removed_keys.is_empty() {
                    let direct = dep
                        .dependencies()
                        .iter()
                        .filter(|c| !removed_keys.contains(c.key()))
                        .cloned()
                        .collect();
                    dep.set_dependencies(direct);
                }
                dep
            })
            .collect();

        let reloadable_workspace_modules = dependencies
            .iter()
            .filter(|d| d.is_reloadable())
            .map(|d| d.key().clone())
            .collect();

        ApplicationModel {
            app_artifact,
            mode,
            dependencies,
            parent_first,
            runner_parent_first,
            lesser_priority,
            excluded_artifacts,
            reloadable_workspace_modules,
            platform_imports,
            extension_capabilities,
            fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::domain::{ArtifactCoords, Scope};

    fn dep(coords: &str, flags: DependencyFlags) -> ResolvedDependency {
        ResolvedDependency::new(coords.parse().unwrap(), Scope::Compile).with_flags(flags)
    }

    fn builder() -> ApplicationModelBuilder {
        let app: ArtifactCoords = "io.acme:app:1.0".parse().unwrap();
        ApplicationModelBuilder::new(ResolvedDependency::new(app, Scope::Compile), ResolutionMode::Prod)
    }

    #[test]
    fn test_add_dependency_merges_flags_by_key() {
        let mut b = builder();
        b.add_dependency(dep("io.acme:a:1", DependencyFlags::RUNTIME_CP));
        b.add_dependency(dep("io.acme:b:1", DependencyFlags::RUNTIME_CP));
        b.add_dependency(dep("io.acme:a:2", DependencyFlags::DIRECT));

        let model = b.build();
        assert_eq!(model.dependencies().len(), 2);
        let a = model.dependency(&ArtifactKey::ga("io.acme", "a")).unwrap();
        assert_eq!(a.coords().version(), "1");
        assert!(a.is_flag_set(DependencyFlags::RUNTIME_CP | DependencyFlags::DIRECT));
        assert_eq!(model.dependencies()[1].coords().artifact_id(), "b");
    }

    #[test]
    fn test_build_applies_classification_and_exclusions() {
        let mut b = builder();
        let props = Properties::parse(
            "deployment-artifact=io.acme:ext-deployment:1\nparent-first-artifacts=io.acme:boot\nlesser-priority-artifacts=io.acme:old\nexcluded-artifacts=io.acme:banned\n",
        )
        .unwrap();
        let descriptor =
            ExtensionDescriptor::from_properties(&"io.acme:ext:1".parse().unwrap(), &props).unwrap();
        b.handle_extension_descriptor(&descriptor);

        let mut ext = dep("io.acme:ext:1", DependencyFlags::RUNTIME_CP);
        ext.set_dependencies(vec![
            "io.acme:banned:1".parse().unwrap(),
            "io.acme:boot:1".parse().unwrap(),
        ]);
        b.add_dependency(ext);
        b.add_dependency(dep("io.acme:boot:1", DependencyFlags::RUNTIME_CP));
        b.add_dependency(dep("io.acme:banned:1", DependencyFlags::RUNTIME_CP));
        b.add_dependency(dep("io.acme:old:1", DependencyFlags::RUNTIME_CP));

        let model = b.build();
        assert!(model.dependency(&ArtifactKey::ga("io.acme", "banned")).is_none());
        assert!(model
            .dependency(&ArtifactKey::ga("io.acme", "boot"))
            .unwrap()
            .is_flag_set(DependencyFlags::CLASSLOADER_PARENT_FIRST));
        assert!(model
            .dependency(&ArtifactKey::ga("io.acme", "old"))
            .unwrap()
            .is_flag_set(DependencyFlags::CLASSLOADER_LESSER_PRIORITY));
        assert_eq!(
            model
                .dependency(&ArtifactKey::ga("io.acme", "ext"))
                .unwrap()
                .dependencies()
                .len(),
            1
        );
        assert_eq!(model.extension_capabilities().len(), 1);
    }

    #[test]
    fn test_classpath_queries() {
        let mut b = builder();
        b.add_dependency(dep(
            "io.acme:rt:1",
            DependencyFlags::RUNTIME_CP | DependencyFlags::DEPLOYMENT_CP,
        ));
        b.add_dependency(dep("io.acme:dep:1", DependencyFlags::DEPLOYMENT_CP));
        b.add_dependency(dep(
            "io.acme:mod:1",
            DependencyFlags::RUNTIME_CP
                | DependencyFlags::DEPLOYMENT_CP
                | DependencyFlags::WORKSPACE_MODULE
                | DependencyFlags::RELOADABLE,
        ));
        let model = b.build();

        assert_eq!(model.runtime_dependencies().count(), 2);
        let deployment_only: Vec<_> = model
            .deployment_only_dependencies()
            .map(|d| d.coords().artifact_id())
            .collect();
        assert_eq!(deployment_only, vec!["dep"]);
        assert!(model
            .reloadable_workspace_modules()
            .contains(&ArtifactKey::ga("io.acme", "mod")));
    }

    #[test]
    fn test_build_system_properties_include_mode_and_releases() {
        let mut b = builder();
        let mut imports = PlatformImports::new();
        imports
            .add_platform_release(
                "platform.release-info@io.playground$1.1#1",
                "io.playground:playground-bom::pom:1.1.1",
            )
            .unwrap();
        b.set_platform_imports(imports);
        let props = b.build().build_system_properties();
        assert_eq!(props.get(MODE_PROPERTY), Some("prod"));
        assert_eq!(
            props.get("platform.release-info@io.playground$1.1#1"),
            Some("io.playground:playground-bom::pom:1.1.1")
        );
    }
}
