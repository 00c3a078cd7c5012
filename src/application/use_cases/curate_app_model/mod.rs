use crate::application::dto::{CurationRequest, CurationResponse};
use crate::ports::inbound::AppModelPort;
use crate::ports::outbound::{
    ArtifactResolver, ExtensionDescriptorReader, ModelStore, ProgressReporter, ProjectDescriptor,
    ProjectDescriptorReader, ResolvedArtifact,
};
use crate::resolution::domain::platform::{
    PLATFORM_DESCRIPTOR_ARTIFACT_ID_SUFFIX, PLATFORM_PROPERTIES_ARTIFACT_ID_SUFFIX,
};
use crate::resolution::domain::{
    ApplicationModel, ApplicationModelBuilder, ArtifactCoords, ArtifactKey, ArtifactPattern,
    CollectRequest, Dependency, DependencyFlags, DependencyNode, ExtensionDescriptor,
    PlatformImports, ResolvedDependency, Scope,
};
use crate::resolution::policies::DependencySelector;
use crate::resolution::services::{
    ConflictResolver, DeploymentValidator, Fingerprint, ReloadableModules, ResolvedNode,
};
use crate::shared::error::{CuratorError, ValidationIssue};
use crate::shared::Result;
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// A conditional dependency waiting for its conditions to hold
#[derive(Debug, Clone)]
struct PendingConditional {
    coords: ArtifactCoords,
    /// Key of the extension declaring it
    declared_by: ArtifactKey,
    exclusions: Vec<ArtifactPattern>,
}

/// Runtime graph after conditional dependencies have settled
struct RuntimeGraph {
    tree: DependencyNode,
    nodes: Vec<ResolvedNode>,
}

/// Artifact files and extension descriptors looked up during one curation
#[derive(Default)]
struct Lookups {
    artifacts: HashMap<ArtifactCoords, ResolvedArtifact>,
    extensions: HashMap<ArtifactCoords, Option<ExtensionDescriptor>>,
}

/// CurateAppModelUseCase - builds the application model of a project
///
/// Resolves the runtime graph, activates conditional dependencies, injects
/// the deployment side of every extension, classifies and validates the
/// result and persists it for later runs.
///
/// # Type Parameters
/// * `R` - ArtifactResolver and ProjectDescriptorReader implementation
/// * `E` - ExtensionDescriptorReader implementation
/// * `S` - ModelStore implementation
/// * `P` - ProgressReporter implementation
pub struct CurateAppModelUseCase<R, E, S, P> {
    repository: R,
    descriptor_reader: E,
    model_store: S,
    progress_reporter: P,
}

impl<R, E, S, P> CurateAppModelUseCase<R, E, S, P>
where
    R: ArtifactResolver + ProjectDescriptorReader,
    E: ExtensionDescriptorReader,
    S: ModelStore,
    P: ProgressReporter,
{
    /// Creates a new CurateAppModelUseCase with injected dependencies
    pub fn new(repository: R, descriptor_reader: E, model_store: S, progress_reporter: P) -> Self {
        Self {
            repository,
            descriptor_reader,
            model_store,
            progress_reporter,
        }
    }

    /// Executes the curation
    ///
    /// # Arguments
    /// * `request` - Project, mode and curation options
    ///
    /// # Returns
    /// The model, whether it was reused, and the platform misalignment report if any
    ///
    /// # Errors
    /// - An artifact or descriptor cannot be resolved
    /// - The model fails validation (`CuratorError::Validation`)
    /// - Platform BOMs are misaligned in strict mode (`CuratorError::PlatformMisaligned`)
    /// - The model cannot be persisted
    pub fn execute(&self, request: CurationRequest) -> Result<CurationResponse> {
        self.progress_reporter.report(&format!(
            "📖 Reading project descriptor from: {}",
            request.project_path.display()
        ));
        let project = self.repository.read_project(&request.project_path)?;
        let fingerprint = Self::fingerprint(&project, &request);

        // Dev-mode fast path: reuse the persisted model when the inputs are unchanged
        if request.reuse {
            if let Some(model) = self.load_reusable(&request, &fingerprint) {
                self.progress_reporter.report_completion(&format!(
                    "Reusing persisted application model with {} dependencies",
                    model.dependencies().len()
                ));
                let report = model.platform_imports().misalignment_report();
                return Ok(CurationResponse::new(model, true, report));
            }
        }

        let mut lookups = Lookups::default();
        let selector = DependencySelector::for_mode(request.mode);

        // Step 1: Collect platform release metadata from managed dependencies
        let platform_imports = self.collect_platforms(&project, &mut lookups)?;

        // Steps 2-4: Runtime resolution, extension discovery, conditional dependencies
        self.progress_reporter.report(&format!(
            "🔍 Resolving {} dependencies of {}",
            request.mode,
            project.coords.to_compact_string()
        ));
        let runtime = self.resolve_runtime(&project, &selector, &mut lookups)?;

        let mut builder = ApplicationModelBuilder::new(
            Self::app_artifact(&project, &request.project_path),
            request.mode,
        );
        builder.set_fingerprint(fingerprint);
        builder.set_platform_imports(platform_imports);

        let extensions = self.add_runtime_dependencies(&mut builder, &runtime, &mut lookups)?;
        self.progress_reporter.report(&format!(
            "✅ Resolved {} runtime dependencies, {} extension(s)",
            runtime.nodes.len(),
            extensions.len()
        ));

        // Step 5: Deployment injection
        let mut issues =
            self.inject_deployment(&mut builder, &project, &runtime, &extensions, &selector, &mut lookups)?;

        // Step 6: Compile-only dependencies
        self.add_compile_only(&mut builder, &project, &mut lookups)?;

        // Step 7: Reloadable workspace modules
        if request.mode.is_dev() {
            let direct_keys: Vec<ArtifactKey> = runtime
                .nodes
                .iter()
                .filter(|n| n.is_direct())
                .map(|n| n.key().clone())
                .collect();
            let reloadable = ReloadableModules::apply(builder.dependencies_mut(), &direct_keys);
            debug!(count = reloadable.len(), "reloadable workspace modules");
        }

        // Step 8: Exclusions requested by the caller, on top of descriptor exclusions
        builder.add_excluded_artifacts(request.excluded_artifacts.iter().cloned());

        // Steps 9-10: Classification flags and direct dependencies are applied on build
        let descriptors: Vec<ExtensionDescriptor> =
            extensions.into_iter().map(|(_, d)| d).collect();
        let model = builder.build();

        // Step 11: Validation
        issues.extend(DeploymentValidator::validate_classpaths(
            model.dependencies(),
            &descriptors,
        ));
        issues.extend(DeploymentValidator::validate_capabilities(
            model.extension_capabilities(),
        ));
        DeploymentValidator::into_result(issues)?;

        // Step 12: Platform alignment
        let misalignment_report = self.check_alignment(&model, request.strict_alignment)?;

        let model_path = self.model_store.persist(&model, &request.output_dir)?;
        self.progress_reporter.report_completion(&format!(
            "Application model with {} dependencies written to {}",
            model.dependencies().len(),
            model_path.display()
        ));

        Ok(CurationResponse::new(model, false, misalignment_report))
    }

    /// Fingerprint of the inputs known before resolution starts
    fn fingerprint(project: &ProjectDescriptor, request: &CurationRequest) -> String {
        let mut fingerprint = Fingerprint::new();
        fingerprint.add("project", project.content.as_bytes());
        fingerprint.add("mode", request.mode.as_str().as_bytes());
        let excluded = request
            .excluded_artifacts
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",");
        fingerprint.add("excluded-artifacts", excluded.as_bytes());
        fingerprint.finish()
    }

    fn load_reusable(&self, request: &CurationRequest, fingerprint: &str) -> Option<ApplicationModel> {
        match self.model_store.load(&request.output_dir) {
            Ok(model) if model.fingerprint() == fingerprint && model.mode() == request.mode => {
                Some(model)
            }
            Ok(_) => {
                info!("project inputs changed since the model was persisted, resolving again");
                None
            }
            Err(e) => {
                info!(reason = %e, "persisted model cannot be reused, resolving again");
                None
            }
        }
    }

    fn app_artifact(project: &ProjectDescriptor, project_path: &Path) -> ResolvedDependency {
        let app = ResolvedDependency::new(project.coords.clone(), Scope::Compile)
            .with_flags(DependencyFlags::WORKSPACE_MODULE);
        let classes = project_path.join("target").join("classes");
        if classes.is_dir() {
            app.with_path(classes)
        } else {
            app
        }
    }

    fn collect_platforms(
        &self,
        project: &ProjectDescriptor,
        lookups: &mut Lookups,
    ) -> Result<PlatformImports> {
        let mut imports = PlatformImports::new();
        for managed in &project.managed_dependencies {
            let coords = managed.coords();
            if coords.artifact_id().ends_with(PLATFORM_DESCRIPTOR_ARTIFACT_ID_SUFFIX) {
                imports.add_platform_descriptor(coords)?;
            } else if coords.artifact_id().ends_with(PLATFORM_PROPERTIES_ARTIFACT_ID_SUFFIX)
                && coords.artifact_type() == "properties"
            {
                let artifact = self.resolve_artifact(lookups, coords)?;
                let props = self
                    .descriptor_reader
                    .read_properties_file(&artifact.path)
                    .with_context(|| format!("Failed to read platform properties {}", coords))?;
                imports.add_platform_properties(coords, &props)?;
            }
        }
        if !imports.is_empty() {
            self.progress_reporter.report(&format!(
                "🧭 Found {} platform(s), {} imported BOM group(s)",
                imports.platforms().count(),
                imports.imported_boms_by_platform().len()
            ));
        }
        Ok(imports)
    }

    fn resolve_artifact(&self, lookups: &mut Lookups, coords: &ArtifactCoords) -> Result<ResolvedArtifact> {
        if let Some(artifact) = lookups.artifacts.get(coords) {
            return Ok(artifact.clone());
        }
        let artifact = self.repository.resolve(coords)?;
        lookups.artifacts.insert(coords.clone(), artifact.clone());
        Ok(artifact)
    }

    /// The extension descriptor of an artifact, `None` when it is not an extension.
    fn extension_descriptor(
        &self,
        lookups: &mut Lookups,
        coords: &ArtifactCoords,
    ) -> Result<Option<ExtensionDescriptor>> {
        if let Some(descriptor) = lookups.extensions.get(coords) {
            return Ok(descriptor.clone());
        }
        let descriptor = if coords.is_jar() {
            let artifact = self.resolve_artifact(lookups, coords)?;
            match self.descriptor_reader.read_extension_properties(&artifact.path)? {
                Some(props) => Some(ExtensionDescriptor::from_properties(coords, &props)?),
                None => None,
            }
        } else {
            None
        };
        lookups.extensions.insert(coords.clone(), descriptor.clone());
        Ok(descriptor)
    }

    /// Resolves the runtime graph, activating conditional dependencies until
    /// a pass activates nothing.
    fn resolve_runtime(
        &self,
        project: &ProjectDescriptor,
        selector: &DependencySelector,
        lookups: &mut Lookups,
    ) -> Result<RuntimeGraph> {
        let request = CollectRequest::for_dependencies(
            project.coords.clone(),
            project.dependencies.clone(),
            selector.clone(),
        )
        .with_managed(project.managed_dependencies.clone());
        let mut tree = self.repository.collect_dependencies(&request)?;

        let mut inspected: HashSet<ArtifactKey> = HashSet::new();
        let mut pending: Vec<PendingConditional> = Vec::new();
        loop {
            let nodes = ConflictResolver::resolve(&tree, selector);

            for node in &nodes {
                if !inspected.insert(node.key().clone()) {
                    continue;
                }
                let Some(extension) = self.extension_descriptor(lookups, node.dependency.coords())?
                else {
                    continue;
                };
                for conditional in extension.conditional_dependencies() {
                    if node.exclusions.iter().any(|p| p.matches(conditional)) {
                        debug!(
                            conditional = %conditional,
                            extension = %node.dependency.coords(),
                            "conditional dependency excluded"
                        );
                        continue;
                    }
                    pending.push(PendingConditional {
                        coords: conditional.clone(),
                        declared_by: node.key().clone(),
                        exclusions: node.exclusions.clone(),
                    });
                }
            }

            let present: HashSet<&ArtifactKey> = nodes.iter().map(|n| n.key()).collect();
            let mut activated: HashSet<ArtifactKey> = HashSet::new();
            let mut waiting = Vec::new();
            for conditional in std::mem::take(&mut pending) {
                let key = conditional.coords.key();
                if present.contains(key) || activated.contains(key) {
                    continue;
                }
                let conditions = self
                    .extension_descriptor(lookups, &conditional.coords)?
                    .map(|d| d.dependency_condition().to_vec())
                    .unwrap_or_default();
                if !conditions.iter().all(|k| present.contains(k)) {
                    waiting.push(conditional);
                    continue;
                }
                let Some(parent) = nodes.iter().find(|n| n.key() == &conditional.declared_by) else {
                    waiting.push(conditional);
                    continue;
                };

                let subtree = self.repository.collect_dependencies(
                    &CollectRequest::for_dependency(conditional.coords.clone(), selector.clone())
                        .with_managed(project.managed_dependencies.clone())
                        .with_exclusions(conditional.exclusions.clone()),
                )?;
                let target = tree.node_at_mut(&parent.path).ok_or_else(|| {
                    anyhow::anyhow!("Dependency tree has no node for {}", parent.dependency.coords())
                })?;
                target.add_child(subtree);
                info!(
                    conditional = %conditional.coords,
                    extension = %parent.dependency.coords(),
                    "activated conditional dependency"
                );
                activated.insert(key.clone());
            }
            pending = waiting;

            if activated.is_empty() {
                for conditional in &pending {
                    debug!(
                        conditional = %conditional.coords,
                        "conditions not satisfied, dropping conditional dependency"
                    );
                }
                return Ok(RuntimeGraph { tree, nodes });
            }
        }
    }

    /// Adds the runtime winners to the builder and returns the extensions
    /// among them, each with the index of its node.
    fn add_runtime_dependencies(
        &self,
        builder: &mut ApplicationModelBuilder,
        runtime: &RuntimeGraph,
        lookups: &mut Lookups,
    ) -> Result<Vec<(usize, ExtensionDescriptor)>> {
        let winners: HashMap<&ArtifactKey, &ArtifactCoords> = runtime
            .nodes
            .iter()
            .map(|n| (n.key(), n.dependency.coords()))
            .collect();

        let total = runtime.nodes.len();
        let mut extensions = Vec::new();
        for (index, node) in runtime.nodes.iter().enumerate() {
            self.progress_reporter.report_progress(
                index + 1,
                total,
                Some(&node.dependency.coords().to_compact_string()),
            );
            let mut flags = DependencyFlags::RUNTIME_CP | DependencyFlags::DEPLOYMENT_CP;
            if node.is_direct() {
                flags |= DependencyFlags::DIRECT;
            }
            if node.dependency.is_optional() {
                flags |= DependencyFlags::OPTIONAL;
            }

            let coords = node.dependency.coords();
            if let Some(extension) = self.extension_descriptor(lookups, coords)? {
                flags |= DependencyFlags::RUNTIME_EXTENSION_ARTIFACT;
                if !Self::has_extension_ancestor(&runtime.tree, &node.path, lookups) {
                    flags |= DependencyFlags::TOP_LEVEL_RUNTIME_EXTENSION_ARTIFACT;
                }
                builder.handle_extension_descriptor(&extension);
                extensions.push((index, extension));
            }

            let dependency = self.resolved_dependency(lookups, node, flags, &winners)?;
            builder.add_dependency(dependency);
        }
        Ok(extensions)
    }

    fn has_extension_ancestor(tree: &DependencyNode, path: &[usize], lookups: &Lookups) -> bool {
        (1..path.len()).any(|len| {
            tree.node_at(&path[..len])
                .and_then(|ancestor| lookups.extensions.get(ancestor.coords()))
                .is_some_and(|d| d.is_some())
        })
    }

    fn resolved_dependency(
        &self,
        lookups: &mut Lookups,
        node: &ResolvedNode,
        mut flags: DependencyFlags,
        winners: &HashMap<&ArtifactKey, &ArtifactCoords>,
    ) -> Result<ResolvedDependency> {
        let coords = node.dependency.coords();
        let artifact = self.resolve_artifact(lookups, coords)?;
        if artifact.workspace_module {
            flags |= DependencyFlags::WORKSPACE_MODULE;
        }
        let mut dependency = ResolvedDependency::new(coords.clone(), node.dependency.scope())
            .with_flags(flags)
            .with_path(artifact.path);
        dependency.set_dependencies(
            node.children
                .iter()
                .filter_map(|k| winners.get(k).map(|c| (*c).clone()))
                .collect(),
        );
        Ok(dependency)
    }

    /// Collects the deployment artifacts of the runtime extensions and adds
    /// what only the build needs.
    ///
    /// # Returns
    /// Deployment artifacts that do not depend on their runtime artifact
    fn inject_deployment(
        &self,
        builder: &mut ApplicationModelBuilder,
        project: &ProjectDescriptor,
        runtime: &RuntimeGraph,
        extensions: &[(usize, ExtensionDescriptor)],
        selector: &DependencySelector,
        lookups: &mut Lookups,
    ) -> Result<Vec<ValidationIssue>> {
        let runtime_keys: HashSet<&ArtifactKey> = runtime.nodes.iter().map(|n| n.key()).collect();

        let mut managed: Vec<Dependency> = runtime
            .nodes
            .iter()
            .map(|n| Dependency::new(n.dependency.coords().clone(), Scope::Compile))
            .collect();
        managed.extend(
            extensions
                .iter()
                .map(|(_, e)| Dependency::new(e.deployment_artifact().clone(), Scope::Compile)),
        );
        managed.extend(project.managed_dependencies.iter().cloned());

        let mut issues = Vec::new();
        let mut deployment_trees = Vec::new();
        for (index, extension) in extensions {
            if runtime_keys.contains(extension.deployment_artifact().key()) {
                continue;
            }
            let node = &runtime.nodes[*index];
            let tree = self
                .repository
                .collect_dependencies(
                    &CollectRequest::for_dependency(extension.deployment_artifact().clone(), selector.clone())
                        .with_managed(managed.clone())
                        .with_exclusions(node.exclusions.clone()),
                )
                .with_context(|| {
                    format!(
                        "Failed to resolve deployment artifact {} of {}",
                        extension.deployment_artifact(),
                        extension.runtime_artifact()
                    )
                })?;
            if let Some(issue) =
                DeploymentValidator::validate_deployment_tree(&tree, extension.runtime_artifact())
            {
                issues.push(issue);
            }
            deployment_trees.push(tree);
        }
        if deployment_trees.is_empty() {
            return Ok(issues);
        }

        self.progress_reporter.report(&format!(
            "🏗️  Injecting {} deployment artifact(s)",
            deployment_trees.len()
        ));
        let mut children = runtime.tree.children().to_vec();
        children.extend(deployment_trees);
        let build_tree = DependencyNode::root(project.coords.clone()).with_children(children);
        let nodes = ConflictResolver::resolve(&build_tree, selector);
        let winners: HashMap<&ArtifactKey, &ArtifactCoords> =
            nodes.iter().map(|n| (n.key(), n.dependency.coords())).collect();

        let mut added = 0;
        for node in nodes.iter().filter(|n| !runtime_keys.contains(n.key())) {
            let dependency =
                self.resolved_dependency(lookups, node, DependencyFlags::DEPLOYMENT_CP, &winners)?;
            builder.add_dependency(dependency);
            added += 1;
        }
        debug!(added, "deployment-only dependencies");
        Ok(issues)
    }

    /// Resolves `provided` direct dependencies against the versions already
    /// selected for the build.
    fn add_compile_only(
        &self,
        builder: &mut ApplicationModelBuilder,
        project: &ProjectDescriptor,
        lookups: &mut Lookups,
    ) -> Result<()> {
        let provided: Vec<Dependency> = project
            .dependencies
            .iter()
            .filter(|d| d.scope() == Scope::Provided)
            .cloned()
            .collect();
        if provided.is_empty() {
            return Ok(());
        }

        let mut managed: Vec<Dependency> = builder
            .dependencies()
            .iter()
            .map(|d| Dependency::new(d.coords().clone(), Scope::Compile))
            .collect();
        managed.extend(project.managed_dependencies.iter().cloned());

        let selector = DependencySelector::compile_only();
        let tree = self.repository.collect_dependencies(
            &CollectRequest::for_dependencies(project.coords.clone(), provided, selector.clone())
                .with_managed(managed),
        )?;
        let nodes = ConflictResolver::resolve(&tree, &selector);
        let winners: HashMap<&ArtifactKey, &ArtifactCoords> =
            nodes.iter().map(|n| (n.key(), n.dependency.coords())).collect();

        for node in &nodes {
            if let Some(existing) = builder.dependency_mut(node.key()) {
                existing.set_flags(DependencyFlags::COMPILE_ONLY);
                continue;
            }
            let mut flags = DependencyFlags::COMPILE_ONLY;
            if node.is_direct() {
                flags |= DependencyFlags::DIRECT;
            }
            if self
                .extension_descriptor(lookups, node.dependency.coords())?
                .is_some()
            {
                flags |= DependencyFlags::RUNTIME_EXTENSION_ARTIFACT;
            }
            let dependency = self.resolved_dependency(lookups, node, flags, &winners)?;
            builder.add_dependency(dependency);
        }
        Ok(())
    }

    fn check_alignment(&self, model: &ApplicationModel, strict: bool) -> Result<Option<String>> {
        let Some(report) = model.platform_imports().misalignment_report() else {
            return Ok(None);
        };
        if strict {
            return Err(CuratorError::PlatformMisaligned { report }.into());
        }
        warn!("platform BOMs are not aligned");
        self.progress_reporter.report_error(&format!(
            "⚠️  Warning: Platform BOMs are not aligned:\n{}",
            report
        ));
        Ok(Some(report))
    }
}

impl<R, E, S, P> AppModelPort for CurateAppModelUseCase<R, E, S, P>
where
    R: ArtifactResolver + ProjectDescriptorReader,
    E: ExtensionDescriptorReader,
    S: ModelStore,
    P: ProgressReporter,
{
    fn curate(&self, request: CurationRequest) -> Result<CurationResponse> {
        self.execute(request)
    }
}

#[cfg(test)]
mod tests;
