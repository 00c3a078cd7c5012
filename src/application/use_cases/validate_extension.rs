use crate::ports::outbound::{ArtifactResolver, ExtensionDescriptorReader, ProgressReporter};
use crate::resolution::domain::{
    ArtifactCoords, ArtifactKey, CollectRequest, ExtensionDescriptor, ResolutionMode,
};
use crate::resolution::policies::DependencySelector;
use crate::resolution::services::{ConflictResolver, DeploymentValidator};
use crate::shared::Result;
use std::collections::HashSet;
use tracing::debug;

/// ValidateExtensionUseCase - checks the runtime and deployment pair of an extension module
///
/// Every extension the runtime artifact depends on must have its deployment
/// artifact among the dependencies of the module's deployment artifact.
pub struct ValidateExtensionUseCase<R, E, P> {
    repository: R,
    descriptor_reader: E,
    progress_reporter: P,
}

impl<R, E, P> ValidateExtensionUseCase<R, E, P>
where
    R: ArtifactResolver,
    E: ExtensionDescriptorReader,
    P: ProgressReporter,
{
    pub fn new(repository: R, descriptor_reader: E, progress_reporter: P) -> Self {
        Self {
            repository,
            descriptor_reader,
            progress_reporter,
        }
    }

    /// Validates the module.
    ///
    /// # Errors
    /// Returns `CuratorError::Validation` listing every runtime extension
    /// whose deployment counterpart is missing, or a resolution error
    pub fn execute(&self, runtime: &ArtifactCoords, deployment: &ArtifactCoords) -> Result<()> {
        let selector = DependencySelector::for_mode(ResolutionMode::Prod);

        self.progress_reporter.report(&format!(
            "🔍 Resolving runtime artifact {}",
            runtime.to_compact_string()
        ));
        let runtime_tree = self
            .repository
            .collect_dependencies(&CollectRequest::for_artifact(runtime.clone(), selector.clone()))?;
        let mut extensions: Vec<ExtensionDescriptor> = Vec::new();
        for node in ConflictResolver::resolve(&runtime_tree, &selector) {
            let coords = node.dependency.coords();
            if !coords.is_jar() {
                continue;
            }
            let artifact = self.repository.resolve(coords)?;
            if let Some(props) = self
                .descriptor_reader
                .read_extension_properties(&artifact.path)?
            {
                extensions.push(ExtensionDescriptor::from_properties(coords, &props)?);
            }
        }
        debug!(count = extensions.len(), "extensions among runtime dependencies");

        self.progress_reporter.report(&format!(
            "🔍 Resolving deployment artifact {}",
            deployment.to_compact_string()
        ));
        let deployment_tree = self.repository.collect_dependencies(&CollectRequest::for_artifact(
            deployment.clone(),
            selector.clone(),
        ))?;
        let deployment_keys: HashSet<ArtifactKey> = ConflictResolver::resolve(&deployment_tree, &selector)
            .into_iter()
            .map(|n| n.key().clone())
            .collect();

        let issues = DeploymentValidator::validate_extension_module(&extensions, &deployment_keys);
        DeploymentValidator::into_result(issues)?;
        self.progress_reporter.report_completion(&format!(
            "Extension module {} is consistent",
            runtime.to_compact_string()
        ));
        Ok(())
    }
}
