use crate::resolution::domain::{
    ArtifactCoords, ArtifactKey, DependencyNode, ExtensionCapabilities, ExtensionDescriptor,
    ResolvedDependency,
};
use crate::shared::error::{CuratorError, ValidationIssue};
use crate::shared::Result;
use std::collections::{HashMap, HashSet};

pub const MISSING_IN_DEPLOYMENT_MODULE: &str = "is missing in the deployment module";

/// DeploymentValidator service checking the runtime/deployment split of an application
///
/// Checks never stop at the first problem: every offending artifact is
/// reported, and callers turn the collected issues into a single error.
pub struct DeploymentValidator;

impl DeploymentValidator {
    /// Checks the classpaths of a resolved application against its extensions.
    ///
    /// # Arguments
    /// * `dependencies` - Resolved dependencies with classpath flags
    /// * `extensions` - Descriptors of the runtime extensions found
    ///
    /// # Returns
    /// One issue per deployment artifact leaking onto the runtime classpath and
    /// one per extension whose deployment artifact is absent
    pub fn validate_classpaths(
        dependencies: &[ResolvedDependency],
        extensions: &[ExtensionDescriptor],
    ) -> Vec<ValidationIssue> {
        let by_key: HashMap<&ArtifactKey, &ResolvedDependency> =
            dependencies.iter().map(|d| (d.key(), d)).collect();
        let mut issues = Vec::new();

        for extension in extensions {
            let deployment_key = extension.deployment_artifact().key();
            match by_key.get(deployment_key) {
                Some(dep) if dep.is_runtime_cp() => issues.push(ValidationIssue::new(
                    dep.coords().to_string(),
                    format!(
                        "is the deployment artifact of {} and was found on the runtime classpath",
                        extension.runtime_artifact().key()
                    ),
                )),
                Some(dep) if dep.is_deployment_cp() => {}
                _ => issues.push(ValidationIssue::new(
                    extension.runtime_artifact().key().to_string(),
                    MISSING_IN_DEPLOYMENT_MODULE,
                )),
            }
        }
        issues
    }

    /// Checks that a deployment artifact declares its runtime artifact as a
    /// direct dependency.
    pub fn validate_deployment_tree(
        deployment_tree: &DependencyNode,
        runtime_artifact: &ArtifactCoords,
    ) -> Option<ValidationIssue> {
        let depends_on_runtime = deployment_tree
            .children()
            .iter()
            .any(|c| c.coords().key() == runtime_artifact.key());
        if depends_on_runtime {
            None
        } else {
            Some(ValidationIssue::new(
                deployment_tree.coords().to_string(),
                format!(
                    "does not appear to depend on the corresponding runtime artifact {}",
                    runtime_artifact
                ),
            ))
        }
    }

    /// Reports required capabilities that no extension provides.
    pub fn validate_capabilities(capabilities: &[ExtensionCapabilities]) -> Vec<ValidationIssue> {
        let provided: HashSet<&str> = capabilities
            .iter()
            .flat_map(|c| c.provides.iter().map(String::as_str))
            .collect();
        capabilities
            .iter()
            .flat_map(|c| {
                c.requires
                    .iter()
                    .filter(|r| !provided.contains(r.as_str()))
                    .map(move |r| {
                        ValidationIssue::new(
                            c.extension.to_string(),
                            format!("requires capability {} which no extension provides", r),
                        )
                    })
            })
            .collect()
    }

    /// Checks an extension module: every extension the runtime artifact depends
    /// on must have its deployment artifact among the deployment artifact's
    /// dependencies.
    ///
    /// # Arguments
    /// * `runtime_extensions` - Extensions among the runtime artifact's dependencies
    /// * `deployment_dependency_keys` - Keys of the deployment artifact's dependencies
    ///
    /// # Returns
    /// One issue per runtime extension key whose counterpart is missing
    pub fn validate_extension_module(
        runtime_extensions: &[ExtensionDescriptor],
        deployment_dependency_keys: &HashSet<ArtifactKey>,
    ) -> Vec<ValidationIssue> {
        runtime_extensions
            .iter()
            .filter(|e| !deployment_dependency_keys.contains(e.deployment_artifact().key()))
            .map(|e| {
                ValidationIssue::new(
                    e.runtime_artifact().key().to_string(),
                    MISSING_IN_DEPLOYMENT_MODULE,
                )
            })
            .collect()
    }

    /// Turns collected issues into a single `CuratorError::Validation`.
    pub fn into_result(issues: Vec<ValidationIssue>) -> Result<()> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CuratorError::Validation { issues }.into())
        }
    }
}
