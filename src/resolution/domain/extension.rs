use crate::resolution::domain::{ArtifactCoords, ArtifactKey, ArtifactPattern};
use crate::shared::{Properties, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Location of the extension descriptor inside a runtime extension artifact
pub const EXTENSION_DESCRIPTOR_PATH: &str = "META-INF/quarkus-extension.properties";

pub const PROP_DEPLOYMENT_ARTIFACT: &str = "deployment-artifact";
pub const PROP_CONDITIONAL_DEPENDENCIES: &str = "conditional-dependencies";
pub const PROP_DEPENDENCY_CONDITION: &str = "dependency-condition";
pub const PROP_PARENT_FIRST_ARTIFACTS: &str = "parent-first-artifacts";
pub const PROP_RUNNER_PARENT_FIRST_ARTIFACTS: &str = "runner-parent-first-artifacts";
pub const PROP_EXCLUDED_ARTIFACTS: &str = "excluded-artifacts";
pub const PROP_LESSER_PRIORITY_ARTIFACTS: &str = "lesser-priority-artifacts";
pub const PROP_PROVIDES_CAPABILITIES: &str = "provides-capabilities";
pub const PROP_REQUIRES_CAPABILITIES: &str = "requires-capabilities";

/// Parsed `META-INF/quarkus-extension.properties` of a runtime extension artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    runtime_artifact: ArtifactCoords,
    deployment_artifact: ArtifactCoords,
    conditional_dependencies: Vec<ArtifactCoords>,
    dependency_condition: Vec<ArtifactKey>,
    parent_first_artifacts: Vec<ArtifactKey>,
    runner_parent_first_artifacts: Vec<ArtifactKey>,
    lesser_priority_artifacts: Vec<ArtifactKey>,
    excluded_artifacts: Vec<ArtifactPattern>,
    provides_capabilities: Vec<String>,
    requires_capabilities: Vec<String>,
}

impl ExtensionDescriptor {
    /// Builds the descriptor of `runtime_artifact` from its descriptor properties.
    ///
    /// # Errors
    /// Returns an error if `deployment-artifact` is missing or any listed
    /// coordinate, key or pattern is malformed.
    pub fn from_properties(runtime_artifact: &ArtifactCoords, props: &Properties) -> Result<Self> {
        let context = || format!("Invalid extension descriptor of {}", runtime_artifact);

        let deployment_value = props.get(PROP_DEPLOYMENT_ARTIFACT).ok_or_else(|| {
            anyhow::anyhow!(
                "Extension descriptor of {} does not include {}",
                runtime_artifact,
                PROP_DEPLOYMENT_ARTIFACT
            )
        })?;
        let deployment_artifact =
            parse_deployment_artifact(deployment_value, runtime_artifact.version())
                .with_context(context)?;

        let conditional_dependencies = whitespace_list(props.get(PROP_CONDITIONAL_DEPENDENCIES))
            .map(str::parse::<ArtifactCoords>)
            .collect::<Result<Vec<_>>>()
            .with_context(context)?;
        let dependency_condition = whitespace_list(props.get(PROP_DEPENDENCY_CONDITION))
            .map(str::parse::<ArtifactKey>)
            .collect::<Result<Vec<_>>>()
            .with_context(context)?;

        Ok(Self {
            runtime_artifact: runtime_artifact.clone(),
            deployment_artifact,
            conditional_dependencies,
            dependency_condition,
            parent_first_artifacts: key_list(props.get(PROP_PARENT_FIRST_ARTIFACTS))
                .with_context(context)?,
            runner_parent_first_artifacts: key_list(
                props.get(PROP_RUNNER_PARENT_FIRST_ARTIFACTS),
            )
            .with_context(context)?,
            lesser_priority_artifacts: key_list(props.get(PROP_LESSER_PRIORITY_ARTIFACTS))
                .with_context(context)?,
            excluded_artifacts: comma_list(props.get(PROP_EXCLUDED_ARTIFACTS))
                .map(str::parse::<ArtifactPattern>)
                .collect::<Result<Vec<_>>>()
                .with_context(context)?,
            provides_capabilities: capability_list(props.get(PROP_PROVIDES_CAPABILITIES)),
            requires_capabilities: capability_list(props.get(PROP_REQUIRES_CAPABILITIES)),
        })
    }

    pub fn runtime_artifact(&self) -> &ArtifactCoords {
        &self.runtime_artifact
    }

    pub fn deployment_artifact(&self) -> &ArtifactCoords {
        &self.deployment_artifact
    }

    pub fn conditional_dependencies(&self) -> &[ArtifactCoords] {
        &self.conditional_dependencies
    }

    /// Keys that must all be on the runtime classpath for this artifact,
    /// when it is itself a conditional dependency, to be activated.
    pub fn dependency_condition(&self) -> &[ArtifactKey] {
        &self.dependency_condition
    }

    pub fn parent_first_artifacts(&self) -> &[ArtifactKey] {
        &self.parent_first_artifacts
    }

    pub fn runner_parent_first_artifacts(&self) -> &[ArtifactKey] {
        &self.runner_parent_first_artifacts
    }

    pub fn lesser_priority_artifacts(&self) -> &[ArtifactKey] {
        &self.lesser_priority_artifacts
    }

    pub fn excluded_artifacts(&self) -> &[ArtifactPattern] {
        &self.excluded_artifacts
    }

    pub fn provides_capabilities(&self) -> &[String] {
        &self.provides_capabilities
    }

    pub fn requires_capabilities(&self) -> &[String] {
        &self.requires_capabilities
    }

    pub fn capabilities(&self) -> ExtensionCapabilities {
        ExtensionCapabilities {
            extension: self.runtime_artifact.clone(),
            provides: self.provides_capabilities.clone(),
            requires: self.requires_capabilities.clone(),
        }
    }
}

/// Capabilities declared by one extension, kept in the application model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCapabilities {
    pub extension: ArtifactCoords,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// `deployment-artifact` may leave the version out, meaning "same as the runtime artifact".
fn parse_deployment_artifact(value: &str, runtime_version: &str) -> Result<ArtifactCoords> {
    let value = value.trim();
    if let Some(without_version) = value.strip_suffix(':') {
        let key: ArtifactKey = without_version.parse()?;
        return ArtifactCoords::of_key(&key, runtime_version);
    }
    if value.matches(':').count() == 1 {
        let key: ArtifactKey = value.parse()?;
        return ArtifactCoords::of_key(&key, runtime_version);
    }
    value.parse()
}

fn whitespace_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value.unwrap_or("").split_whitespace()
}

fn comma_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn key_list(value: Option<&str>) -> Result<Vec<ArtifactKey>> {
    comma_list(value).map(str::parse::<ArtifactKey>).collect()
}

fn capability_list(value: Option<&str>) -> Vec<String> {
    comma_list(value).map(str::to_string).collect()
}
