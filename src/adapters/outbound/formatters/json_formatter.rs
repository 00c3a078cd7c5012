use crate::ports::outbound::ModelFormatter;
use crate::resolution::domain::{ApplicationModel, ResolvedDependency};
use crate::shared::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct ModelDocument<'a> {
    tool: Tool,
    application: String,
    mode: &'a str,
    fingerprint: &'a str,
    dependencies: Vec<DependencyEntry>,
    #[serde(rename = "parentFirst", skip_serializing_if = "Vec::is_empty")]
    parent_first: Vec<String>,
    #[serde(rename = "runnerParentFirst", skip_serializing_if = "Vec::is_empty")]
    runner_parent_first: Vec<String>,
    #[serde(rename = "lesserPriority", skip_serializing_if = "Vec::is_empty")]
    lesser_priority: Vec<String>,
    #[serde(rename = "excludedArtifacts", skip_serializing_if = "Vec::is_empty")]
    excluded_artifacts: Vec<String>,
    #[serde(rename = "reloadableWorkspaceModules", skip_serializing_if = "Vec::is_empty")]
    reloadable_workspace_modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    platforms: Vec<PlatformEntry>,
    #[serde(rename = "platformProperties", skip_serializing_if = "BTreeMap::is_empty")]
    platform_properties: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct DependencyEntry {
    coords: String,
    scope: String,
    flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paths: Vec<String>,
    #[serde(rename = "dependsOn", skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PlatformEntry {
    key: String,
    stream: String,
    version: String,
    boms: Vec<String>,
}

impl From<&ResolvedDependency> for DependencyEntry {
    fn from(dep: &ResolvedDependency) -> Self {
        Self {
            coords: dep.coords().to_string(),
            scope: dep.scope().to_string(),
            flags: dep.flags().names(),
            paths: dep.paths().iter().map(|p| p.display().to_string()).collect(),
            depends_on: dep.dependencies().iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// JsonFormatter adapter rendering the model as pretty-printed JSON
///
/// Flags are written by name, not as the persisted bitset.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn keys<'a, T: ToString + 'a>(items: impl IntoIterator<Item = &'a T>) -> Vec<String> {
    items.into_iter().map(|k| k.to_string()).collect()
}

impl ModelFormatter for JsonFormatter {
    fn format(&self, model: &ApplicationModel) -> Result<String> {
        let platforms = model
            .platform_imports()
            .platforms()
            .flat_map(|platform| {
                platform.streams().iter().flat_map(move |stream| {
                    stream.releases().iter().map(move |release| PlatformEntry {
                        key: platform.key().to_string(),
                        stream: stream.id().to_string(),
                        version: release.version().to_string(),
                        boms: keys(release.boms()),
                    })
                })
            })
            .collect();

        let document = ModelDocument {
            tool: Tool {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            application: model.app_artifact().coords().to_string(),
            mode: model.mode().as_str(),
            fingerprint: model.fingerprint(),
            dependencies: model.dependencies().iter().map(DependencyEntry::from).collect(),
            parent_first: keys(model.parent_first()),
            runner_parent_first: keys(model.runner_parent_first()),
            lesser_priority: keys(model.lesser_priority()),
            excluded_artifacts: keys(model.excluded_artifacts()),
            reloadable_workspace_modules: keys(model.reloadable_workspace_modules()),
            platforms,
            platform_properties: model.platform_imports().platform_properties(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
