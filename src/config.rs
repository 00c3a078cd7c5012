//! Configuration file support for app-curator.
//!
//! Provides YAML-based configuration through `app-curator.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::resolution::domain::{ArtifactCoords, ArtifactPattern, ResolutionMode};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "app-curator.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub local_repository: Option<PathBuf>,
    pub remote_repositories: Option<Vec<RemoteRepositoryConfig>>,
    pub offline: Option<bool>,
    pub mode: Option<String>,
    pub strict_alignment: Option<bool>,
    pub excluded_artifacts: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub workspace_modules: Option<Vec<WorkspaceModuleConfig>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteRepositoryConfig {
    pub id: String,
    pub url: String,
}

/// A module built outside the discovered multi-module project.
#[derive(Debug, Deserialize)]
pub struct WorkspaceModuleConfig {
    pub coords: String,
    /// Classes directory or built jar
    pub path: PathBuf,
    pub pom: Option<PathBuf>,
}

impl ConfigFile {
    /// The configured mode, already checked by validation.
    pub fn resolution_mode(&self) -> Option<ResolutionMode> {
        self.mode.as_deref().and_then(|m| m.parse().ok())
    }
}

/// `~/.m2/repository`, or `.m2/repository` when there is no home directory.
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(ref mode) = config.mode {
        if let Err(e) = mode.parse::<ResolutionMode>() {
            bail!("Invalid config: mode: {}", e);
        }
    }

    if config.http_timeout_secs == Some(0) {
        bail!(
            "Invalid config: http_timeout_secs must be greater than zero.\n\n\
             💡 Hint: Remove the field to use the default of 30 seconds."
        );
    }

    for (i, repo) in config.remote_repositories.iter().flatten().enumerate() {
        if repo.id.trim().is_empty() {
            bail!(
                "Invalid config: remote_repositories[{}].id must not be empty.\n\n\
                 💡 Hint: Give each repository a short identifier such as \"central\".",
                i
            );
        }
        if !(repo.url.starts_with("https://") || repo.url.starts_with("http://")) {
            bail!(
                "Invalid config: remote_repositories[{}].url '{}' is not an http(s) URL.\n\n\
                 💡 Hint: Use the repository base URL, e.g. \"https://repo.maven.apache.org/maven2\".",
                i,
                repo.url
            );
        }
    }

    for (i, pattern) in config.excluded_artifacts.iter().flatten().enumerate() {
        if let Err(e) = pattern.parse::<ArtifactPattern>() {
            bail!(
                "Invalid config: excluded_artifacts[{}]: {}\n\n\
                 💡 Hint: Patterns have the form group:artifact[:classifier[:type[:version]]] and may use '*'.",
                i,
                e
            );
        }
    }

    for (i, module) in config.workspace_modules.iter().flatten().enumerate() {
        if module.coords.trim().is_empty() {
            bail!(
                "Invalid config: workspace_modules[{}].coords must not be empty.\n\n\
                 💡 Hint: Use group:artifact:version coordinates (e.g., \"io.acme:lib:1.0\").",
                i
            );
        }
        if let Err(e) = module.coords.parse::<ArtifactCoords>() {
            bail!("Invalid config: workspace_modules[{}]: {}", i, e);
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
