use crate::ports::outbound::ExtensionDescriptorReader;
use crate::resolution::domain::extension::EXTENSION_DESCRIPTOR_PATH;
use crate::shared::error::CuratorError;
use crate::shared::security::{
    read_bounded_to_string, read_limited, validate_not_symlink, MAX_DESCRIPTOR_SIZE,
};
use crate::shared::{Properties, Result};
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// FileSystemReader adapter reading extension and platform metadata from disk
///
/// Artifacts are either directories (workspace modules) or jar files. Neither
/// may be a symbolic link, and descriptors are read with a size limit.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemReader {
    fn read_from_directory(&self, dir: &Path) -> Result<Option<Properties>> {
        let descriptor = dir.join(EXTENSION_DESCRIPTOR_PATH);
        if !descriptor.is_file() {
            return Ok(None);
        }
        let content = read_bounded_to_string(&descriptor, "extension descriptor", MAX_DESCRIPTOR_SIZE)?;
        Properties::parse(&content).map(Some)
    }

    fn read_from_jar(&self, jar: &Path) -> Result<Option<Properties>> {
        let file = File::open(jar).map_err(|e| CuratorError::FileReadError {
            path: jar.to_path_buf(),
            details: e.to_string(),
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| CuratorError::FileReadError {
            path: jar.to_path_buf(),
            details: format!("Not a valid jar: {}", e),
        })?;
        let entry = match archive.by_name(EXTENSION_DESCRIPTOR_PATH) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(CuratorError::FileReadError {
                    path: jar.to_path_buf(),
                    details: e.to_string(),
                }
                .into())
            }
        };
        let content = read_limited(entry, "extension descriptor", MAX_DESCRIPTOR_SIZE)?;
        Properties::parse(&content).map(Some)
    }
}

impl ExtensionDescriptorReader for FileSystemReader {
    fn read_extension_properties(&self, artifact_path: &Path) -> Result<Option<Properties>> {
        if !artifact_path.exists() {
            // Workspace modules that were never built have no classes directory
            debug!(path = %artifact_path.display(), "artifact path does not exist");
            return Ok(None);
        }
        validate_not_symlink(artifact_path, "descriptor read")?;
        if artifact_path.is_dir() {
            self.read_from_directory(artifact_path)
        } else {
            self.read_from_jar(artifact_path)
        }
    }

    fn read_properties_file(&self, path: &Path) -> Result<Properties> {
        let content = read_bounded_to_string(path, "properties file", MAX_DESCRIPTOR_SIZE)?;
        Properties::parse(&content)
    }
}
