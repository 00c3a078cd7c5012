use crate::ports::outbound::ModelStore;
use crate::resolution::domain::ApplicationModel;
use crate::shared::error::{CuratorError, ModelLoadError};
use crate::shared::security::{validate_file_size, validate_not_symlink, MAX_FILE_SIZE};
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Directory under the output directory holding the persisted model
pub const DEPLOYMENT_DIR: &str = "lib/deployment";
pub const MODEL_FILE_NAME: &str = "appmodel.dat";
pub const BUILD_SYSTEM_PROPERTIES_FILE_NAME: &str = "build-system.properties";

const FORMAT_NAME: &str = "app-model";
/// Bumped whenever the serialized model layout changes
const FORMAT_VERSION: u32 = 1;

/// First line of the model file
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    version: u32,
    digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    written: Option<String>,
}

/// FileModelStore adapter persisting the model as a versioned, checksummed file
///
/// Layout of `<output>/lib/deployment/appmodel.dat`: a one-line JSON header
/// carrying the format version and the sha-256 of the body, followed by the
/// model as JSON. `build-system.properties` is written next to it. Both
/// files are replaced atomically.
pub struct FileModelStore;

impl FileModelStore {
    pub fn new() -> Self {
        Self
    }

    pub fn model_path(output_dir: &Path) -> PathBuf {
        output_dir.join(DEPLOYMENT_DIR).join(MODEL_FILE_NAME)
    }

    fn write_atomically(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        let target = dir.join(file_name);
        let write_error = |details: String| CuratorError::FileWriteError {
            path: target.clone(),
            details,
        };
        if target.exists() {
            validate_not_symlink(&target, "write")?;
        }
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        tmp.write_all(content)
            .and_then(|_| tmp.flush())
            .map_err(|e| write_error(e.to_string()))?;
        tmp.persist(&target)
            .map_err(|e| write_error(e.error.to_string()))?;
        Ok(target)
    }
}

impl Default for FileModelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

impl ModelStore for FileModelStore {
    fn persist(&self, model: &ApplicationModel, output_dir: &Path) -> Result<PathBuf> {
        let dir = output_dir.join(DEPLOYMENT_DIR);
        fs::create_dir_all(&dir).map_err(|e| CuratorError::FileWriteError {
            path: dir.clone(),
            details: e.to_string(),
        })?;

        let body = serde_json::to_vec(model)?;
        let header = Header {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            digest: digest(&body),
            written: Some(chrono::Utc::now().to_rfc3339()),
        };
        let mut content = serde_json::to_vec(&header)?;
        content.push(b'\n');
        content.extend_from_slice(&body);

        let model_path = Self::write_atomically(&dir, MODEL_FILE_NAME, &content)?;
        let properties = model
            .build_system_properties()
            .to_properties_string(Some("Build system properties of the resolved application"));
        Self::write_atomically(
            &dir,
            BUILD_SYSTEM_PROPERTIES_FILE_NAME,
            properties.as_bytes(),
        )?;

        info!(path = %model_path.display(), bytes = content.len(), "application model persisted");
        Ok(model_path)
    }

    fn load(&self, output_dir: &Path) -> std::result::Result<ApplicationModel, ModelLoadError> {
        let path = Self::model_path(output_dir);
        if !path.is_file() {
            return Err(ModelLoadError::Missing { path });
        }
        let io_error = |details: String| ModelLoadError::Io {
            path: path.clone(),
            details,
        };
        validate_not_symlink(&path, "read").map_err(|e| io_error(e.to_string()))?;
        let metadata = fs::metadata(&path).map_err(|e| io_error(e.to_string()))?;
        validate_file_size(metadata.len(), &path, MAX_FILE_SIZE)
            .map_err(|e| io_error(e.to_string()))?;
        let content = fs::read(&path).map_err(|e| io_error(e.to_string()))?;

        let corrupt = |details: String| ModelLoadError::Corrupt {
            path: path.clone(),
            details,
        };
        let split = content
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| corrupt("missing header line".to_string()))?;
        let (header_line, body) = (&content[..split], &content[split + 1..]);

        let header: Header = serde_json::from_slice(header_line)
            .map_err(|e| corrupt(format!("unreadable header: {}", e)))?;
        if header.format != FORMAT_NAME || header.version != FORMAT_VERSION {
            return Err(ModelLoadError::FormatMismatch {
                found: format!("{} v{}", header.format, header.version),
                expected: format!("{} v{}", FORMAT_NAME, FORMAT_VERSION),
            });
        }
        if digest(body) != header.digest {
            return Err(corrupt("checksum mismatch".to_string()));
        }

        let model: ApplicationModel =
            serde_json::from_slice(body).map_err(|e| corrupt(e.to_string()))?;

        let missing: Vec<PathBuf> = model
            .missing_paths()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();
        if !missing.is_empty() {
            return Err(ModelLoadError::Stale { missing });
        }

        debug!(path = %path.display(), written = ?header.written, "application model loaded");
        Ok(model)
    }
}
