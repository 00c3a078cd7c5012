use app_curator::prelude::*;
use app_curator::shared::Properties;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock ExtensionDescriptorReader keyed by artifact path
#[derive(Default, Clone)]
pub struct MockExtensionReader {
    extensions: HashMap<PathBuf, Properties>,
    properties_files: HashMap<PathBuf, Properties>,
}

impl MockExtensionReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, artifact_path: PathBuf, entries: &[(&str, &str)]) -> Self {
        self.extensions.insert(artifact_path, to_properties(entries));
        self
    }

    pub fn with_properties_file(mut self, path: PathBuf, entries: &[(&str, &str)]) -> Self {
        self.properties_files.insert(path, to_properties(entries));
        self
    }
}

fn to_properties(entries: &[(&str, &str)]) -> Properties {
    let mut props = Properties::new();
    for (k, v) in entries {
        props.insert(*k, *v);
    }
    props
}

impl ExtensionDescriptorReader for MockExtensionReader {
    fn read_extension_properties(&self, artifact_path: &Path) -> Result<Option<Properties>> {
        Ok(self.extensions.get(artifact_path).cloned())
    }

    fn read_properties_file(&self, path: &Path) -> Result<Properties> {
        self.properties_files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no properties file at {}", path.display()))
    }
}
