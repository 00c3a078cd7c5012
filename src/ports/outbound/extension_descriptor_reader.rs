use crate::shared::{Properties, Result};
use std::path::Path;

/// ExtensionDescriptorReader port for reading extension and platform metadata
///
/// An artifact is either a jar or, for workspace modules, a directory.
pub trait ExtensionDescriptorReader {
    /// Reads `META-INF/quarkus-extension.properties` from an artifact
    ///
    /// # Arguments
    /// * `artifact_path` - Jar file or classes directory
    ///
    /// # Returns
    /// The descriptor properties, or `None` when the artifact is not an extension
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be opened or the descriptor is
    /// unreadable
    fn read_extension_properties(&self, artifact_path: &Path) -> Result<Option<Properties>>;

    /// Reads a standalone properties artifact, such as a platform properties file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn read_properties_file(&self, path: &Path) -> Result<Properties>;
}
