/// Mock implementations for testing
mod mock_artifact_resolver;
mod mock_extension_reader;
mod mock_progress_reporter;

pub use mock_artifact_resolver::InMemoryArtifactResolver;
pub use mock_extension_reader::MockExtensionReader;
pub use mock_progress_reporter::{MockProgressReporter, ProgressEvent};
