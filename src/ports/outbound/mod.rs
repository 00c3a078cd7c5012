/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to reach repositories, the file system and the console.
pub mod artifact_resolver;
pub mod extension_descriptor_reader;
pub mod model_formatter;
pub mod model_store;
pub mod output_presenter;
pub mod progress_reporter;
pub mod project_descriptor_reader;

pub use artifact_resolver::{ArtifactResolver, ResolvedArtifact};
pub use extension_descriptor_reader::ExtensionDescriptorReader;
pub use model_formatter::ModelFormatter;
pub use model_store::ModelStore;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use project_descriptor_reader::{ProjectDescriptor, ProjectDescriptorReader};
