pub mod application_model;
pub mod artifact_pattern;
pub mod coords;
pub mod dependency;
pub mod dependency_node;
pub mod descriptor;
pub mod extension;
pub mod flags;
pub mod mode;
pub mod platform;
pub mod resolved_dependency;

pub use application_model::{ApplicationModel, ApplicationModelBuilder};
pub use artifact_pattern::ArtifactPattern;
pub use coords::{ArtifactCoords, ArtifactKey};
pub use dependency::{Dependency, Scope};
pub use dependency_node::DependencyNode;
pub use descriptor::{ArtifactDescriptor, CollectRequest};
pub use extension::{ExtensionCapabilities, ExtensionDescriptor};
pub use flags::DependencyFlags;
pub use mode::ResolutionMode;
pub use platform::{PlatformImports, PlatformInfo, PlatformReleaseInfo, PlatformStreamInfo};
pub use resolved_dependency::ResolvedDependency;
