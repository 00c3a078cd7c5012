mod conflict_resolver;
mod dependency_collector;
mod deployment_validator;
mod fingerprint;
mod reloadable_modules;

pub use conflict_resolver::{ConflictResolver, ResolvedNode};
pub use dependency_collector::DependencyCollector;
pub use deployment_validator::{DeploymentValidator, MISSING_IN_DEPLOYMENT_MODULE};
pub use fingerprint::{sha256_hex, Fingerprint};
pub use reloadable_modules::ReloadableModules;
