//! app-curator - application model curation for extension-based JVM applications
//!
//! This library resolves a Maven project's dependency graph, discovers the
//! extensions on its runtime classpath, injects their deployment artifacts and
//! produces a validated, persisted `ApplicationModel`, following hexagonal
//! architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`resolution`): coordinates, dependency trees, conflict
//!   resolution, extension and platform metadata, the application model
//! - **Application Layer** (`application`): Use cases, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Maven repository, file system, persistence,
//!   formatters and console progress
//! - **Shared** (`shared`): Error types, properties files and security checks
//!
//! # Example
//!
//! ```no_run
//! use app_curator::prelude::*;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<()> {
//! let project = PathBuf::from(".");
//! let repository = MavenRepository::offline(
//!     PathBuf::from("/home/me/.m2/repository"),
//!     Workspace::discover(&project)?,
//! );
//!
//! let use_case = CurateAppModelUseCase::new(
//!     repository,
//!     FileSystemReader::new(),
//!     FileModelStore::new(),
//!     StderrProgressReporter::new(),
//! );
//!
//! let request = CurationRequest::new(
//!     project.clone(),
//!     ResolutionMode::Prod,
//!     project.join("target/quarkus-app"),
//! );
//! let response = use_case.execute(request)?;
//!
//! let output = JsonFormatter::new().format(&response.model)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod resolution;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::persistence::FileModelStore;
    pub use crate::adapters::outbound::repository::{
        HttpTransport, MavenRepository, RemoteRepository, Workspace,
    };
    pub use crate::application::dto::{CurationRequest, CurationResponse, OutputFormat};
    pub use crate::application::use_cases::{
        CurateAppModelUseCase, InstallArtifactUseCase, ShowAppModelUseCase,
        ValidateExtensionUseCase,
    };
    pub use crate::ports::inbound::AppModelPort;
    pub use crate::ports::outbound::{
        ArtifactResolver, ExtensionDescriptorReader, ModelFormatter, ModelStore,
        OutputPresenter, ProgressReporter, ProjectDescriptorReader,
    };
    pub use crate::resolution::domain::{
        ApplicationModel, ArtifactCoords, ArtifactKey, ArtifactPattern, Dependency,
        DependencyFlags, PlatformImports, ResolutionMode, ResolvedDependency, Scope,
    };
    pub use crate::resolution::services::{ConflictResolver, DependencyCollector};
    pub use crate::shared::Result;
}
