/// Use cases module containing application business logic orchestration
mod curate_app_model;
mod install_artifact;
mod show_app_model;
mod validate_extension;

pub use curate_app_model::CurateAppModelUseCase;
pub use install_artifact::InstallArtifactUseCase;
pub use show_app_model::ShowAppModelUseCase;
pub use validate_extension::ValidateExtensionUseCase;
