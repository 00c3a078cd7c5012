use crate::application::dto::{CurationRequest, CurationResponse};
use crate::shared::Result;

/// AppModelPort - Inbound port for building the application model
///
/// This is the entry point adapters (CLI, build plugins) use to resolve an
/// application, or to reuse the model persisted by an earlier run.
pub trait AppModelPort {
    /// Builds the application model of a project
    ///
    /// # Arguments
    /// * `request` - Project path, mode and curation options
    ///
    /// # Returns
    /// The validated model, persisted under the request's output directory
    ///
    /// # Errors
    /// Returns an error if:
    /// - An artifact cannot be resolved
    /// - The model fails validation (every issue is listed)
    /// - Platform BOMs are misaligned in strict mode
    fn curate(&self, request: CurationRequest) -> Result<CurationResponse>;
}
