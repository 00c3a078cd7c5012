use crate::resolution::domain::ApplicationModel;

/// CurationResponse - result of building (or reusing) an application model
#[derive(Debug, Clone)]
pub struct CurationResponse {
    pub model: ApplicationModel,
    /// True when the persisted model was reused without resolution
    pub reused: bool,
    /// Report of misaligned platform BOMs, if any
    pub misalignment_report: Option<String>,
}

impl CurationResponse {
    pub fn new(model: ApplicationModel, reused: bool, misalignment_report: Option<String>) -> Self {
        Self {
            model,
            reused,
            misalignment_report,
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.misalignment_report.is_none()
    }
}
