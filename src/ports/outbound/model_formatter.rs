use crate::resolution::domain::ApplicationModel;
use crate::shared::Result;

/// ModelFormatter port for rendering an application model
pub trait ModelFormatter {
    /// Formats the model for presentation
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, model: &ApplicationModel) -> Result<String>;
}
