use crate::ports::outbound::{ModelFormatter, ModelStore, OutputPresenter};
use crate::shared::Result;
use std::path::Path;

/// ShowAppModelUseCase - renders a persisted application model
///
/// Reads only what an earlier `resolve` run persisted; nothing is resolved.
pub struct ShowAppModelUseCase<S> {
    model_store: S,
    formatter: Box<dyn ModelFormatter>,
    presenter: Box<dyn OutputPresenter>,
}

impl<S: ModelStore> ShowAppModelUseCase<S> {
    pub fn new(
        model_store: S,
        formatter: Box<dyn ModelFormatter>,
        presenter: Box<dyn OutputPresenter>,
    ) -> Self {
        Self {
            model_store,
            formatter,
            presenter,
        }
    }

    /// Loads the model persisted under `output_dir` and presents it.
    ///
    /// # Errors
    /// Returns an error if the model cannot be loaded or the output written
    pub fn execute(&self, output_dir: &Path) -> Result<()> {
        let model = self.model_store.load(output_dir)?;
        let rendered = self.formatter.format(&model)?;
        self.presenter.present(&rendered)
    }
}
