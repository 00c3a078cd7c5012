/// Persistence adapters for the resolved application model
mod file_model_store;

pub use file_model_store::FileModelStore;
