/// Result alias used across the crate; errors carry an anyhow context chain.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
