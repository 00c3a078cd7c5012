pub mod error;
pub mod properties;
pub mod result;
pub mod security;

pub use properties::Properties;
pub use result::Result;
