// Public modules
pub mod defaults;
pub mod directive;
pub mod error;
pub mod generate;
pub mod loader;
pub mod plan;
pub mod render;
pub mod select;
pub mod source;
pub mod stamp;
pub mod transform;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
