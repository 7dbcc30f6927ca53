pub mod config;
pub mod error;
pub mod fs;
pub mod import_export;
pub mod models;
pub mod record;
pub mod utils;

// Re-export error types for convenience
pub use error::MarktreeError;
