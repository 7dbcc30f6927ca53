pub mod export;
pub mod import;
pub mod template;

// Re-export main functions for convenience
pub use export::{convert_file, ConversionSummary, ConvertOptions, Converter, INDEX_FILE_NAME};
pub use import::{load_document, parse_document, repair_markup};
pub use template::RecordTemplate;
