use std::path::PathBuf;

/// Error type for the marktree library
///
/// Every failure raised while loading or converting a bookmarks file ends up
/// here. The converter treats any of these as terminal for the run and rolls
/// back whatever it created.
#[derive(Debug, thiserror::Error)]
pub enum MarktreeError {
    /// The bookmarks file is missing or unreadable
    #[error("Cannot read bookmarks file {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The markup could not be parsed even after repair
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// The document has no usable bookmark structure
    #[error("Parse error: {0}")]
    Parse(String),

    /// Directory or file creation, write, removal or timestamp failure
    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Missing or non-numeric ADD_DATE / LAST_MODIFIED, missing HREF
    #[error("Malformed attribute {attribute} on <{tag}>: {value}")]
    MalformedAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    /// Record template with an unknown slot or unbalanced braces
    #[error("Invalid record template: {0}")]
    Template(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors not tied to a specific path
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using MarktreeError
pub type Result<T> = std::result::Result<T, MarktreeError>;

impl MarktreeError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MarktreeError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(tag: &str, attribute: &str, value: impl Into<String>) -> Self {
        MarktreeError::MalformedAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }
}

impl From<serde_yaml::Error> for MarktreeError {
    fn from(err: serde_yaml::Error) -> Self {
        MarktreeError::Config(err.to_string())
    }
}

impl From<tl::ParseError> for MarktreeError {
    fn from(err: tl::ParseError) -> Self {
        MarktreeError::HtmlParse(err.to_string())
    }
}
