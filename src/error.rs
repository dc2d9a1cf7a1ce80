use std::path::PathBuf;
use thiserror::Error;

/// amermaid error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path or URI: {0}")]
    InvalidPath(String),

    #[error("Invalid regular expression '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal inconsistency: {0}")]
    Inconsistency(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for amermaid operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create an invalid pattern error
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Error::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a metadata error
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal inconsistency error.
    ///
    /// These signal a classification case the diagram builder does not know
    /// about, so they are logged loudly on creation.
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        log::error!("internal inconsistency: {msg}");
        Error::Inconsistency(msg)
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
