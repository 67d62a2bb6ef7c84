//! Error types for objmove-core
//!
//! Provides a unified error type shared by the resolver, the operations and
//! the CLI. Every variant is fatal to the invocation and maps to exit code 1.

use thiserror::Error;

/// Result type alias for objmove-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for objmove operations
#[derive(Error, Debug)]
pub enum Error {
    /// Contradictory or incomplete command-line flags
    #[error("{0}")]
    Usage(String),

    /// No usable authentication method, or a bad configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity lookup or role assumption failed
    #[error("Credential resolution failed: {0}")]
    Resolution(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Listing, deletion or upload against the object store failed
    #[error("Remote operation failed: {0}")]
    Remote(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether this error was raised before any I/O because of bad flags
    pub const fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_) | Error::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("no valid authentication method supplied".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: no valid authentication method supplied"
        );

        let err = Error::NotFound("/tmp/missing".into());
        assert_eq!(err.to_string(), "Not found: /tmp/missing");
    }

    #[test]
    fn test_usage_classification() {
        assert!(Error::Usage("bad".into()).is_usage());
        assert!(Error::InvalidUrl(url::ParseError::EmptyHost).is_usage());
        assert!(!Error::Remote("boom".into()).is_usage());
    }
}
