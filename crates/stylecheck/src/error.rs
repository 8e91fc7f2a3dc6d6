//! Error types for style sheet validation.

use std::path::PathBuf;

use stylecheck_syntax::SyntaxError;

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around validation.
///
/// Defects in the validated style sheet are diagnostics, not errors; these
/// cover configuration and I/O only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a configuration file failed.
    #[error("Failed to read CSS spec '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid TOML for a CSS spec.
    #[error("Invalid CSS spec TOML: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    /// A spec could not be written as TOML.
    #[error("Failed to serialize CSS spec: {source}")]
    TomlSerialize {
        #[source]
        source: toml::ser::Error,
    },

    /// A configuration document parsed but is inconsistent.
    #[error("Invalid CSS spec: {message}")]
    InvalidSpec { message: String },

    /// Reading style sheet source failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a TOML error.
    pub fn toml(source: toml::de::Error) -> Self {
        Self::Toml { source }
    }

    /// Create a TOML serialization error.
    pub fn toml_serialize(source: toml::ser::Error) -> Self {
        Self::TomlSerialize { source }
    }

    /// Create an inconsistent-spec error.
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }
}
