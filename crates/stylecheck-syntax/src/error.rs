//! Error types for the syntax layer.
//!
//! Problems in the style sheet itself are never reported here: they become
//! [`ErrorToken`](crate::token::ErrorToken)s. This type covers failures of the
//! surrounding machinery only.

/// Result type alias for syntax operations.
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors that can occur outside of style sheet diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// Reading the style sheet source failed.
    #[error("Failed to read style sheet source: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// A token stream was built from an empty token list.
    #[error("Token stream requires at least one token")]
    EmptyTokenStream,

    /// A token stream was built from a list that does not end in EOF.
    #[error("Token stream must end with an EOF token, found {found}")]
    MissingEof { found: String },
}

impl SyntaxError {
    /// Create an I/O error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    /// Create a missing-EOF error.
    pub fn missing_eof(found: impl Into<String>) -> Self {
        Self::MissingEof {
            found: found.into(),
        }
    }
}
