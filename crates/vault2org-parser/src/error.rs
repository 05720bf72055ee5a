//! Parser error types

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Error)]
pub enum ParserError {
    /// IO error reading file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Frontmatter parsing failed
    #[error("Frontmatter parse error: {0}")]
    FrontmatterError(String),

    /// File content is not valid UTF-8
    #[error("Invalid UTF-8 encoding in file")]
    EncodingError,
}

/// Specialized Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;

impl ParserError {
    /// Create a frontmatter error
    pub fn frontmatter(msg: impl Into<String>) -> Self {
        Self::FrontmatterError(msg.into())
    }
}

/// Errors raised by a [`Converter`](crate::Converter) while turning Markdown into Org.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The external converter could not be started
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The external converter ran but reported failure
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The converter produced bytes that are not UTF-8
    #[error("converter output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// IO error talking to the converter
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
