//! Error types for the snapshot crate
//!
//! Every variant is fatal for the operation that raised it: a snapshot is
//! either decoded completely or not at all.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding, decoding, loading or saving releases
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed base64, gzip stream or binary record
    #[error("malformed release record: {message}")]
    Format {
        /// What was wrong with the input
        message: String,
    },

    /// Release could not be represented as an encoded record
    #[error("cannot encode release '{name}': {message}")]
    Serialize {
        /// Name of the release that failed to encode
        name: String,
        /// Underlying cause
        message: String,
    },

    /// No releases were presented where at least one is required
    #[error("no releases found in snapshot")]
    EmptyInput,

    /// Reading or writing the snapshot artifact failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub(crate) fn serialize(name: &str, message: impl Into<String>) -> Self {
        Self::Serialize {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error came from malformed snapshot content
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, Error>;
