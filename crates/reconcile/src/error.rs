//! Error types for reconciliation.
//!
//! [`BackendError`] is what a live deployment system reports for a single
//! call. The executor isolates it per release; only a failing live query
//! escalates it into a reconciliation [`Error`].

use thiserror::Error;

/// Errors raised by a [`Backend`](crate::Backend) call.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend command ran and reported failure
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// Release not known to the backend
    #[error("release not found: {name}")]
    NotFound {
        /// Name of the release that could not be found
        name: String,
    },

    /// Backend could not be reached at all
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// Details about why the backend is unreachable
        message: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Create an error from the stderr of a failed backend command.
    ///
    /// Recognises the common "not found" and connectivity messages; anything
    /// else is a plain command failure.
    pub fn from_command_output(command: &str, stderr: &str, release: Option<&str>) -> Self {
        let stderr_lower = stderr.to_lowercase();

        if stderr_lower.contains("not found")
            && let Some(name) = release
        {
            return Self::NotFound {
                name: name.to_string(),
            };
        }

        if stderr_lower.contains("kubernetes cluster unreachable")
            || stderr_lower.contains("connection refused")
            || stderr_lower.contains("no such host")
            || stderr_lower.contains("i/o timeout")
        {
            return Self::Unavailable {
                message: stderr.trim().to_string(),
            };
        }

        Self::CommandFailed {
            message: format!(
                "{command} failed{}",
                release.map(|n| format!(" for {n}")).unwrap_or_default()
            ),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing to reconcile
    #[error("no releases to reconcile")]
    EmptyInput,

    /// Querying the live release set failed
    #[error("live release query failed: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
