//! Error types module
//!
//! `AppError` covers models, configuration and the token store. `UploadError` is the
//! taxonomy of the upload/job lifecycle controller: every variant is terminal for the
//! current submission attempt and none is retried automatically. A response without a job
//! identifier is not an error; it is reported as an [`UploadWarning`] next to a completed
//! upload.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable or degraded outcomes
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "SERVER_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether the user must acknowledge the error before continuing
    fn is_blocking(&self) -> bool;

    /// Whether this error is recoverable by retrying the same call
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn is_blocking(&self) -> bool {
        true
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Internal(_) | AppError::InternalWithSource { .. }
        )
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::InvalidInput(_) => Some("Check the arguments and try again"),
            AppError::NotFound(_) => Some("Verify the identifier exists"),
            AppError::Unauthorized(_) => Some("Run `karaoke auth set-token` with a valid token"),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                Some("Retry after a short delay")
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => LogLevel::Debug,
            AppError::Unauthorized(_) => LogLevel::Warn,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }
}

/// Terminal failures of a single upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// Entry without an album context. Surfaced to callers as a [`crate::Redirect`].
    #[error("No album selected, redirecting to album selection")]
    PreconditionFailed,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Error {status}: {status_text}")]
    Server { status: u16, status_text: String },

    #[error("A submission is already in flight for this session")]
    AlreadySubmitting,

    #[error("No file selected")]
    NothingSelected,

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Failed to save processed artifact: {0}")]
    ArtifactSave(String),
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::PreconditionFailed => "PRECONDITION_FAILED",
            UploadError::Transport(_) => "TRANSPORT_FAILURE",
            UploadError::Server { .. } => "SERVER_FAILURE",
            UploadError::AlreadySubmitting => "ALREADY_SUBMITTING",
            UploadError::NothingSelected => "NOTHING_SELECTED",
            UploadError::Cancelled => "CANCELLED",
            UploadError::ArtifactSave(_) => "ARTIFACT_SAVE_FAILURE",
        }
    }

    fn is_blocking(&self) -> bool {
        !matches!(self, UploadError::Cancelled)
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            UploadError::PreconditionFailed => Some("Pick an album before uploading"),
            UploadError::Transport(_) | UploadError::Server { .. } => {
                Some("Select the file again to retry")
            }
            UploadError::AlreadySubmitting => Some("Wait for the current upload to finish"),
            UploadError::NothingSelected => Some("Select a file first"),
            UploadError::Cancelled => None,
            UploadError::ArtifactSave(_) => Some("Check the download directory is writable"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Server { status, .. } => {
                format!("An error occurred while processing the video (status {})", status)
            }
            UploadError::Transport(_) => {
                "An error occurred while processing the video".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Cancelled | UploadError::NothingSelected => LogLevel::Debug,
            UploadError::PreconditionFailed | UploadError::AlreadySubmitting => LogLevel::Warn,
            UploadError::Transport(_)
            | UploadError::Server { .. }
            | UploadError::ArtifactSave(_) => LogLevel::Error,
        }
    }
}

/// Non-blocking diagnostics attached to a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadWarning {
    /// The server returned the artifact without an `X-Job-ID` header, so the result page
    /// cannot be opened for this upload.
    #[error("No job id received; check that the server exposes the X-Job-ID header")]
    MissingJobId,
}

/// Log an error at the level its metadata asks for.
pub fn log_error<E>(error: &E)
where
    E: ErrorMetadata + std::fmt::Display,
{
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code = error_code, "Error occurred");
        }
    }
}
