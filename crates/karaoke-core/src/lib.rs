//! Karaoke Core Library
//!
//! This crate provides the domain models, error types, configuration, session context and
//! the upload/job lifecycle controller shared by the API client and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod route;
pub mod session;
pub mod token;
pub mod upload;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{log_error, AppError, ErrorMetadata, LogLevel, UploadError, UploadWarning};
pub use models::{AlbumId, JobId, LanguageHint, SelectedFile};
pub use route::{Redirect, Route};
pub use session::SessionContext;
pub use token::{FileTokenStore, StaticToken, TokenStore};
pub use upload::{
    ArtifactSink, DirectorySink, LifecycleState, ProcessError, ProcessRequest, ProcessedArtifact,
    UploadController, UploadOutcome, VideoProcessor,
};
