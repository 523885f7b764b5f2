//! Upload/job lifecycle controller.
//!
//! Drives one media file through `POST /procesar-video/` and hands the resulting job id to
//! the result viewer:
//!
//! ```text
//!   Idle --select_file--> Submitting --submit--> Complete
//!    ^                        |   |
//!    |        cancel          |   +--------------> Failed
//!    +------------------------+
//! ```
//!
//! `Complete` and `Failed` are terminal for an attempt; selecting a new file starts over
//! from `Idle`. Nothing is retried automatically.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::{log_error, AppError, UploadError, UploadWarning};
use crate::models::{AlbumId, JobId, LanguageHint, SelectedFile};
use crate::route::{Redirect, Route};
use crate::session::SessionContext;
use crate::token::TokenStore;

const ARTIFACT_SUFFIX: &str = "_karaoke";
const DEFAULT_ARTIFACT_EXTENSION: &str = "mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Idle,
    Submitting,
    Complete,
    Failed,
}

/// Everything sent to the processing endpoint for one submission.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
    pub language: LanguageHint,
    pub album_id: Option<AlbumId>,
    pub bearer_token: Option<String>,
}

/// Successful response of the processing endpoint.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    pub bytes: Bytes,
    /// Value of the `X-Job-ID` response header, if the server exposed it.
    pub job_id: Option<JobId>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Error {status}: {status_text}")]
    Server { status: u16, status_text: String },
}

impl From<ProcessError> for UploadError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Transport(msg) => UploadError::Transport(msg),
            ProcessError::Server {
                status,
                status_text,
            } => UploadError::Server {
                status,
                status_text,
            },
        }
    }
}

/// Remote processing endpoint.
#[async_trait]
pub trait VideoProcessor: Send + Sync {
    async fn process_video(
        &self,
        request: ProcessRequest,
    ) -> Result<ProcessedArtifact, ProcessError>;
}

#[async_trait]
impl<T: VideoProcessor + ?Sized> VideoProcessor for Arc<T> {
    async fn process_video(
        &self,
        request: ProcessRequest,
    ) -> Result<ProcessedArtifact, ProcessError> {
        (**self).process_video(request).await
    }
}

/// Local destination of processed artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Save `bytes` under `file_name` and return where they ended up.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}

#[async_trait]
impl<T: ArtifactSink + ?Sized> ArtifactSink for Arc<T> {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        (**self).save(file_name, bytes).await
    }
}

/// Saves artifacts into a download directory. Existing files are never overwritten; a
/// ` (n)` suffix is added instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };
        let mut path = self.dir.join(file_name);
        let mut n = 1;
        // create_new makes the existence check and the create one atomic step.
        let mut file = loop {
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break file,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    let candidate = match ext {
                        Some(ext) => format!("{} ({}).{}", stem, n, ext),
                        None => format!("{} ({})", stem, n),
                    };
                    path = self.dir.join(candidate);
                    n += 1;
                }
                Err(err) => return Err(err.into()),
            }
        };

        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(path)
    }
}

/// Result of a completed submission.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub artifact_name: String,
    pub artifact_path: PathBuf,
    pub job_id: Option<JobId>,
    /// Set when the artifact arrived without a job id.
    #[serde(skip)]
    pub warning: Option<UploadWarning>,
}

impl UploadOutcome {
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

/// Name of the saved artifact: `<base>_karaoke.<ext>`.
pub fn artifact_file_name(base_name: &str, content_type: Option<&str>) -> String {
    format!(
        "{}{}.{}",
        base_name,
        ARTIFACT_SUFFIX,
        extension_for(content_type)
    )
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase());
    match mime.as_deref() {
        Some("video/webm") => "webm",
        Some("video/x-matroska") => "mkv",
        Some("video/quicktime") => "mov",
        Some("audio/mpeg") | Some("audio/mp3") => "mp3",
        Some("audio/wav") | Some("audio/x-wav") | Some("audio/wave") => "wav",
        _ => DEFAULT_ARTIFACT_EXTENSION,
    }
}

pub struct UploadController<P, S, T> {
    album_id: AlbumId,
    state: LifecycleState,
    selection: Option<(SelectedFile, LanguageHint)>,
    session: SessionContext,
    processor: P,
    sink: S,
    tokens: T,
}

impl<P, S, T> UploadController<P, S, T>
where
    P: VideoProcessor,
    S: ArtifactSink,
    T: TokenStore,
{
    /// Enter the upload view. Without an album there is nothing to upload into, so the
    /// caller is sent back to the album picker and no request is ever made.
    pub fn enter(
        album_id: Option<AlbumId>,
        processor: P,
        sink: S,
        tokens: T,
    ) -> Result<Self, Redirect> {
        let Some(album_id) = album_id else {
            log_error(&UploadError::PreconditionFailed);
            return Err(Redirect::to_album_picker(
                UploadError::PreconditionFailed.to_string(),
            ));
        };

        tracing::debug!(album_id = album_id, "Upload controller ready");
        Ok(Self {
            album_id,
            state: LifecycleState::Idle,
            selection: None,
            session: SessionContext::new(),
            processor,
            sink,
            tokens,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn album_id(&self) -> AlbumId {
        self.album_id
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.as_ref().map(|(file, _)| file)
    }

    pub fn language(&self) -> Option<LanguageHint> {
        self.selection.as_ref().map(|(_, language)| *language)
    }

    /// Choose a file to process. Forgets the job id of any earlier upload so it can never
    /// be shown as the result of this one.
    pub fn select_file(
        &mut self,
        file: SelectedFile,
        language: LanguageHint,
    ) -> Result<(), UploadError> {
        match self.state {
            LifecycleState::Submitting => {
                let err = UploadError::AlreadySubmitting;
                log_error(&err);
                return Err(err);
            }
            LifecycleState::Complete | LifecycleState::Failed => self.reset(),
            LifecycleState::Idle => {}
        }

        self.session.begin(file.display_name());
        tracing::info!(
            album_id = self.album_id,
            file_name = %file.file_name,
            language = %language,
            "File selected"
        );
        self.selection = Some((file, language));
        self.state = LifecycleState::Submitting;
        Ok(())
    }

    /// Send the selected file and wait for the processed artifact.
    ///
    /// Cancelling `cancel` drops the in-flight request and returns the controller to `Idle`.
    pub async fn submit(&mut self, cancel: CancellationToken) -> Result<UploadOutcome, UploadError> {
        let (file, language) = match (&self.state, &self.selection) {
            (LifecycleState::Submitting, Some((file, language))) => (file.clone(), *language),
            _ => {
                let err = UploadError::NothingSelected;
                log_error(&err);
                return Err(err);
            }
        };

        let bearer_token = match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                log_error(&e);
                tracing::warn!("Could not read access token, sending request without it");
                None
            }
        };
        if bearer_token.is_none() {
            tracing::warn!("No access token available; the server will likely reject the upload");
        }

        let album_id = self.album_id;
        let processor = &self.processor;
        let work = async move {
            let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
                UploadError::Transport(format!("Failed to read {}: {}", file.path.display(), e))
            })?;
            tracing::info!(
                album_id = album_id,
                file_name = %file.file_name,
                size_bytes = bytes.len(),
                "Submitting file for processing"
            );
            let request = ProcessRequest {
                file_name: file.file_name,
                content_type: file.content_type,
                bytes: Bytes::from(bytes),
                language,
                album_id: Some(album_id),
                bearer_token,
            };
            processor
                .process_video(request)
                .await
                .map_err(UploadError::from)
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = work => Some(result),
        };

        let artifact = match result {
            None => {
                self.reset();
                let err = UploadError::Cancelled;
                log_error(&err);
                return Err(err);
            }
            Some(Err(err)) => return Err(self.fail(err)),
            Some(Ok(artifact)) => artifact,
        };

        let base_name = self
            .session
            .original_file_name()
            .unwrap_or_default()
            .to_string();
        let artifact_name = artifact_file_name(&base_name, artifact.content_type.as_deref());
        let artifact_path = match self.sink.save(&artifact_name, &artifact.bytes).await {
            Ok(path) => path,
            Err(e) => {
                log_error(&e);
                return Err(self.fail(UploadError::ArtifactSave(e.to_string())));
            }
        };

        let warning = match &artifact.job_id {
            Some(job_id) => {
                self.session.record_job(job_id.clone());
                None
            }
            None => {
                tracing::warn!(
                    album_id = self.album_id,
                    artifact = %artifact_name,
                    "Response carried no X-Job-ID header; result page will be unavailable"
                );
                Some(UploadWarning::MissingJobId)
            }
        };

        self.state = LifecycleState::Complete;
        tracing::info!(
            album_id = self.album_id,
            job_id = artifact.job_id.as_ref().map(JobId::as_str).unwrap_or("-"),
            path = %artifact_path.display(),
            "Processed artifact saved"
        );

        Ok(UploadOutcome {
            artifact_name,
            artifact_path,
            job_id: artifact.job_id,
            warning,
        })
    }

    /// Select `file` and submit it right away.
    pub async fn process(
        &mut self,
        file: SelectedFile,
        language: LanguageHint,
        cancel: CancellationToken,
    ) -> Result<UploadOutcome, UploadError> {
        self.select_file(file, language)?;
        self.submit(cancel).await
    }

    /// Route to the result of the completed job. `None` unless the last submission
    /// completed with a job id.
    pub fn view_result(&self) -> Option<Route> {
        if self.state != LifecycleState::Complete {
            return None;
        }
        self.session
            .current_job_id()
            .map(|job_id| Route::VideoDetails {
                job_id: job_id.clone(),
            })
    }

    /// Back to `Idle` with nothing selected.
    pub fn reset(&mut self) {
        self.selection = None;
        self.session.clear();
        self.state = LifecycleState::Idle;
    }

    fn fail(&mut self, err: UploadError) -> UploadError {
        log_error(&err);
        self.selection = None;
        self.state = LifecycleState::Failed;
        err
    }
}
