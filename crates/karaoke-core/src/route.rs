//! Navigation targets exchanged between the controller and the views that host it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::models::{AlbumId, JobId};

/// Characters left unescaped in a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Album list, the entry point of the application.
    AlbumPicker,
    Upload { album_id: AlbumId },
    AlbumVideos { album_id: AlbumId },
    /// Result viewer for a finished job. The job id travels as the route parameter.
    VideoDetails { job_id: JobId },
    Login,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::AlbumPicker => "/".to_string(),
            Route::Upload { .. } => "/upload".to_string(),
            Route::AlbumVideos { album_id } => format!("/albums/{}", album_id),
            Route::VideoDetails { job_id } => format!(
                "/videos/{}",
                utf8_percent_encode(job_id.as_str(), PATH_SEGMENT)
            ),
            Route::Login => "/login".to_string(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.path())
    }
}

/// Navigation-away fault raised when a view is entered without its required context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}; redirecting to {to}")]
pub struct Redirect {
    pub to: Route,
    pub reason: String,
}

impl Redirect {
    pub fn to_album_picker(reason: impl Into<String>) -> Self {
        Self {
            to: Route::AlbumPicker,
            reason: reason.into(),
        }
    }
}
