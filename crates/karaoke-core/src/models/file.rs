use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::error::AppError;

/// Extensions accepted by the processing endpoint, with the MIME type declared on upload.
const SUPPORTED_FORMATS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("wav", "audio/wav"),
    ("aac", "audio/aac"),
    ("m4a", "audio/mp4"),
    ("wma", "audio/x-ms-wma"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("aiff", "audio/aiff"),
    ("m4r", "audio/mp4"),
    ("amr", "audio/amr"),
    ("oga", "audio/ogg"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/avi"),
    ("m4v", "video/x-m4v"),
    ("wmv", "video/x-ms-wmv"),
    ("ts", "video/mp2t"),
    ("rmvb", "application/vnd.rn-realmedia-vbr"),
    ("ape", "audio/ape"),
    ("opus", "audio/opus"),
    ("mts", "video/mp2t"),
];

pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    SUPPORTED_FORMATS.iter().map(|(ext, _)| *ext)
}

/// A local media file chosen for processing. Only the handle is kept; bytes are read at
/// submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

impl SelectedFile {
    /// Build a selection from a path, rejecting unsupported formats.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(AppError::InvalidInput(format!(
                "Invalid path: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid path: {}", path.display())))?
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let content_type = SUPPORTED_FORMATS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| mime.to_string())
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Unsupported format: {} (supported: {})",
                    file_name,
                    supported_extensions().collect::<Vec<_>>().join(", ")
                ))
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            content_type,
        })
    }

    /// File name without its last extension.
    pub fn display_name(&self) -> &str {
        display_name(&self.file_name)
    }
}

/// Strip the last extension from a file name. Names without one are returned whole.
pub fn display_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}
