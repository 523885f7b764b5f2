//! Bearer credential storage.
//!
//! The upload controller only reads the token. Issuing and refreshing tokens belongs to the
//! server and the auth commands of the CLI.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub trait TokenStore: Send + Sync {
    /// Current bearer token, or `None` when the user is not signed in.
    fn load(&self) -> Result<Option<String>, AppError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn load(&self) -> Result<Option<String>, AppError> {
        (**self).load()
    }
}

/// Token persisted in a file between CLI invocations.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, token: &str) -> Result<(), AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidInput("Token must not be empty".to_string()));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.path.display(), "Stored access token");
        Ok(())
    }

    /// Remove the stored token. Succeeds when no token was stored.
    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Fixed token, e.g. from the `KARAOKE_TOKEN` environment variable.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenStore for StaticToken {
    fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.0.clone())
    }
}
