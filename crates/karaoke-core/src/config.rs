//! Configuration module
//!
//! Client settings are read from the process environment after loading an optional `.env`
//! file.

use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::token::{FileTokenStore, StaticToken, TokenStore};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TOKEN_FILE: &str = ".karaoke/access_token";
/// Processing a long video can take minutes; the request stays open until it finishes.
const HTTP_TIMEOUT_SECS: u64 = 600;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Token given directly in the environment. Takes precedence over `token_file`.
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub download_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub default_user_id: Option<i64>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("KARAOKE_API_URL")
            .or_else(|| var("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(AppError::InvalidInput(format!(
                "KARAOKE_API_URL must be an http(s) URL, got {}",
                api_url
            )));
        }

        let token_file = match var("KARAOKE_TOKEN_FILE") {
            Some(path) => PathBuf::from(path),
            None => var("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(DEFAULT_TOKEN_FILE),
        };

        let http_timeout_secs = match var("KARAOKE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::InvalidInput(
                    "KARAOKE_HTTP_TIMEOUT_SECS must be a valid number".to_string(),
                )
            })?,
            None => HTTP_TIMEOUT_SECS,
        };

        let default_user_id = var("KARAOKE_USER_ID")
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    AppError::InvalidInput("KARAOKE_USER_ID must be a valid number".to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: var("KARAOKE_TOKEN").map(|t| t.trim().to_string()),
            token_file,
            download_dir: var("KARAOKE_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            http_timeout_secs,
            default_user_id,
        })
    }

    pub fn file_token_store(&self) -> FileTokenStore {
        FileTokenStore::new(self.token_file.clone())
    }

    /// Token source for API calls: the environment token if set, otherwise the token file.
    pub fn token_store(&self) -> Box<dyn TokenStore> {
        match &self.token {
            Some(token) => Box::new(StaticToken(Some(token.clone()))),
            None => Box::new(self.file_token_store()),
        }
    }
}
