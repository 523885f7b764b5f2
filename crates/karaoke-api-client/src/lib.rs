//! Shared HTTP client for the karaoke API.
//!
//! Provides a minimal client with bearer auth, generic JSON helpers, and domain methods
//! (albums, videos, thumbnails, and the video processing submission). The CLI uses this
//! client directly; the upload controller reaches it through `VideoProcessor`.

pub mod api;

use anyhow::{Context, Result};
use karaoke_core::ClientConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the karaoke API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create a client from configuration, reading the token from the configured store.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let token = config
            .token_store()
            .load()
            .context("Failed to read access token")?;
        if token.is_none() {
            tracing::debug!("No access token configured; requests will be unauthenticated");
        }

        Self::new(
            config.api_url.clone(),
            token,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        apply_bearer(request, self.token.as_deref())
    }

    /// Fail with the status and body text unless the response is a success.
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(anyhow::anyhow!(
                "Unauthorized - set a valid token with `karaoke auth set-token`"
            ));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(anyhow::anyhow!(
            "API request failed with status {}: {}",
            status,
            error_text
        ))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;
        Self::ensure_success(response).await
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// GET request returning the raw body.
    pub async fn get_bytes(&self, path: &str) -> Result<bytes::Bytes> {
        let request = self.client.get(self.build_url(path));
        self.send(request)
            .await?
            .bytes()
            .await
            .context("Failed to read response body")
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.put(self.build_url(path)).json(body);
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.build_url(path));
        self.send(request).await?;
        Ok(())
    }

    /// Raw client for custom requests. Caller must apply auth.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn apply_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", format!("Bearer {}", token)),
        None => request,
    }
}

// Re-export domain types for convenience.
pub use karaoke_core::models::{Album, CreateAlbumRequest, JobId, UpdateAlbumRequest, Video};
