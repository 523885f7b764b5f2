//! Domain methods for the karaoke API client.
//!
//! Album and video types come from `karaoke_core::models`. Videos are addressed by job id.

use crate::{apply_bearer, ApiClient};
use anyhow::Result;
use async_trait::async_trait;
use karaoke_core::models::{
    Album, AlbumId, CreateAlbumRequest, JobId, MoveVideoRequest, UpdateAlbumRequest, Video,
};
use karaoke_core::upload::{ProcessError, ProcessRequest, ProcessedArtifact, VideoProcessor};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};

/// Response header carrying the id of the processing job.
pub const JOB_ID_HEADER: &str = "X-Job-ID";
pub const PROCESS_VIDEO_PATH: &str = "/procesar-video/";

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

impl ApiClient {
    /// List the albums of a user.
    pub async fn list_albums(&self, user_id: i64) -> Result<Vec<Album>> {
        self.get("/albums", &[("userId", user_id.to_string())])
            .await
    }

    pub async fn get_album(&self, album_id: AlbumId) -> Result<Album> {
        self.get(&format!("/albums/{}", album_id), &[]).await
    }

    pub async fn create_album(&self, request: &CreateAlbumRequest) -> Result<Album> {
        self.post_json("/albums", request).await
    }

    pub async fn update_album(
        &self,
        album_id: AlbumId,
        request: &UpdateAlbumRequest,
    ) -> Result<Album> {
        self.put_json(&format!("/albums/{}", album_id), request)
            .await
    }

    /// Delete an album. The server deletes its videos as well.
    pub async fn delete_album(&self, album_id: AlbumId) -> Result<()> {
        self.delete(&format!("/albums/{}", album_id)).await
    }

    pub async fn list_album_videos(&self, album_id: AlbumId) -> Result<Vec<Video>> {
        self.get(&format!("/albums/{}/videos", album_id), &[])
            .await
    }

    pub async fn get_video(&self, job_id: &JobId) -> Result<Video> {
        self.get(&format!("/videos/{}", encode(job_id.as_str())), &[])
            .await
    }

    pub async fn move_video(&self, job_id: &JobId, album_id: AlbumId) -> Result<Video> {
        self.put_json(
            &format!("/videos/{}/move", encode(job_id.as_str())),
            &MoveVideoRequest { album_id },
        )
        .await
    }

    pub async fn delete_video(&self, job_id: &JobId) -> Result<()> {
        self.delete(&format!("/videos/{}", encode(job_id.as_str())))
            .await
    }

    /// Thumbnail URL of a processed video (does not call the API).
    pub fn thumbnail_url(&self, job_id: &JobId) -> String {
        self.build_url(&format!(
            "/descargar/thumbnail/{}",
            encode(job_id.as_str())
        ))
    }

    pub async fn download_thumbnail(&self, job_id: &JobId) -> Result<bytes::Bytes> {
        self.get_bytes(&format!(
            "/descargar/thumbnail/{}",
            encode(job_id.as_str())
        ))
        .await
    }

    /// Submit a file for voice separation and wait for the processed artifact.
    pub async fn submit_video(
        &self,
        request: ProcessRequest,
    ) -> Result<ProcessedArtifact, ProcessError> {
        let file_part = Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| ProcessError::Transport(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("language", request.language.as_str().to_string());
        if let Some(album_id) = request.album_id {
            form = form.text("album_id", album_id.to_string());
        }

        let http_request = self
            .client()
            .post(self.build_url(PROCESS_VIDEO_PATH))
            .multipart(form);
        let response = apply_bearer(http_request, request.bearer_token.as_deref())
            .send()
            .await
            .map_err(|e| ProcessError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), file_name = %request.file_name, "Processing rejected");
            return Err(ProcessError::Server {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let job_id = response
            .headers()
            .get(JOB_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| JobId::new(value).ok());
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProcessError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(ProcessedArtifact {
            bytes,
            job_id,
            content_type,
        })
    }
}

#[async_trait]
impl VideoProcessor for ApiClient {
    async fn process_video(
        &self,
        request: ProcessRequest,
    ) -> Result<ProcessedArtifact, ProcessError> {
        self.submit_video(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use karaoke_core::models::LanguageHint;
    use karaoke_core::{DirectorySink, LifecycleState, StaticToken, UploadController};
    use karaoke_core::SelectedFile;
    use mockito::Matcher;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(server.url(), Some("tok".to_string()), Duration::from_secs(5)).unwrap()
    }

    fn process_request() -> ProcessRequest {
        ProcessRequest {
            file_name: "song.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            bytes: Bytes::from_static(b"original media"),
            language: LanguageHint::En,
            album_id: Some(7),
            bearer_token: Some("tok".to_string()),
        }
    }

    fn album_json(id: i64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "description": null,
            "created_at": "2025-03-01T10:15:00"
        })
    }

    #[tokio::test]
    async fn submit_video_sends_multipart_and_reads_job_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PROCESS_VIDEO_PATH)
            .match_header("authorization", "Bearer tok")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_header("content-length", Matcher::Regex(r"^\d+$".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"file\"; filename=\"song.mp3\"".into()),
                Matcher::Regex("original media".into()),
                Matcher::Regex("name=\"language\"\r\n\r\nen".into()),
                Matcher::Regex("name=\"album_id\"\r\n\r\n7".into()),
            ]))
            .with_status(200)
            .with_header("X-Job-ID", "abc123")
            .with_header("content-type", "video/mp4")
            .with_body("karaoke bytes")
            .create_async()
            .await;

        let artifact = client(&server)
            .submit_video(process_request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(artifact.job_id.unwrap().as_str(), "abc123");
        assert_eq!(artifact.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(&artifact.bytes[..], b"karaoke bytes");
    }

    #[tokio::test]
    async fn submit_video_without_job_header() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PROCESS_VIDEO_PATH)
            .with_status(200)
            .with_body("karaoke bytes")
            .create_async()
            .await;

        let artifact = client(&server)
            .submit_video(process_request())
            .await
            .unwrap();
        assert!(artifact.job_id.is_none());
    }

    #[tokio::test]
    async fn submit_video_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PROCESS_VIDEO_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client(&server)
            .submit_video(process_request())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProcessError::Server {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn submit_video_maps_transport_error() {
        let client = ApiClient::new(
            "http://127.0.0.1:1".to_string(),
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.submit_video(process_request()).await.unwrap_err();
        assert!(matches!(err, ProcessError::Transport(_)));
    }

    #[tokio::test]
    async fn controller_end_to_end_against_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PROCESS_VIDEO_PATH)
            .match_header("authorization", "Bearer stored-token")
            .with_status(200)
            .with_header("X-Job-ID", "abc123")
            .with_body("karaoke bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("song.mp3");
        std::fs::write(&input, b"original media").unwrap();
        let downloads = dir.path().join("downloads");

        let mut controller = UploadController::enter(
            Some(7),
            client(&server),
            DirectorySink::new(&downloads),
            StaticToken(Some("stored-token".to_string())),
        )
        .unwrap();

        let outcome = controller
            .process(
                SelectedFile::from_path(&input).unwrap(),
                LanguageHint::En,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(controller.state(), LifecycleState::Complete);
        assert_eq!(outcome.artifact_path, downloads.join("song_karaoke.mp4"));
        assert_eq!(std::fs::read(&outcome.artifact_path).unwrap(), b"karaoke bytes");
        assert_eq!(
            controller.view_result().unwrap().path(),
            "/videos/abc123"
        );
    }

    #[tokio::test]
    async fn list_albums_by_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/albums")
            .match_query(Matcher::UrlEncoded("userId".into(), "4".into()))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([album_json(1, "Covers"), album_json(2, "Live")]).to_string(),
            )
            .create_async()
            .await;

        let albums = client(&server).list_albums(4).await.unwrap();

        mock.assert_async().await;
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[1].name, "Live");
    }

    #[tokio::test]
    async fn create_and_rename_album() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/albums")
            .match_body(Matcher::Json(
                serde_json::json!({ "name": "Covers", "user_id": 4 }),
            ))
            .with_status(201)
            .with_body(album_json(9, "Covers").to_string())
            .create_async()
            .await;
        let rename = server
            .mock("PUT", "/albums/9")
            .match_body(Matcher::Json(serde_json::json!({ "name": "Acoustic" })))
            .with_status(200)
            .with_body(album_json(9, "Acoustic").to_string())
            .create_async()
            .await;

        let client = client(&server);
        let created = client
            .create_album(&CreateAlbumRequest::new("Covers", 4).unwrap())
            .await
            .unwrap();
        let renamed = client
            .update_album(created.id, &UpdateAlbumRequest::rename("Acoustic").unwrap())
            .await
            .unwrap();

        create.assert_async().await;
        rename.assert_async().await;
        assert_eq!(renamed.name, "Acoustic");
    }

    #[tokio::test]
    async fn delete_album_reports_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/albums/3")
            .with_status(404)
            .with_body("Album not found")
            .create_async()
            .await;

        let err = client(&server).delete_album(3).await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Album not found"));
    }

    #[tokio::test]
    async fn unauthorized_hints_at_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/albums/1")
            .with_status(401)
            .create_async()
            .await;

        let err = client(&server).get_album(1).await.unwrap_err();
        assert!(err.to_string().contains("auth set-token"));
    }

    #[tokio::test]
    async fn video_endpoints_use_job_id() {
        let mut server = mockito::Server::new_async().await;
        let video = serde_json::json!({
            "job_id": "abc123",
            "name": "song",
            "album_id": 8,
            "duration_in_seconds": 95,
            "created_at": "2025-03-01T10:15:00Z"
        });
        let get = server
            .mock("GET", "/videos/abc123")
            .with_status(200)
            .with_body(video.to_string())
            .create_async()
            .await;
        let moved = server
            .mock("PUT", "/videos/abc123/move")
            .match_body(Matcher::Json(serde_json::json!({ "album_id": 8 })))
            .with_status(200)
            .with_body(video.to_string())
            .create_async()
            .await;
        let listed = server
            .mock("GET", "/albums/8/videos")
            .with_status(200)
            .with_body(serde_json::json!([video]).to_string())
            .create_async()
            .await;

        let client = client(&server);
        let job_id = JobId::new("abc123").unwrap();
        let fetched = client.get_video(&job_id).await.unwrap();
        let after_move = client.move_video(&job_id, 8).await.unwrap();
        let videos = client.list_album_videos(8).await.unwrap();

        get.assert_async().await;
        moved.assert_async().await;
        listed.assert_async().await;
        assert_eq!(fetched.formatted_duration(), "1:35");
        assert_eq!(after_move.album_id, 8);
        assert_eq!(videos.len(), 1);
    }

    #[tokio::test]
    async fn thumbnail_download() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/descargar/thumbnail/abc123")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(b"\xff\xd8jpeg")
            .create_async()
            .await;

        let client = client(&server);
        let job_id = JobId::new("abc123").unwrap();
        assert_eq!(
            client.thumbnail_url(&job_id),
            format!("{}/descargar/thumbnail/abc123", server.url())
        );
        let bytes = client.download_thumbnail(&job_id).await.unwrap();
        assert_eq!(&bytes[..], b"\xff\xd8jpeg");
    }
}
