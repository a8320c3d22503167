use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::filename::local_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::wire::{
    CookieStatusResponse, DownloadsListResponse, InfoResponse, ProgressResponse,
    StartResponse, StatusResponse,
};
use crate::{
    ApiError, DownloadTicket, EngineError, FailureKind, JobProgress, LibraryItem, VideoInfo,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server: String,
    pub connect_timeout: Duration,
    /// Applies to every JSON request.
    pub request_timeout: Duration,
    /// Applies to binary file transfers, which can be much larger.
    pub transfer_timeout: Duration,
    pub download_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(600),
            download_dir: PathBuf::from("downloads"),
        }
    }
}

/// The REST collaborator: one method per server endpoint.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn video_info(&self, url: &str) -> Result<VideoInfo, ApiError>;
    async fn start_download(&self, url: &str) -> Result<DownloadTicket, ApiError>;
    async fn progress(&self, job_id: &str) -> Result<JobProgress, ApiError>;
    async fn list_downloads(&self) -> Result<Vec<LibraryItem>, ApiError>;
    async fn delete(&self, filename: &str) -> Result<(), ApiError>;
    /// Fetch `filename` as binary and store it in the local download directory.
    async fn save_file(&self, filename: &str) -> Result<PathBuf, ApiError>;
    async fn cookie_status(&self) -> Result<bool, ApiError>;
    /// URL a player can stream `filename` from.
    fn stream_url(&self, filename: &str) -> Result<Url, ApiError>;
}

#[derive(Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: Url,
    settings: ClientSettings,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let base_url = Url::parse(&settings.server)
            .map_err(|err| EngineError::ServerUrl(format!("{}: {err}", settings.server)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(EngineError::ServerUrl(settings.server.clone()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "server url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response, ApiError> {
        engine_debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .send()
            .await
            .map_err(map_reqwest_error)
    }

    async fn post_url<T: DeserializeOwned>(&self, path: &str, video_url: &str) -> Result<T, ApiError> {
        let endpoint = self.endpoint(&[path])?;
        engine_debug!("POST {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .json(&UrlRequest { url: video_url })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.send(Method::GET, self.endpoint(segments)?).await?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn video_info(&self, url: &str) -> Result<VideoInfo, ApiError> {
        self.post_url::<InfoResponse>("info", url)
            .await?
            .into_result()
    }

    async fn start_download(&self, url: &str) -> Result<DownloadTicket, ApiError> {
        self.post_url::<StartResponse>("download-mp3", url)
            .await?
            .into_result()
    }

    async fn progress(&self, job_id: &str) -> Result<JobProgress, ApiError> {
        self.get_json::<ProgressResponse>(&["progress", job_id])
            .await?
            .normalize()
    }

    async fn list_downloads(&self) -> Result<Vec<LibraryItem>, ApiError> {
        self.get_json::<DownloadsListResponse>(&["downloads-list"])
            .await?
            .into_result()
    }

    async fn delete(&self, filename: &str) -> Result<(), ApiError> {
        let response = self
            .send(Method::DELETE, self.endpoint(&["delete", filename])?)
            .await?;
        read_json::<StatusResponse>(response).await?.into_result()
    }

    async fn save_file(&self, filename: &str) -> Result<PathBuf, ApiError> {
        let endpoint = self.endpoint(&["get-file", filename])?;
        engine_debug!("GET {}", endpoint);
        let response = self
            .client
            .get(endpoint)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // Error envelopes are JSON; fall back to the bare status otherwise.
            return Err(match read_json::<StatusResponse>(response).await {
                Ok(envelope) => envelope
                    .into_result()
                    .err()
                    .unwrap_or_else(|| status_error(status)),
                Err(err) => err,
            });
        }

        let writer = AtomicFileWriter::new(self.settings.download_dir.clone());
        let mut pending = writer.begin(&local_filename(filename)).map_err(map_persist_error)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            pending.write_chunk(&chunk).map_err(map_persist_error)?;
        }
        engine_debug!("saved {} bytes for {}", pending.written(), filename);
        pending.commit().map_err(map_persist_error)
    }

    async fn cookie_status(&self) -> Result<bool, ApiError> {
        self.get_json::<CookieStatusResponse>(&["cookie-status"])
            .await?
            .into_result()
    }

    fn stream_url(&self, filename: &str) -> Result<Url, ApiError> {
        self.endpoint(&["play-audio", filename])
    }
}

/// Decode a JSON body, keeping server error envelopes sent with non-2xx codes.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(status_error(status)),
        Err(err) => {
            engine_warn!("undecodable response body ({} bytes): {}", body.len(), err);
            Err(ApiError::new(FailureKind::Decode, err.to_string()))
        }
    }
}

fn status_error(status: reqwest::StatusCode) -> ApiError {
    ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

fn map_persist_error(err: PersistError) -> ApiError {
    ApiError::new(FailureKind::Io, err.to_string())
}
