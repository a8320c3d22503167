use std::path::PathBuf;

use thiserror::Error;

/// Server-issued job token.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Downloading,
    Completed,
    Error,
}

/// Status of a conversion job, independent of which response shape carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub status: JobStatus,
    pub progress: f32,
    pub error: Option<String>,
}

/// Video length as the server sent it: plain seconds, or preformatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoDuration {
    Seconds(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub uploader: String,
    pub duration: VideoDuration,
    pub view_count: u64,
    pub thumbnail: String,
    pub already_downloaded: bool,
    pub cookies_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTicket {
    pub download_id: JobId,
    pub cookies_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    pub filename: String,
    pub name: String,
    pub size: u64,
    pub size_formatted: Option<String>,
    /// Unix seconds.
    pub modified: f64,
    pub modified_formatted: Option<String>,
    pub duration_formatted: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    InfoFetched {
        url: String,
        result: Result<VideoInfo, ApiError>,
    },
    DownloadStarted {
        url: String,
        result: Result<DownloadTicket, ApiError>,
    },
    Progress {
        job_id: JobId,
        result: Result<JobProgress, ApiError>,
    },
    LibraryListed(Result<Vec<LibraryItem>, ApiError>),
    Deleted {
        filename: String,
        result: Result<(), ApiError>,
    },
    Saved {
        filename: String,
        result: Result<PathBuf, ApiError>,
    },
    CookieStatus(Result<bool, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when the server itself answered with `success: false`.
    pub fn is_server_reported(&self) -> bool {
        matches!(self.kind, FailureKind::Server { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("malformed response")]
    Decode,
    #[error("file error")]
    Io,
    #[error("server error")]
    Server {
        code: Option<String>,
        existing_file: Option<String>,
    },
}
