//! JSON contract of the download server.
//!
//! Every response is decoded leniently (all fields optional) so that error
//! envelopes sent with a non-2xx status still carry their message.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    ApiError, DownloadTicket, FailureKind, JobProgress, JobStatus, LibraryItem, VideoDuration,
    VideoInfo,
};

/// Number that some server versions send as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Lenient {
    Unsigned(u64),
    Number(f64),
    Text(String),
}

impl Lenient {
    /// Finite numeric value; `nan` and `inf` count as absent.
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Lenient::Unsigned(value) => Some(*value as f64),
            Lenient::Number(value) => Some(*value),
            Lenient::Text(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        };
        value.filter(|v: &f64| v.is_finite())
    }

    fn into_text(self) -> String {
        match self {
            Lenient::Unsigned(value) => value.to_string(),
            Lenient::Number(value) if value.fract() == 0.0 => format!("{value:.0}"),
            Lenient::Number(value) => value.to_string(),
            Lenient::Text(text) => text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfoResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    error_code: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<Lenient>,
    view_count: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    already_downloaded: bool,
    cookie_status: Option<Value>,
}

impl InfoResponse {
    pub(crate) fn into_result(self) -> Result<VideoInfo, ApiError> {
        if !self.success {
            return Err(server_error(self.error, self.error_code, None));
        }
        let duration = match self.duration {
            Some(Lenient::Text(text)) => VideoDuration::Text(text),
            Some(number) => {
                VideoDuration::Seconds(number.as_f64().unwrap_or(0.0).max(0.0) as u64)
            }
            None => VideoDuration::Seconds(0),
        };
        Ok(VideoInfo {
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            uploader: self.uploader.unwrap_or_else(|| "Unknown".to_string()),
            duration,
            view_count: self.view_count.unwrap_or(0.0).max(0.0) as u64,
            thumbnail: self.thumbnail.unwrap_or_default(),
            already_downloaded: self.already_downloaded,
            cookies_available: self.cookie_status.as_ref().and_then(cookies_flag),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartResponse {
    #[serde(default)]
    success: bool,
    download_id: Option<Lenient>,
    error: Option<String>,
    error_code: Option<String>,
    existing_file: Option<String>,
    cookie_status: Option<Value>,
}

impl StartResponse {
    pub(crate) fn into_result(self) -> Result<DownloadTicket, ApiError> {
        if !self.success {
            return Err(server_error(self.error, self.error_code, self.existing_file));
        }
        let download_id = self
            .download_id
            .map(Lenient::into_text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "response is missing download_id"))?;
        Ok(DownloadTicket {
            download_id,
            cookies_available: self.cookie_status.as_ref().and_then(cookies_flag),
        })
    }
}

/// Either `{status, progress, error?}` or `{finished, progress, error?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProgressResponse {
    status: Option<String>,
    finished: Option<bool>,
    progress: Option<Lenient>,
    error: Option<String>,
}

impl ProgressResponse {
    pub(crate) fn normalize(self) -> Result<JobProgress, ApiError> {
        let reported = self.progress.as_ref().and_then(Lenient::as_f64);
        let error = self.error.filter(|e| !e.trim().is_empty());

        let status = match (self.status.as_deref(), self.finished) {
            (Some(status), _) => parse_status(status)?,
            (None, Some(true)) if error.is_some() => JobStatus::Error,
            (None, Some(true)) => JobStatus::Completed,
            (None, Some(false)) if reported.unwrap_or(0.0) > 0.0 => JobStatus::Downloading,
            (None, Some(false)) => JobStatus::Pending,
            (None, None) => {
                return Err(ApiError::new(
                    FailureKind::Decode,
                    "progress response has neither status nor finished",
                ))
            }
        };

        let progress = match (status, reported) {
            (JobStatus::Completed, _) => 100.0,
            (_, Some(value)) => value.clamp(0.0, 100.0) as f32,
            (_, None) => 0.0,
        };
        Ok(JobProgress {
            status,
            progress,
            error,
        })
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" | "queued" | "starting" => Ok(JobStatus::Pending),
        "downloading" | "processing" | "converting" => Ok(JobStatus::Downloading),
        "completed" | "complete" | "finished" | "done" => Ok(JobStatus::Completed),
        "error" | "failed" => Ok(JobStatus::Error),
        other => Err(ApiError::new(
            FailureKind::Decode,
            format!("unknown job status {other:?}"),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadsListResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    #[serde(default)]
    downloads: Vec<DownloadEntry>,
}

#[derive(Debug, Deserialize)]
struct DownloadEntry {
    filename: String,
    name: Option<String>,
    #[serde(default)]
    size: f64,
    size_formatted: Option<String>,
    #[serde(default)]
    modified: f64,
    modified_formatted: Option<String>,
    duration_formatted: Option<String>,
}

impl DownloadsListResponse {
    pub(crate) fn into_result(self) -> Result<Vec<LibraryItem>, ApiError> {
        if !self.success {
            return Err(server_error(self.error, None, None));
        }
        Ok(self
            .downloads
            .into_iter()
            .map(|entry| LibraryItem {
                name: entry.name.unwrap_or_else(|| display_name(&entry.filename)),
                filename: entry.filename,
                size: entry.size.max(0.0) as u64,
                size_formatted: entry.size_formatted,
                modified: entry.modified,
                modified_formatted: entry.modified_formatted,
                duration_formatted: entry.duration_formatted,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    error_code: Option<String>,
}

impl StatusResponse {
    pub(crate) fn into_result(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(server_error(self.error, self.error_code, None))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CookieStatusResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    #[serde(default)]
    cookies_available: bool,
}

impl CookieStatusResponse {
    pub(crate) fn into_result(self) -> Result<bool, ApiError> {
        if self.success {
            Ok(self.cookies_available)
        } else {
            Err(server_error(self.error, None, None))
        }
    }
}

fn server_error(
    message: Option<String>,
    code: Option<String>,
    existing_file: Option<String>,
) -> ApiError {
    ApiError::new(
        FailureKind::Server {
            code,
            existing_file,
        },
        message.unwrap_or_else(|| "Unknown error".to_string()),
    )
}

/// `cookie_status` is either a bare flag or an object carrying one.
fn cookies_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Object(map) => map
            .get("cookies_available")
            .or_else(|| map.get("available"))
            .and_then(Value::as_bool),
        _ => None,
    }
}

fn display_name(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}

/// Decode and normalize one `/progress/{id}` body.
pub fn decode_progress(body: &[u8]) -> Result<JobProgress, ApiError> {
    let response: ProgressResponse = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    response.normalize()
}
