use std::time::Duration;

use crate::{
    JobId, LibraryEntry, NotificationAction, NotificationId, ProgressUpdate, RequestError,
    VideoMetadata,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Platform is up; load the initial library and cookie status.
    Started,
    /// Controller clock, measured from session start.
    Tick(Duration),
    /// User edited or pasted into the URL input.
    InputChanged(String),
    /// User asked for a metadata preview of the current input.
    PreviewRequested,
    /// Metadata request for `url` finished.
    InfoLoaded {
        url: String,
        result: Result<VideoMetadata, RequestError>,
    },
    /// User pressed the download trigger.
    DownloadClicked,
    /// Server accepted the conversion job for `url`.
    DownloadStarted { url: String, job_id: JobId },
    /// Server refused the conversion job for `url`.
    DownloadRejected {
        url: String,
        error: RequestError,
        existing_file: Option<String>,
    },
    /// One status poll for `job_id` finished.
    ProgressReceived {
        job_id: JobId,
        result: Result<ProgressUpdate, RequestError>,
    },
    RefreshLibraryClicked,
    LibraryLoaded(Result<Vec<LibraryEntry>, RequestError>),
    PlayClicked(String),
    StopClicked,
    /// Player exited on its own.
    PlaybackEnded(String),
    PlaybackFailed { filename: String, message: String },
    SaveClicked(String),
    FileSaved {
        filename: String,
        result: Result<String, RequestError>,
    },
    DeleteClicked(String),
    DeleteConfirmed,
    DeleteCancelled,
    Deleted {
        filename: String,
        result: Result<(), RequestError>,
    },
    NotificationDismissed(NotificationId),
    NotificationActionClicked {
        id: NotificationId,
        action: NotificationAction,
    },
    CookieStatusLoaded(Result<bool, RequestError>),
    /// Fallback for placeholder wiring.
    NoOp,
}
