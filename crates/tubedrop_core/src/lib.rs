//! Tubedrop core: pure controller state machine and view-model helpers.
mod effect;
mod feedback;
mod format;
mod msg;
mod state;
mod update;
mod url_check;
mod view_model;

pub use effect::Effect;
pub use feedback::{
    ErrorCategory, RequestError, ALREADY_DOWNLOADED_CODE, CONNECTIVITY_MESSAGE,
    INVALID_INPUT_MESSAGE,
};
pub use format::{format_duration, format_size, format_view_count};
pub use msg::Msg;
pub use state::{
    AppState, DownloadJob, JobId, JobStatus, LibraryEntry, Notification, NotificationAction,
    NotificationId, PollPhase, ProgressUpdate, Severity, VideoMetadata, ACTION_NOTIFICATION_TTL,
    COMPLETION_GRACE, LIBRARY_REFRESH_INTERVAL, NOTIFICATION_TTL, POLL_INTERVAL,
};
pub use update::update;
pub use url_check::is_supported_url;
pub use view_model::{
    AppViewModel, EntryAction, LibraryRowView, LibraryView, NotificationView, PlayerView,
    PreviewView, ProgressPhase, ProgressView,
};
