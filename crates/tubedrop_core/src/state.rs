use std::time::Duration;

use crate::feedback::RequestError;
use crate::view_model::{self, AppViewModel};

/// Opaque job token issued by the server.
pub type JobId = String;
pub type NotificationId = u64;

/// Interval between two status requests for the active job.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// How long the finished job stays visible before the progress UI is hidden.
pub const COMPLETION_GRACE: Duration = Duration::from_millis(3000);
pub const LIBRARY_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
pub const ACTION_NOTIFICATION_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Downloading,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// One normalized status report for a job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub status: JobStatus,
    pub progress: f32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub id: JobId,
    pub url: String,
    pub title: Option<String>,
    pub status: JobStatus,
    pub progress: f32,
    pub error: Option<String>,
}

impl DownloadJob {
    fn new(id: JobId, url: String, title: Option<String>) -> Self {
        Self {
            id,
            url,
            title,
            status: JobStatus::Pending,
            progress: 0.0,
            error: None,
        }
    }

    fn apply(&mut self, update: ProgressUpdate) {
        self.status = update.status;
        self.progress = update.progress.clamp(0.0, 100.0);
        self.error = update.error;
    }
}

/// Poller lifecycle. `Completed`/`Failed` linger until `hide_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Polling {
        next_poll_at: Duration,
    },
    Completed {
        hide_at: Duration,
    },
    Failed {
        hide_at: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub url: String,
    pub title: String,
    pub uploader: String,
    pub duration: String,
    pub view_count: u64,
    pub thumbnail: String,
    pub already_downloaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub filename: String,
    pub name: String,
    pub size_bytes: u64,
    pub size: String,
    pub modified: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Play,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub text: String,
    /// Existing file the Play/Download actions refer to.
    pub existing_file: Option<String>,
    pub expires_at: Duration,
}

/// Session state owned by one controller instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) clock: Duration,
    pub(crate) input: String,
    pub(crate) url_valid: bool,
    pub(crate) info_request: Option<String>,
    pub(crate) last_previewed: Option<String>,
    pub(crate) preview: Option<VideoMetadata>,
    pub(crate) submitting: Option<String>,
    pub(crate) job: Option<DownloadJob>,
    pub(crate) phase: PollPhase,
    pub(crate) library: Option<Vec<LibraryEntry>>,
    pub(crate) library_error: Option<String>,
    pub(crate) next_library_refresh: Option<Duration>,
    pub(crate) now_playing: Option<String>,
    pub(crate) pending_delete: Option<String>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) next_notification_id: NotificationId,
    pub(crate) cookies_available: Option<bool>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn job(&self) -> Option<&DownloadJob> {
        self.job.as_ref()
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, severity: Severity, text: impl Into<String>) -> NotificationId {
        self.push_notification(severity, text.into(), None, NOTIFICATION_TTL)
    }

    pub(crate) fn notify_existing_file(&mut self, text: impl Into<String>, filename: String) {
        self.push_notification(
            Severity::Info,
            text.into(),
            Some(filename),
            ACTION_NOTIFICATION_TTL,
        );
    }

    fn push_notification(
        &mut self,
        severity: Severity,
        text: String,
        existing_file: Option<String>,
        ttl: Duration,
    ) -> NotificationId {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push(Notification {
            id,
            severity,
            text,
            existing_file,
            expires_at: self.clock + ttl,
        });
        self.mark_dirty();
        id
    }

    pub(crate) fn dismiss(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.notifications.iter().position(|n| n.id == id)?;
        self.mark_dirty();
        Some(self.notifications.remove(index))
    }

    pub(crate) fn expire_notifications(&mut self) {
        let now = self.clock;
        let before = self.notifications.len();
        self.notifications.retain(|n| n.expires_at > now);
        if self.notifications.len() != before {
            self.mark_dirty();
        }
    }

    pub(crate) fn notify_failure(&mut self, error: &RequestError) {
        self.notify(Severity::Error, error.user_message());
    }

    /// Enter `Polling` for a freshly accepted job.
    pub(crate) fn start_polling(&mut self, job_id: JobId, url: String) {
        let title = self
            .preview
            .as_ref()
            .filter(|preview| preview.url == url)
            .map(|preview| preview.title.clone());
        self.job = Some(DownloadJob::new(job_id, url, title));
        self.phase = PollPhase::Polling {
            next_poll_at: self.clock + POLL_INTERVAL,
        };
        self.mark_dirty();
    }

    /// Drop the active job and its poller, whatever phase it is in.
    pub(crate) fn cancel_job(&mut self) -> Option<DownloadJob> {
        if self.phase == PollPhase::Idle && self.job.is_none() {
            return None;
        }
        self.phase = PollPhase::Idle;
        self.mark_dirty();
        self.job.take()
    }

    /// Apply a status report if it belongs to the job currently being polled.
    ///
    /// Returns the job's status after the update, or `None` when the report was
    /// ignored (wrong job, or polling already stopped).
    pub(crate) fn apply_progress(
        &mut self,
        job_id: &str,
        update: ProgressUpdate,
    ) -> Option<JobStatus> {
        if !matches!(self.phase, PollPhase::Polling { .. }) {
            return None;
        }
        let job = self.job.as_mut().filter(|job| job.id == job_id)?;
        job.apply(update);
        let status = job.status;
        let hide_at = self.clock + COMPLETION_GRACE;
        match status {
            JobStatus::Completed => self.phase = PollPhase::Completed { hide_at },
            JobStatus::Error => self.phase = PollPhase::Failed { hide_at },
            JobStatus::Pending | JobStatus::Downloading => {}
        }
        self.mark_dirty();
        Some(status)
    }

    /// Advance the clock; returns the job id to poll if a poll is due.
    pub(crate) fn advance_clock(&mut self, now: Duration) -> Option<JobId> {
        self.clock = self.clock.max(now);
        self.expire_notifications();
        match self.phase {
            PollPhase::Polling { next_poll_at } if self.clock >= next_poll_at => {
                self.phase = PollPhase::Polling {
                    next_poll_at: self.clock + POLL_INTERVAL,
                };
                self.job.as_ref().map(|job| job.id.clone())
            }
            PollPhase::Completed { hide_at } | PollPhase::Failed { hide_at }
                if self.clock >= hide_at =>
            {
                self.cancel_job();
                None
            }
            _ => None,
        }
    }

    /// True when the periodic library refresh is due; re-arms the timer.
    pub(crate) fn library_refresh_due(&mut self) -> bool {
        match self.next_library_refresh {
            Some(at) if self.clock >= at => {
                self.schedule_library_refresh();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn schedule_library_refresh(&mut self) {
        self.next_library_refresh = Some(self.clock + LIBRARY_REFRESH_INTERVAL);
    }
}
