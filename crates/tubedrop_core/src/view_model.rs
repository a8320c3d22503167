use crate::format::format_view_count;
use crate::{AppState, JobStatus, NotificationId, PollPhase, Severity};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub url_valid: bool,
    pub info_loading: bool,
    pub preview: Option<PreviewView>,
    pub download_enabled: bool,
    pub progress: Option<ProgressView>,
    pub library: LibraryView,
    pub library_error: Option<String>,
    pub player: Option<PlayerView>,
    pub pending_delete: Option<String>,
    pub notifications: Vec<NotificationView>,
    pub cookies_available: Option<bool>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub title: String,
    pub uploader: String,
    pub duration: String,
    pub views: String,
    pub thumbnail: String,
    pub already_downloaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub job_id: String,
    pub phase: ProgressPhase,
    pub status: JobStatus,
    pub percent: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibraryView {
    /// First listing has not arrived yet.
    #[default]
    Loading,
    /// Placeholder state: the server has no downloads.
    Empty,
    Entries(Vec<LibraryRowView>),
}

/// Controls exposed on a library row or an action notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Play,
    Download,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRowView {
    /// 1-based position, used to address the row from the command line.
    pub index: usize,
    pub filename: String,
    pub name: String,
    pub size: String,
    pub modified: String,
    pub duration: Option<String>,
    pub playing: bool,
    pub actions: Vec<EntryAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: NotificationId,
    pub severity: Severity,
    pub text: String,
    pub actions: Vec<EntryAction>,
}

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    let polling = matches!(state.phase, PollPhase::Polling { .. });

    AppViewModel {
        input: state.input.clone(),
        url_valid: state.url_valid,
        info_loading: state.info_request.is_some(),
        preview: state.preview.as_ref().map(|meta| PreviewView {
            title: meta.title.clone(),
            uploader: meta.uploader.clone(),
            duration: meta.duration.clone(),
            views: format_view_count(meta.view_count),
            thumbnail: meta.thumbnail.clone(),
            already_downloaded: meta.already_downloaded,
        }),
        download_enabled: state.submitting.is_none() && !polling,
        progress: progress_view(state),
        library: library_view(state),
        library_error: state.library_error.clone(),
        player: state.now_playing.as_ref().map(|filename| PlayerView {
            filename: filename.clone(),
        }),
        pending_delete: state.pending_delete.clone(),
        notifications: state
            .notifications
            .iter()
            .map(|n| NotificationView {
                id: n.id,
                severity: n.severity,
                text: n.text.clone(),
                actions: if n.existing_file.is_some() {
                    vec![EntryAction::Play, EntryAction::Download]
                } else {
                    Vec::new()
                },
            })
            .collect(),
        cookies_available: state.cookies_available,
        dirty,
    }
}

fn progress_view(state: &AppState) -> Option<ProgressView> {
    let job = state.job.as_ref()?;
    let phase = match state.phase {
        PollPhase::Idle => return None,
        PollPhase::Polling { .. } => ProgressPhase::Running,
        PollPhase::Completed { .. } => ProgressPhase::Completed,
        PollPhase::Failed { .. } => ProgressPhase::Failed,
    };
    let label = match job.status {
        JobStatus::Pending => "Preparing download...".to_string(),
        JobStatus::Downloading => format!("Downloading... {:.0}%", job.progress),
        JobStatus::Completed => "Download complete!".to_string(),
        JobStatus::Error => format!(
            "Download failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        ),
    };
    Some(ProgressView {
        job_id: job.id.clone(),
        phase,
        status: job.status,
        percent: job.progress,
        label,
    })
}

fn library_view(state: &AppState) -> LibraryView {
    match state.library.as_deref() {
        None => LibraryView::Loading,
        Some([]) => LibraryView::Empty,
        Some(entries) => LibraryView::Entries(
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| LibraryRowView {
                    index: i + 1,
                    filename: entry.filename.clone(),
                    name: entry.name.clone(),
                    size: entry.size.clone(),
                    modified: entry.modified.clone(),
                    duration: entry.duration.clone(),
                    playing: state.now_playing.as_deref() == Some(entry.filename.as_str()),
                    actions: vec![EntryAction::Play, EntryAction::Download, EntryAction::Delete],
                })
                .collect(),
        ),
    }
}
