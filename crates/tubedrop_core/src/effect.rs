use crate::JobId;

/// Side effects requested by `update`, executed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchInfo { url: String },
    StartDownload { url: String },
    PollProgress { job_id: JobId },
    ListLibrary,
    PlayAudio { filename: String },
    StopAudio,
    SaveFile { filename: String },
    DeleteFile { filename: String },
    CheckCookies,
}
