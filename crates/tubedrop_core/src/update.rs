use crate::feedback::{ErrorCategory, RequestError, INVALID_INPUT_MESSAGE};
use crate::{
    is_supported_url, AppState, Effect, JobStatus, Msg, NotificationAction, Severity,
    VideoMetadata,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            state.schedule_library_refresh();
            vec![Effect::ListLibrary, Effect::CheckCookies]
        }
        Msg::Tick(now) => {
            let mut effects = Vec::new();
            if let Some(job_id) = state.advance_clock(now) {
                effects.push(Effect::PollProgress { job_id });
            }
            if state.library_refresh_due() {
                effects.push(Effect::ListLibrary);
            }
            effects
        }
        Msg::InputChanged(text) => on_input_changed(&mut state, text),
        Msg::PreviewRequested => {
            let url = state.input.trim().to_string();
            if state.url_valid {
                request_info(&mut state, url)
            } else {
                state.notify(Severity::Error, INVALID_INPUT_MESSAGE);
                Vec::new()
            }
        }
        Msg::InfoLoaded { url, result } => {
            on_info_loaded(&mut state, url, result);
            Vec::new()
        }
        Msg::DownloadClicked => on_download_clicked(&mut state),
        Msg::DownloadStarted { url, job_id } => {
            if state.submitting.as_deref() == Some(url.as_str()) {
                state.submitting = None;
                state.start_polling(job_id, url);
                state.notify(Severity::Info, "Download started.");
            }
            Vec::new()
        }
        Msg::DownloadRejected {
            url,
            error,
            existing_file,
        } => {
            if state.submitting.as_deref() == Some(url.as_str()) {
                state.submitting = None;
                on_download_rejected(&mut state, &error, existing_file);
            }
            Vec::new()
        }
        Msg::ProgressReceived { job_id, result } => match result {
            // A failed tick is not a failed job; the next tick retries.
            Err(_) => Vec::new(),
            Ok(progress) => match state.apply_progress(&job_id, progress) {
                Some(JobStatus::Completed) => {
                    let text = match state.job.as_ref().and_then(|job| job.title.as_deref()) {
                        Some(title) => format!("Download complete: {title}"),
                        None => "Download complete!".to_string(),
                    };
                    state.notify(Severity::Success, text);
                    vec![Effect::ListLibrary]
                }
                Some(JobStatus::Error) => {
                    let message = state
                        .job
                        .as_ref()
                        .and_then(|job| job.error.clone())
                        .map(|error| RequestError::server(error).user_message())
                        .unwrap_or_else(|| "Unknown error".to_string());
                    state.notify(Severity::Error, format!("Download failed: {message}"));
                    Vec::new()
                }
                Some(JobStatus::Pending | JobStatus::Downloading) | None => Vec::new(),
            },
        },
        Msg::RefreshLibraryClicked => vec![Effect::ListLibrary],
        Msg::LibraryLoaded(result) => {
            match result {
                Ok(entries) => {
                    state.library = Some(entries);
                    state.library_error = None;
                }
                Err(error) => state.library_error = Some(error.user_message()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::PlayClicked(filename) => play(&mut state, filename),
        Msg::StopClicked => {
            if state.now_playing.take().is_some() {
                state.mark_dirty();
                vec![Effect::StopAudio]
            } else {
                Vec::new()
            }
        }
        Msg::PlaybackEnded(filename) => {
            if state.now_playing.as_deref() == Some(filename.as_str()) {
                state.now_playing = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PlaybackFailed { filename, message } => {
            if state.now_playing.as_deref() == Some(filename.as_str()) {
                state.now_playing = None;
            }
            state.notify(Severity::Error, format!("Could not play {filename}: {message}"));
            Vec::new()
        }
        Msg::SaveClicked(filename) => save(&mut state, filename),
        Msg::FileSaved { filename, result } => {
            match result {
                Ok(path) => state.notify(Severity::Success, format!("Saved {filename} to {path}")),
                Err(error) => state.notify(
                    Severity::Error,
                    format!("Could not save {filename}: {}", error.user_message()),
                ),
            };
            Vec::new()
        }
        Msg::DeleteClicked(filename) => {
            state.pending_delete = Some(filename);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteConfirmed => match state.pending_delete.take() {
            Some(filename) => {
                state.mark_dirty();
                vec![Effect::DeleteFile { filename }]
            }
            None => Vec::new(),
        },
        Msg::DeleteCancelled => {
            if state.pending_delete.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Deleted { filename, result } => on_deleted(&mut state, filename, result),
        Msg::NotificationDismissed(id) => {
            state.dismiss(id);
            Vec::new()
        }
        Msg::NotificationActionClicked { id, action } => {
            match state.dismiss(id).and_then(|n| n.existing_file) {
                Some(filename) => match action {
                    NotificationAction::Play => play(&mut state, filename),
                    NotificationAction::Download => save(&mut state, filename),
                },
                None => Vec::new(),
            }
        }
        Msg::CookieStatusLoaded(result) => {
            if let Ok(available) = result {
                if state.cookies_available != Some(available) {
                    state.cookies_available = Some(available);
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_input_changed(state: &mut AppState, text: String) -> Vec<Effect> {
    let url = text.trim().to_string();
    state.url_valid = is_supported_url(&url);
    state.input = text;
    state.mark_dirty();

    if !state.url_valid {
        state.preview = None;
        state.last_previewed = None;
        return Vec::new();
    }
    let previewed =
        state.preview.is_some() && state.last_previewed.as_deref() == Some(url.as_str());
    let already_known = previewed || state.info_request.as_deref() == Some(url.as_str());
    if already_known {
        Vec::new()
    } else {
        request_info(state, url)
    }
}

fn request_info(state: &mut AppState, url: String) -> Vec<Effect> {
    state.info_request = Some(url.clone());
    state.mark_dirty();
    vec![Effect::FetchInfo { url }]
}

fn on_info_loaded(
    state: &mut AppState,
    url: String,
    result: Result<VideoMetadata, RequestError>,
) {
    if state.info_request.as_deref() != Some(url.as_str()) {
        return;
    }
    state.info_request = None;
    state.mark_dirty();
    if state.input.trim() != url {
        return;
    }
    match result {
        Ok(metadata) => {
            state.last_previewed = Some(url);
            state.preview = Some(metadata);
        }
        Err(error) => {
            state.preview = None;
            state.notify_failure(&error);
        }
    }
}

fn on_download_clicked(state: &mut AppState) -> Vec<Effect> {
    let url = state.input.trim().to_string();
    if !is_supported_url(&url) {
        state.notify(Severity::Error, INVALID_INPUT_MESSAGE);
        return Vec::new();
    }
    if state.submitting.is_some() {
        return Vec::new();
    }
    // At most one poller: the previous job stops being tracked before the new one starts.
    state.cancel_job();
    state.submitting = Some(url.clone());
    state.mark_dirty();
    vec![Effect::StartDownload { url }]
}

fn on_download_rejected(state: &mut AppState, error: &RequestError, existing_file: Option<String>) {
    state.mark_dirty();
    // A server that names the existing file is reporting a duplicate whatever its message says.
    match (error.category(), existing_file) {
        (category, Some(filename)) if category != ErrorCategory::Connectivity => {
            let text = format!("Already downloaded: {filename}");
            state.notify_existing_file(text, filename);
        }
        _ => state.notify_failure(error),
    }
}

fn play(state: &mut AppState, filename: String) -> Vec<Effect> {
    state.now_playing = Some(filename.clone());
    state.mark_dirty();
    vec![Effect::PlayAudio { filename }]
}

fn save(state: &mut AppState, filename: String) -> Vec<Effect> {
    state.notify(Severity::Info, format!("Downloading {filename}..."));
    vec![Effect::SaveFile { filename }]
}

fn on_deleted(
    state: &mut AppState,
    filename: String,
    result: Result<(), RequestError>,
) -> Vec<Effect> {
    if let Err(error) = result {
        state.notify(
            Severity::Error,
            format!("Could not delete {filename}: {}", error.user_message()),
        );
        return Vec::new();
    }

    state.notify(Severity::Success, format!("Deleted {filename}"));
    let mut effects = Vec::with_capacity(2);
    if state.now_playing.as_deref() == Some(filename.as_str()) {
        state.now_playing = None;
        effects.push(Effect::StopAudio);
    }
    effects.push(Effect::ListLibrary);
    effects
}
