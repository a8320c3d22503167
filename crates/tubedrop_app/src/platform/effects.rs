use std::sync::{mpsc, Arc};

use chrono::{DateTime, Local};
use engine_logging::{engine_debug, engine_info, engine_warn};
use tubedrop_core::{
    format_duration, format_size, Effect, JobStatus, LibraryEntry, Msg, ProgressUpdate,
    RequestError, VideoMetadata,
};
use tubedrop_engine::{
    ApiError, ClientSettings, EngineError, EngineEvent, EngineHandle, EventSink, FailureKind,
    LibraryItem, VideoDuration,
};

use super::app::AppEvent;
use super::player::AudioPlayer;

pub struct EffectRunner {
    engine: EngineHandle,
    player: AudioPlayer,
}

impl EffectRunner {
    pub fn new(
        settings: ClientSettings,
        player: Vec<String>,
        events: mpsc::Sender<AppEvent>,
    ) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(MsgSink { events }))?;
        Ok(Self {
            engine,
            player: AudioPlayer::new(player),
        })
    }

    /// Start every effect. Failures known right away come back as messages.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchInfo { url } => {
                    engine_debug!("FetchInfo url={}", url);
                    self.engine.fetch_info(url);
                }
                Effect::StartDownload { url } => {
                    engine_info!("StartDownload url={}", url);
                    self.engine.start_download(url);
                }
                Effect::PollProgress { job_id } => self.engine.poll_progress(job_id),
                Effect::ListLibrary => self.engine.list_library(),
                Effect::PlayAudio { filename } => {
                    if let Err(message) = self.play(&filename) {
                        engine_warn!("Playback of {} failed: {}", filename, message);
                        immediate.push(Msg::PlaybackFailed { filename, message });
                    }
                }
                Effect::StopAudio => self.player.stop(),
                Effect::SaveFile { filename } => {
                    engine_info!("SaveFile {}", filename);
                    self.engine.save(filename);
                }
                Effect::DeleteFile { filename } => {
                    engine_info!("DeleteFile {}", filename);
                    self.engine.delete(filename);
                }
                Effect::CheckCookies => self.engine.check_cookies(),
            }
        }
        immediate
    }

    pub fn poll_player(&mut self) -> Option<Msg> {
        self.player.poll_finished().map(Msg::PlaybackEnded)
    }

    pub fn shutdown(&mut self) {
        self.player.stop();
    }

    fn play(&mut self, filename: &str) -> Result<(), String> {
        let url = self
            .engine
            .stream_url(filename)
            .map_err(|err| err.message)?;
        self.player
            .play(filename, url.as_str())
            .map_err(|err| format!("could not start the player ({err})"))
    }
}

/// Forwards engine events to the dispatch loop as controller messages.
struct MsgSink {
    events: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        for msg in to_msgs(event) {
            let _ = self.events.send(AppEvent::Msg(msg));
        }
    }
}

fn to_msgs(event: EngineEvent) -> Vec<Msg> {
    match event {
        EngineEvent::InfoFetched { url, result } => match result {
            Ok(info) => {
                let mut msgs = cookie_msg(info.cookies_available);
                msgs.push(Msg::InfoLoaded {
                    result: Ok(VideoMetadata {
                        url: url.clone(),
                        title: info.title,
                        uploader: info.uploader,
                        duration: match info.duration {
                            VideoDuration::Seconds(seconds) => format_duration(seconds),
                            VideoDuration::Text(text) => text,
                        },
                        view_count: info.view_count,
                        thumbnail: info.thumbnail,
                        already_downloaded: info.already_downloaded,
                    }),
                    url,
                });
                msgs
            }
            Err(err) => vec![Msg::InfoLoaded {
                url,
                result: Err(map_error(&err)),
            }],
        },
        EngineEvent::DownloadStarted { url, result } => match result {
            Ok(ticket) => {
                let mut msgs = cookie_msg(ticket.cookies_available);
                msgs.push(Msg::DownloadStarted {
                    url,
                    job_id: ticket.download_id,
                });
                msgs
            }
            Err(err) => {
                engine_warn!("Download of {} rejected: {}", url, err);
                let existing_file = match &err.kind {
                    FailureKind::Server { existing_file, .. } => existing_file.clone(),
                    _ => None,
                };
                vec![Msg::DownloadRejected {
                    url,
                    error: map_error(&err),
                    existing_file,
                }]
            }
        },
        EngineEvent::Progress { job_id, result } => {
            if let Err(err) = &result {
                engine_warn!("Progress poll for {} failed: {}", job_id, err);
            }
            vec![Msg::ProgressReceived {
                job_id,
                result: result
                    .map(|p| ProgressUpdate {
                        status: map_status(p.status),
                        progress: p.progress,
                        error: p.error,
                    })
                    .map_err(|err| map_error(&err)),
            }]
        }
        EngineEvent::LibraryListed(result) => vec![Msg::LibraryLoaded(
            result
                .map(|items| items.into_iter().map(to_entry).collect())
                .map_err(|err| {
                    engine_warn!("Listing downloads failed: {}", err);
                    map_error(&err)
                }),
        )],
        EngineEvent::Deleted { filename, result } => vec![Msg::Deleted {
            filename,
            result: result.map_err(|err| map_error(&err)),
        }],
        EngineEvent::Saved { filename, result } => vec![Msg::FileSaved {
            filename,
            result: result
                .map(|path| path.display().to_string())
                .map_err(|err| map_error(&err)),
        }],
        EngineEvent::CookieStatus(result) => {
            vec![Msg::CookieStatusLoaded(result.map_err(|err| map_error(&err)))]
        }
    }
}

fn cookie_msg(flag: Option<bool>) -> Vec<Msg> {
    flag.map(|available| Msg::CookieStatusLoaded(Ok(available)))
        .into_iter()
        .collect()
}

fn map_error(err: &ApiError) -> RequestError {
    match &err.kind {
        FailureKind::Server {
            code: Some(code), ..
        } => RequestError::server_with_code(err.message.clone(), code.clone()),
        FailureKind::Server { code: None, .. } => RequestError::server(err.message.clone()),
        _ => RequestError::transport(err.to_string()),
    }
}

fn map_status(status: tubedrop_engine::JobStatus) -> JobStatus {
    match status {
        tubedrop_engine::JobStatus::Pending => JobStatus::Pending,
        tubedrop_engine::JobStatus::Downloading => JobStatus::Downloading,
        tubedrop_engine::JobStatus::Completed => JobStatus::Completed,
        tubedrop_engine::JobStatus::Error => JobStatus::Error,
    }
}

fn to_entry(item: LibraryItem) -> LibraryEntry {
    let size = item
        .size_formatted
        .unwrap_or_else(|| format_size(item.size));
    let modified = item
        .modified_formatted
        .unwrap_or_else(|| format_timestamp(item.modified));
    LibraryEntry {
        filename: item.filename,
        name: item.name,
        size_bytes: item.size,
        size,
        modified,
        duration: item.duration_formatted,
    }
}

fn format_timestamp(unix_seconds: f64) -> String {
    DateTime::from_timestamp(unix_seconds as i64, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
