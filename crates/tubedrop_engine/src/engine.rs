use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::engine_info;
use thiserror::Error;
use url::Url;

use crate::client::{Backend, ClientSettings, ReqwestBackend};
use crate::{ApiError, EngineEvent};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid server url: {0}")]
    ServerUrl(String),
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Receives engine events; implementations forward them to the UI thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    FetchInfo { url: String },
    StartDownload { url: String },
    PollProgress { job_id: String },
    ListLibrary,
    Delete { filename: String },
    Save { filename: String },
    CheckCookies,
}

/// Handle to the background request executor.
///
/// Every call returns immediately; the outcome arrives later as an
/// [`EngineEvent`] on the sink. Requests run concurrently.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    backend: Arc<dyn Backend>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        engine_info!("Using download server {}", settings.server);
        let backend = Arc::new(ReqwestBackend::new(settings)?);
        Self::with_backend(backend, sink)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let worker_backend = backend.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let backend = worker_backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let event = handle_command(backend.as_ref(), command).await;
                    sink.emit(event);
                });
            }
        });

        Ok(Self { cmd_tx, backend })
    }

    pub fn fetch_info(&self, url: impl Into<String>) {
        self.send(EngineCommand::FetchInfo { url: url.into() });
    }

    pub fn start_download(&self, url: impl Into<String>) {
        self.send(EngineCommand::StartDownload { url: url.into() });
    }

    pub fn poll_progress(&self, job_id: impl Into<String>) {
        self.send(EngineCommand::PollProgress {
            job_id: job_id.into(),
        });
    }

    pub fn list_library(&self) {
        self.send(EngineCommand::ListLibrary);
    }

    pub fn delete(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Delete {
            filename: filename.into(),
        });
    }

    pub fn save(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Save {
            filename: filename.into(),
        });
    }

    pub fn check_cookies(&self) {
        self.send(EngineCommand::CheckCookies);
    }

    pub fn stream_url(&self, filename: &str) -> Result<Url, ApiError> {
        self.backend.stream_url(filename)
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(backend: &dyn Backend, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::FetchInfo { url } => {
            let result = backend.video_info(&url).await;
            EngineEvent::InfoFetched { url, result }
        }
        EngineCommand::StartDownload { url } => {
            let result = backend.start_download(&url).await;
            EngineEvent::DownloadStarted { url, result }
        }
        EngineCommand::PollProgress { job_id } => {
            let result = backend.progress(&job_id).await;
            EngineEvent::Progress { job_id, result }
        }
        EngineCommand::ListLibrary => EngineEvent::LibraryListed(backend.list_downloads().await),
        EngineCommand::Delete { filename } => {
            let result = backend.delete(&filename).await;
            EngineEvent::Deleted { filename, result }
        }
        EngineCommand::Save { filename } => {
            let result = backend.save_file(&filename).await;
            EngineEvent::Saved { filename, result }
        }
        EngineCommand::CheckCookies => EngineEvent::CookieStatus(backend.cookie_status().await),
    }
}
