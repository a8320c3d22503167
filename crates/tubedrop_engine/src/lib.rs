//! Tubedrop engine: REST client for the download server and request execution.
mod client;
mod engine;
mod filename;
mod persist;
mod types;
mod wire;

pub use client::{Backend, ClientSettings, ReqwestBackend, DEFAULT_SERVER};
pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use filename::local_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use types::{
    ApiError, DownloadTicket, EngineEvent, FailureKind, JobId, JobProgress, JobStatus,
    LibraryItem, VideoDuration, VideoInfo,
};
pub use wire::decode_progress;
