//! Crate-wide error types for the Holophonix animation engine.

use thiserror::Error;

/// Errors surfaced synchronously to a caller of the Playback Orchestrator's
/// public operations (`play`, `schedule`, ...).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("track list is empty")]
    EmptyTracks,

    #[error("no such animation: {0}")]
    NoSuchAnimation(String),

    #[error("maximum concurrent playbacks ({0}) exceeded")]
    MaxConcurrentExceeded(usize),

    #[error("rejected by conflict policy")]
    RejectedByPolicy,

    #[error("scheduled action already executed")]
    AlreadyExecuted,

    #[error("no such playback: {0:?}")]
    NoSuchPlayback(crate::PlaybackId),

    #[error("no such schedule: {0:?}")]
    NoSuchSchedule(crate::ScheduleId),
}

/// Result alias for fallible core operations.
pub type HlxResult<T> = Result<T, RequestError>;
