//! Events emitted by the Playback Orchestrator and Transport to registered
//! listeners.

use serde::{Deserialize, Serialize};

use crate::animation::PlaybackId;
use crate::track::TrackId;

/// A reason an evaluated position was discarded in favor of the last valid
/// one for that track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvaluationWarningReason {
    NonFiniteOutput,
    ModelPanicked,
}

/// Transport-level error counters, surfaced for telemetry/diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    QueueOverflow,
    SocketError,
    CoalesceReplaced,
}

/// Everything a caller can observe happening to a playback or the device
/// link, delivered through `onEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Started { playback_id: PlaybackId },
    Stopped { playback_id: PlaybackId },
    Paused { playback_id: PlaybackId },
    Resumed { playback_id: PlaybackId },
    Completed { playback_id: PlaybackId },
    EvaluationWarning { playback_id: PlaybackId, track_id: TrackId, reason: EvaluationWarningReason },
    ConflictResolved { loser: PlaybackId, winner: PlaybackId },
    Error { playback_id: Option<PlaybackId>, message: String },
    Transport { error: TransportError },
    DeviceUnavailable { last_error: String },
    DeviceAvailable,
}
