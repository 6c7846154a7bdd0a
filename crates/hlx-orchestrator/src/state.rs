//! State exclusively owned by the orchestrator: playbacks, scheduled
//! actions, and the track-ownership map. The Transport and Device Mirror
//! never reach into this; they only see what the tick loop hands them.

use std::collections::HashMap;
use std::time::Instant;

use hlx_core::{PlaybackId, PlaybackRequest, ScheduleId, Track, TrackId};
use hlx_runtime::Playback;

pub struct ScheduledAction {
    pub id: ScheduleId,
    pub request: PlaybackRequest,
    pub execute_at: Instant,
}

/// A delayed `play()` call: the `PlaybackId` is minted immediately (so the
/// caller can refer to it before admission), but the playback itself is not
/// created until `execute_at`.
pub struct PendingPlay {
    pub id: PlaybackId,
    pub request: PlaybackRequest,
    pub execute_at: Instant,
}

#[derive(Default)]
pub struct OrchestratorState {
    pub tracks: HashMap<TrackId, Track>,
    pub playbacks: HashMap<PlaybackId, Playback>,
    pub scheduled: HashMap<ScheduleId, ScheduledAction>,
    pub pending_plays: HashMap<PlaybackId, PendingPlay>,
    pub track_owner: HashMap<TrackId, PlaybackId>,
    /// Tracks a ghosted playback evaluates but must not emit OSC for,
    /// because another playback already owns them (`AllowConcurrent`).
    pub ghosted: HashMap<PlaybackId, Vec<TrackId>>,
    pub executed_schedule_ids: std::collections::HashSet<ScheduleId>,
}

impl OrchestratorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_positions(&self) -> HashMap<TrackId, hlx_core::Position> {
        self.tracks.iter().map(|(id, t)| (*id, t.position)).collect()
    }

    pub fn initial_positions(&self) -> HashMap<TrackId, hlx_core::Position> {
        self.tracks.iter().map(|(id, t)| (*id, t.initial_position)).collect()
    }

    pub fn remove_playback(&mut self, id: PlaybackId) {
        if let Some(pb) = self.playbacks.get(&id) {
            for &t in &pb.request.track_ids {
                if self.track_owner.get(&t) == Some(&id) {
                    self.track_owner.remove(&t);
                }
            }
        }
        self.ghosted.remove(&id);
        self.playbacks.remove(&id);
    }
}
