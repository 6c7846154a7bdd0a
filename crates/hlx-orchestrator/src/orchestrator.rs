//! The Playback Orchestrator: the engine's single point of control for
//! starting, stopping, and driving animations. Owns `OrchestratorState` and
//! the 60 Hz tick loop; everything downstream (OSC optimiser, transport)
//! only ever sees the ordered `TrackPositionUpdate`s a tick produces.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use hlx_core::{
    generate_playback_id, generate_schedule_id, EngineConfig, Event, Easing, FadeCfg, ModelKind, MultiTrackMode,
    PlaybackId, PlaybackRequest, RequestError, ScheduleId, Track, TrackId,
};
use hlx_runtime::{Playback, PlaybackState, TrackPositionUpdate};

use crate::admission;
use crate::events::EventBus;
use crate::state::{OrchestratorState, PendingPlay, ScheduledAction};

pub struct Orchestrator {
    config: EngineConfig,
    state: OrchestratorState,
    events: EventBus,
}

/// One playback's share of a tick: its own model/mode, needed so the OSC
/// optimiser can compress this group independently of every other.
pub struct PlaybackTick {
    pub playback_id: PlaybackId,
    pub model: ModelKind,
    pub mode: MultiTrackMode,
    pub updates: Vec<TrackPositionUpdate>,
}

impl Orchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, state: OrchestratorState::new(), events: EventBus::new() }
    }

    pub fn register_track(&mut self, track: Track) {
        self.state.tracks.insert(track.id, track);
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.events.subscribe()
    }

    /// Start a playback, or (if `request.delay_s > 0`) mint its id now and
    /// defer admission until that delay elapses.
    pub fn play(&mut self, request: PlaybackRequest, now: Instant) -> Result<PlaybackId, RequestError> {
        request.validate()?;
        let id = generate_playback_id();
        if request.delay_s > 0.0 {
            let execute_at = now + Duration::from_secs_f64(request.delay_s);
            self.state.pending_plays.insert(id, PendingPlay { id, request, execute_at });
            Ok(id)
        } else {
            self.admit_and_start(id, request, now)
        }
    }

    /// Schedule a playback for a specific wall-clock moment. Unlike `play`
    /// with `delay_s`, the `PlaybackId` is not minted until the action
    /// executes — callers track this through the returned `ScheduleId`.
    pub fn schedule(&mut self, request: PlaybackRequest, execute_at: Instant) -> Result<ScheduleId, RequestError> {
        request.validate()?;
        let id = generate_schedule_id();
        self.state.scheduled.insert(id, ScheduledAction { id, request, execute_at });
        Ok(id)
    }

    pub fn cancel_schedule(&mut self, id: ScheduleId) -> Result<(), RequestError> {
        if self.state.executed_schedule_ids.contains(&id) {
            return Err(RequestError::AlreadyExecuted);
        }
        self.state.scheduled.remove(&id).map(|_| ()).ok_or(RequestError::NoSuchSchedule(id))
    }

    pub fn stop(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        let fade_out = self.state.playbacks.get(&id).and_then(|pb| pb.request.animation.fade_out);
        let initial_positions = self.state.initial_positions();
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        let events = pb.stop(now, fade_out, &initial_positions);
        self.events.emit_all(events);
        if pb.is_terminal() {
            self.state.remove_playback(id);
        }
        Ok(())
    }

    pub fn stop_all(&mut self, now: Instant) {
        let ids: Vec<PlaybackId> = self.state.playbacks.keys().copied().collect();
        for id in ids {
            let _ = self.stop(id, now);
        }
    }

    pub fn pause(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        if pb.pause(now) {
            self.events.emit(Event::Paused { playback_id: id });
        }
        Ok(())
    }

    pub fn resume(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        if pb.resume(now) {
            self.events.emit(Event::Resumed { playback_id: id });
        }
        Ok(())
    }

    pub fn seek(&mut self, id: PlaybackId, now: Instant, t_s: f64) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        pb.seek(now, t_s);
        Ok(())
    }

    pub fn set_speed(&mut self, id: PlaybackId, now: Instant, speed: f64) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        pb.set_speed(now, speed.clamp(f64::MIN_POSITIVE, 4.0));
        Ok(())
    }

    pub fn set_loop(&mut self, id: PlaybackId, enabled: bool) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        pb.request.r#loop = Some(enabled);
        if !enabled {
            pb.request.animation.ping_pong = false;
        }
        Ok(())
    }

    pub fn set_ping_pong(&mut self, id: PlaybackId, enabled: bool) -> Result<(), RequestError> {
        let pb = self.state.playbacks.get_mut(&id).ok_or(RequestError::NoSuchPlayback(id))?;
        pb.request.animation.ping_pong = enabled && pb.request.effective_loop();
        Ok(())
    }

    /// Resolve an `/anim/*` target token to a running `PlaybackId`: either
    /// the id's decimal form, or the owning animation's name (first match
    /// wins if more than one playback shares a name).
    pub fn find_playback(&self, token: &str) -> Option<PlaybackId> {
        if let Ok(raw) = token.parse::<u64>() {
            let id = PlaybackId(raw);
            if self.state.playbacks.contains_key(&id) {
                return Some(id);
            }
        }
        self.state
            .playbacks
            .values()
            .find(|pb| pb.request.animation.name == token || pb.request.animation.id == token)
            .map(|pb| pb.id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advance every active playback by one frame and return the ordered,
    /// deduplicated position updates ready for the OSC optimiser. Step
    /// order: promote due scheduled/delayed plays, drive playbacks highest
    /// priority first, drop ghosted tracks, sweep terminal playbacks.
    pub fn tick(&mut self, now: Instant) -> Vec<TrackPositionUpdate> {
        self.tick_grouped(now).into_iter().flat_map(|g| g.updates).collect()
    }

    /// Same as `tick`, but keeps each playback's updates segregated along
    /// with its model/mode — the OSC optimiser compresses one playback's
    /// updates at a time, so it needs this grouping rather than the flat
    /// merge `tick` returns.
    pub fn tick_grouped(&mut self, now: Instant) -> Vec<PlaybackTick> {
        self.promote_due(now);

        let mut ordered_ids: Vec<PlaybackId> = self.state.playbacks.keys().copied().collect();
        ordered_ids.sort_by_key(|id| (Reverse(self.state.playbacks[id].request.priority), id.0));

        let mut emitted_tracks = HashSet::new();
        let mut groups = Vec::new();
        let mut to_remove = Vec::new();

        for id in ordered_ids {
            let pb = self.state.playbacks.get_mut(&id).expect("id drawn from this state's own key set");
            if pb.state() == PlaybackState::Starting {
                let ev = pb.activate();
                self.events.emit(ev);
            }

            let animation = pb.request.animation.clone();
            let mode = pb.request.mode.clone();
            let out = match pb.state() {
                PlaybackState::Playing => pb.tick(now, &animation, &mode),
                PlaybackState::Stopping => {
                    let fade_out = animation.fade_out.unwrap_or(FadeCfg::new(f64::MIN_POSITIVE, Easing::Linear));
                    pb.tick_fade_out(now, fade_out)
                }
                _ => hlx_runtime::TickOutput { updates: vec![], events: vec![] },
            };
            self.events.emit_all(out.events);

            let ghosted = self.state.ghosted.get(&id).cloned().unwrap_or_default();
            let mut updates = Vec::new();
            for u in out.updates {
                if ghosted.contains(&u.track_id) {
                    continue;
                }
                if let Some(track) = self.state.tracks.get_mut(&u.track_id) {
                    track.position = u.position;
                }
                if emitted_tracks.insert(u.track_id) {
                    updates.push(u);
                }
            }
            if !updates.is_empty() {
                groups.push(PlaybackTick { playback_id: id, model: animation.model, mode, updates });
            }

            if pb.is_terminal() {
                to_remove.push(id);
            }
        }

        for id in to_remove {
            self.state.remove_playback(id);
        }

        groups
    }

    /// `holophonixIndex` lookup for every registered track, handed to the
    /// OSC optimiser so it can address by device index rather than local id.
    pub fn holophonix_indices(&self) -> std::collections::HashMap<TrackId, u32> {
        self.state.tracks.iter().map(|(id, t)| (*id, t.holophonix_index)).collect()
    }

    pub fn is_running(&self, id: PlaybackId) -> bool {
        self.state.playbacks.contains_key(&id)
    }

    pub fn running_ids(&self) -> HashSet<PlaybackId> {
        self.state.playbacks.keys().copied().collect()
    }

    fn promote_due(&mut self, now: Instant) {
        let due_schedules: Vec<ScheduleId> = self
            .state
            .scheduled
            .iter()
            .filter(|(_, a)| a.execute_at <= now)
            .map(|(id, _)| *id)
            .collect();
        for sid in due_schedules {
            if let Some(action) = self.state.scheduled.remove(&sid) {
                self.state.executed_schedule_ids.insert(sid);
                let id = generate_playback_id();
                let _ = self.admit_and_start(id, action.request, now);
            }
        }

        let due_plays: Vec<PlaybackId> = self
            .state
            .pending_plays
            .iter()
            .filter(|(_, p)| p.execute_at <= now)
            .map(|(id, _)| *id)
            .collect();
        for pid in due_plays {
            if let Some(pending) = self.state.pending_plays.remove(&pid) {
                let _ = self.admit_and_start(pid, pending.request, now);
            }
        }
    }

    fn admit_and_start(&mut self, id: PlaybackId, request: PlaybackRequest, now: Instant) -> Result<PlaybackId, RequestError> {
        let decision = match admission::admit(&self.state, &self.config, &request) {
            Ok(d) => d,
            Err(e) => {
                log::debug!("playback {:?} rejected: {}", id, e);
                return Err(e);
            }
        };

        let initial_positions = self.state.initial_positions();
        for loser in &decision.to_stop {
            if let Some(pb) = self.state.playbacks.get_mut(loser) {
                let events = pb.stop(now, None, &initial_positions);
                self.events.emit_all(events);
                self.events.emit(Event::ConflictResolved { loser: *loser, winner: id });
                log::debug!("playback {:?} preempted by {:?}", loser, id);
            }
            if self.state.playbacks.get(loser).map(|p| p.is_terminal()).unwrap_or(false) {
                self.state.remove_playback(*loser);
            }
        }

        for &t in &request.track_ids {
            self.state.track_owner.insert(t, id);
        }
        if !decision.ghosted_tracks.is_empty() {
            self.state.ghosted.insert(id, decision.ghosted_tracks);
        }

        let positions = self.state.current_positions();
        let pb = Playback::new(id, request, now, &positions);
        self.state.playbacks.insert(id, pb);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_core::{Animation, ModelKind, MultiTrackMode, Position, Priority, RequestSource};

    fn req(track_ids: Vec<TrackId>, priority: Priority) -> PlaybackRequest {
        let animation = Animation {
            id: "a".into(),
            name: "a".into(),
            duration_s: 10.0,
            r#loop: false,
            ping_pong: false,
            model: ModelKind::Linear,
            parameters: hlx_model::default_parameters(ModelKind::Linear, Position::ORIGIN),
            fade_in: None,
            fade_out: None,
        };
        PlaybackRequest {
            animation,
            track_ids,
            mode: MultiTrackMode::Relative,
            priority,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Ui,
            delay_s: 0.0,
            phase_offset_s: 0.0,
        }
    }

    #[test]
    fn play_then_tick_activates_and_emits_started() {
        let mut orch = Orchestrator::new(EngineConfig::default());
        orch.register_track(Track::new(TrackId(1), 1, "t1", Position::ORIGIN));
        let rx = orch.subscribe();
        let now = Instant::now();
        orch.play(req(vec![TrackId(1)], Priority::Normal), now).unwrap();
        orch.tick(now);
        assert!(rx.try_iter().any(|e| matches!(e, Event::Started { .. })));
    }

    #[test]
    fn stop_existing_preempts_conflicting_owner() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = hlx_core::ConflictStrategy::StopExisting;
        let mut orch = Orchestrator::new(config);
        orch.register_track(Track::new(TrackId(1), 1, "t1", Position::ORIGIN));
        let now = Instant::now();
        let first = orch.play(req(vec![TrackId(1)], Priority::Normal), now).unwrap();
        orch.tick(now);
        let second = orch.play(req(vec![TrackId(1)], Priority::Normal), now).unwrap();
        orch.tick(now);
        assert_eq!(orch.state.track_owner[&TrackId(1)], second);
        assert!(!orch.state.playbacks.contains_key(&first));
    }

    #[test]
    fn delayed_play_does_not_admit_before_its_time() {
        let mut orch = Orchestrator::new(EngineConfig::default());
        orch.register_track(Track::new(TrackId(1), 1, "t1", Position::ORIGIN));
        let now = Instant::now();
        let mut r = req(vec![TrackId(1)], Priority::Normal);
        r.delay_s = 1.0;
        let id = orch.play(r, now).unwrap();
        orch.tick(now);
        assert!(!orch.state.playbacks.contains_key(&id));
        orch.tick(now + Duration::from_millis(1100));
        assert!(orch.state.playbacks.contains_key(&id));
    }

    #[test]
    fn allow_concurrent_ghosts_dont_appear_in_updates() {
        let mut config = EngineConfig::default();
        config.default_conflict_strategy = hlx_core::ConflictStrategy::AllowConcurrent;
        let mut orch = Orchestrator::new(config);
        orch.register_track(Track::new(TrackId(1), 1, "t1", Position::ORIGIN));
        let now = Instant::now();
        orch.play(req(vec![TrackId(1)], Priority::Normal), now).unwrap();
        orch.tick(now);
        orch.play(req(vec![TrackId(1)], Priority::Normal), now).unwrap();
        let updates = orch.tick(now + Duration::from_millis(16));
        assert_eq!(updates.iter().filter(|u| u.track_id == TrackId(1)).count(), 1);
    }
}
