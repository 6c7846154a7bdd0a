//! The playback state machine: `Scheduled -> Starting -> Playing ->
//! (Paused) -> Stopping -> Stopped`, with `Error` terminal from any state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hlx_core::{
    Animation, Easing, Event, EvaluationWarningReason, FadeCfg, MultiTrackMode, PlaybackId, PlaybackRequest, Position,
    TrackId,
};

use crate::clock;
use crate::evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Starting,
    Playing,
    Paused,
    Stopping,
    Stopped,
    Error,
}

pub struct TrackPositionUpdate {
    pub track_id: TrackId,
    pub position: Position,
    pub previous_position: Position,
}

pub struct TickOutput {
    pub updates: Vec<TrackPositionUpdate>,
    pub events: Vec<Event>,
}

/// A running (or about to run) animation, owning one slice of the track
/// ownership map. Constructed already past `Scheduled` — the orchestrator
/// owns the scheduled-action bookkeeping that precedes this.
pub struct Playback {
    pub id: PlaybackId,
    pub request: PlaybackRequest,
    state: PlaybackState,
    started_at_mono: Instant,
    paused_at: Option<Instant>,
    paused_accum: Duration,
    frozen_initial_positions: HashMap<TrackId, Position>,
    last_positions: HashMap<TrackId, Position>,
    fade_out_started_at: Option<Instant>,
    fade_out_baseline: HashMap<TrackId, Position>,
    fade_out_target: HashMap<TrackId, Position>,
    warned: bool,
}

impl Playback {
    pub fn new(id: PlaybackId, request: PlaybackRequest, now: Instant, current_positions: &HashMap<TrackId, Position>) -> Self {
        let frozen_initial_positions: HashMap<TrackId, Position> = request
            .track_ids
            .iter()
            .map(|&t| (t, current_positions.get(&t).copied().unwrap_or(Position::ORIGIN)))
            .collect();
        let last_positions = frozen_initial_positions.clone();
        Self {
            id,
            request,
            state: PlaybackState::Starting,
            started_at_mono: now,
            paused_at: None,
            paused_accum: Duration::ZERO,
            frozen_initial_positions,
            last_positions,
            fade_out_started_at: None,
            fade_out_baseline: HashMap::new(),
            fade_out_target: HashMap::new(),
            warned: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, PlaybackState::Stopped | PlaybackState::Error)
    }

    pub fn frozen_initial_positions(&self) -> &HashMap<TrackId, Position> {
        &self.frozen_initial_positions
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.paused_at = Some(now);
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.state == PlaybackState::Paused {
            if let Some(paused_at) = self.paused_at.take() {
                self.paused_accum += now.saturating_duration_since(paused_at);
            }
            self.state = PlaybackState::Playing;
            true
        } else {
            false
        }
    }

    pub fn set_speed(&mut self, now: Instant, new_speed: f64) {
        let current_l = self.local_time_s(now);
        self.request.speed = new_speed;
        self.started_at_mono = clock::rebase_for_local_time(now, self.paused_accum, new_speed, current_l);
    }

    /// Ignored while `Stopping` (fade-out already committed).
    pub fn seek(&mut self, now: Instant, t_s: f64) {
        if self.state == PlaybackState::Stopping {
            return;
        }
        let target_l = t_s * self.request.speed;
        self.started_at_mono = clock::rebase_for_local_time(now, self.paused_accum, self.request.speed, target_l);
    }

    /// Arms fade-out (if `fade_out` is configured) and transitions to
    /// `Stopping`; otherwise stops immediately. `initial_positions_now` is
    /// each owned track's *current* `initialPosition` (may have drifted
    /// since `Starting` if another playback released the track meanwhile).
    pub fn stop(&mut self, now: Instant, fade_out: Option<FadeCfg>, initial_positions_now: &HashMap<TrackId, Position>) -> Vec<Event> {
        if self.is_terminal() {
            return vec![];
        }
        match fade_out {
            Some(_) => {
                self.state = PlaybackState::Stopping;
                self.fade_out_started_at = Some(now);
                self.fade_out_baseline = self.last_positions.clone();
                self.fade_out_target = self
                    .request
                    .track_ids
                    .iter()
                    .map(|&t| (t, initial_positions_now.get(&t).copied().unwrap_or(Position::ORIGIN)))
                    .collect();
                vec![]
            }
            None => {
                self.state = PlaybackState::Stopped;
                vec![Event::Stopped { playback_id: self.id }]
            }
        }
    }

    fn local_time_s(&self, now: Instant) -> f64 {
        clock::local_time_s(self.started_at_mono, self.paused_accum, self.request.speed, now)
    }

    /// Advance one tick while `Playing`. A `Stopping` playback is advanced
    /// through `tick_fade_out` instead, since its fade curve lives on the
    /// `Animation` the orchestrator already holds.
    pub fn tick(&mut self, now: Instant, animation: &Animation, mode: &MultiTrackMode) -> TickOutput {
        match self.state {
            PlaybackState::Playing => self.tick_playing(now, animation, mode),
            _ => TickOutput { updates: vec![], events: vec![] },
        }
    }

    /// Promote a freshly-created playback out of `Starting`, emitting
    /// `Started`. Call once, before the first `tick`.
    pub fn activate(&mut self) -> Event {
        self.state = PlaybackState::Playing;
        Event::Started { playback_id: self.id }
    }

    fn tick_playing(&mut self, now: Instant, animation: &Animation, mode: &MultiTrackMode) -> TickOutput {
        let l = self.local_time_s(now);
        let phase_offset_s = self.request.phase_offset_s;
        let fade_in_df = animation.fade_in.map(|f| f.duration_s).unwrap_or(0.0);

        let mut track_t = HashMap::with_capacity(self.request.track_ids.len());
        let mut completed = false;
        for (i, &track_id) in self.request.track_ids.iter().enumerate() {
            let l_i = clock::track_local_time_s(l, i, phase_offset_s);
            let effective_l_i = (l_i - fade_in_df).max(0.0);
            let cycle = clock::cycle_t(effective_l_i, animation.duration_s, self.request.effective_loop(), animation.ping_pong);
            track_t.insert(track_id, cycle.t);
            if !self.request.effective_loop() && i == self.request.track_ids.len() - 1 && cycle.completed {
                completed = true;
            }
        }

        let mut raw = evaluator::evaluate_tracks(animation, mode, &self.request.track_ids, &self.frozen_initial_positions, &track_t);

        let mut events = vec![];
        for &track_id in &self.request.track_ids {
            let pos = raw.get(&track_id).copied().unwrap_or(Position::ORIGIN);
            if !pos.is_finite() {
                let fallback = *self.last_positions.get(&track_id).unwrap_or(&Position::ORIGIN);
                raw.insert(track_id, fallback);
                if !self.warned {
                    self.warned = true;
                    events.push(Event::EvaluationWarning {
                        playback_id: self.id,
                        track_id,
                        reason: EvaluationWarningReason::NonFiniteOutput,
                    });
                }
            }
        }

        // fade-in blend, per track, against its own schedule
        let mut updates = Vec::with_capacity(self.request.track_ids.len());
        for (i, &track_id) in self.request.track_ids.iter().enumerate() {
            let l_i = clock::track_local_time_s(l, i, phase_offset_s);
            let model_pos = raw[&track_id];
            let previous = *self.last_positions.get(&track_id).unwrap_or(&model_pos);
            let position = if let Some(fade_in) = animation.fade_in {
                if l_i < fade_in.duration_s {
                    let origin = *self.frozen_initial_positions.get(&track_id).unwrap_or(&model_pos);
                    let e = fade_in.easing.evaluate(l_i / fade_in.duration_s.max(1e-9));
                    origin.lerp(&model_pos, e)
                } else {
                    model_pos
                }
            } else {
                model_pos
            };
            self.last_positions.insert(track_id, position);
            updates.push(TrackPositionUpdate { track_id, position, previous_position: previous });
        }

        if completed {
            events.push(Event::Completed { playback_id: self.id });
            if animation.fade_out.is_some() {
                self.state = PlaybackState::Stopping;
                self.fade_out_started_at = Some(now);
                self.fade_out_baseline = self.last_positions.clone();
                self.fade_out_target = self.frozen_initial_positions.clone();
            } else {
                self.state = PlaybackState::Stopped;
                events.push(Event::Stopped { playback_id: self.id });
            }
        }

        TickOutput { updates, events }
    }

    /// Advance a fade-out in progress. Separate from `tick` because the
    /// fade curve (duration, easing) lives on the `Animation`, which the
    /// orchestrator already has in hand when driving `Stopping` playbacks.
    pub fn tick_fade_out(&mut self, now: Instant, fade_out: FadeCfg) -> TickOutput {
        if self.state != PlaybackState::Stopping {
            return TickOutput { updates: vec![], events: vec![] };
        }
        let started_at = match self.fade_out_started_at {
            Some(t) => t,
            None => return TickOutput { updates: vec![], events: vec![] },
        };
        let l_prime = now.saturating_duration_since(started_at).as_secs_f64() * self.request.speed;
        let e = fade_out.easing.evaluate((l_prime / fade_out.duration_s.max(1e-9)).clamp(0.0, 1.0));

        let mut updates = Vec::with_capacity(self.request.track_ids.len());
        for &track_id in &self.request.track_ids {
            let baseline = *self.fade_out_baseline.get(&track_id).unwrap_or(&Position::ORIGIN);
            let target = *self.fade_out_target.get(&track_id).unwrap_or(&baseline);
            let previous = *self.last_positions.get(&track_id).unwrap_or(&baseline);
            let position = baseline.lerp(&target, e);
            self.last_positions.insert(track_id, position);
            updates.push(TrackPositionUpdate { track_id, position, previous_position: previous });
        }

        let mut events = vec![];
        if l_prime >= fade_out.duration_s {
            for &track_id in &self.request.track_ids {
                let target = *self.fade_out_target.get(&track_id).unwrap_or(&Position::ORIGIN);
                if let Some(u) = updates.iter_mut().find(|u| u.track_id == track_id) {
                    u.position = target;
                }
            }
            self.state = PlaybackState::Stopped;
            events.push(Event::Stopped { playback_id: self.id });
        }

        TickOutput { updates, events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_core::{ModelKind, Priority, RequestSource};

    fn request(track_ids: Vec<TrackId>, duration_s: f64, loop_: bool, ping_pong: bool) -> PlaybackRequest {
        let animation = Animation {
            id: "a".into(),
            name: "a".into(),
            duration_s,
            r#loop: loop_,
            ping_pong,
            model: ModelKind::Linear,
            parameters: hlx_model::default_parameters(ModelKind::Linear, Position::ORIGIN),
            fade_in: None,
            fade_out: None,
        }
        .validated();
        PlaybackRequest {
            animation,
            track_ids,
            mode: MultiTrackMode::Relative,
            priority: Priority::Normal,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Ui,
            delay_s: 0.0,
            phase_offset_s: 0.0,
        }
    }

    #[test]
    fn new_playback_freezes_current_positions() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let mut positions = HashMap::new();
        positions.insert(t0, Position::new(1.0, 2.0, 3.0));
        let req = request(vec![t0], 1.0, false, false);
        let pb = Playback::new(PlaybackId(1), req, now, &positions);
        assert_eq!(pb.frozen_initial_positions()[&t0], positions[&t0]);
    }

    #[test]
    fn non_loop_completes_and_stops_when_no_fade_out_armed() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let positions = HashMap::from([(t0, Position::ORIGIN)]);
        let req = request(vec![t0], 1.0, false, false);
        let animation = req.animation.clone();
        let mode = req.mode.clone();
        let mut pb = Playback::new(PlaybackId(1), req, now, &positions);
        pb.activate();
        let later = now + Duration::from_secs(2);
        let out = pb.tick(later, &animation, &mode);
        assert!(out.events.iter().any(|e| matches!(e, Event::Completed { .. })));
        assert!(out.events.iter().any(|e| matches!(e, Event::Stopped { .. })));
        assert_eq!(pb.state(), PlaybackState::Stopped);
    }

    #[test]
    fn pause_then_resume_does_not_advance_local_time() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let positions = HashMap::from([(t0, Position::ORIGIN)]);
        let req = request(vec![t0], 10.0, false, false);
        let mut pb = Playback::new(PlaybackId(1), req, now, &positions);
        pb.activate();
        pb.pause(now + Duration::from_secs(1));
        let l_paused = pb.local_time_s(now + Duration::from_secs(1));
        pb.resume(now + Duration::from_secs(5));
        let l_resumed = pb.local_time_s(now + Duration::from_secs(5));
        assert!((l_paused - l_resumed).abs() < 1e-6);
    }

    #[test]
    fn stop_without_fade_out_is_immediate() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let positions = HashMap::from([(t0, Position::ORIGIN)]);
        let req = request(vec![t0], 1.0, false, false);
        let mut pb = Playback::new(PlaybackId(1), req, now, &positions);
        pb.activate();
        let events = pb.stop(now, None, &positions);
        assert_eq!(pb.state(), PlaybackState::Stopped);
        assert!(events.iter().any(|e| matches!(e, Event::Stopped { .. })));
    }

    #[test]
    fn fade_out_interpolates_to_initial_position_then_stops() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let start_positions = HashMap::from([(t0, Position::new(5.0, 0.0, 0.0))]);
        let retreat_target = HashMap::from([(t0, Position::new(0.0, 0.0, 0.0))]);
        let req = request(vec![t0], 1.0, false, false);
        let mut pb = Playback::new(PlaybackId(1), req, now, &start_positions);
        pb.activate();
        pb.tick(now, &pb_animation(), &MultiTrackMode::Relative);
        pb.stop(now, Some(FadeCfg::new(0.5, Easing::Linear)), &retreat_target);
        let mid = pb.tick_fade_out(now + Duration::from_millis(250), FadeCfg::new(0.5, Easing::Linear));
        assert_eq!(mid.updates.len(), 1);
        assert!(mid.updates[0].position.sub(&retreat_target[&t0]).magnitude() > 1e-3);
        let end = pb.tick_fade_out(now + Duration::from_millis(600), FadeCfg::new(0.5, Easing::Linear));
        assert_eq!(pb.state(), PlaybackState::Stopped);
        assert!(end.updates[0].position.sub(&retreat_target[&t0]).magnitude() < 1e-6);
    }

    #[test]
    fn phase_offset_holds_later_tracks_at_initial_position() {
        let now = Instant::now();
        let t0 = TrackId(0);
        let t1 = TrackId(1);
        let positions = HashMap::from([(t0, Position::ORIGIN), (t1, Position::ORIGIN)]);
        let mut req = request(vec![t0, t1], 5.0, false, false);
        req.phase_offset_s = 0.2;
        let animation = req.animation.clone();
        let mode = req.mode.clone();
        let mut pb = Playback::new(PlaybackId(1), req, now, &positions);
        pb.activate();
        let out = pb.tick(now + Duration::from_millis(100), &animation, &mode);
        let t0_pos = out.updates.iter().find(|u| u.track_id == t0).unwrap().position;
        let t1_pos = out.updates.iter().find(|u| u.track_id == t1).unwrap().position;
        assert!(t0_pos.sub(&Position::ORIGIN).magnitude() > 1e-6, "track 0 should have moved");
        assert!(t1_pos.sub(&Position::ORIGIN).magnitude() < 1e-9, "track 1 should still hold its initial position");
    }

    fn pb_animation() -> Animation {
        Animation {
            id: "a".into(),
            name: "a".into(),
            duration_s: 1.0,
            r#loop: false,
            ping_pong: false,
            model: ModelKind::Linear,
            parameters: hlx_model::default_parameters(ModelKind::Linear, Position::ORIGIN),
            fade_in: None,
            fade_out: None,
        }
    }
}
