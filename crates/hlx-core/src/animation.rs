//! Animation definitions, fade configuration, multi-track composition modes,
//! and playback requests — the inputs the Animation Runtime and Playback
//! Orchestrator operate on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::model::{ModelKind, Parameters};
use crate::track::TrackId;
use crate::vector::Position;

/// Unique identifier for a running playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

/// Unique identifier for a pending scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub u64);

static NEXT_PLAYBACK_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SCHEDULE_ID: AtomicU64 = AtomicU64::new(1);

#[inline]
pub fn generate_playback_id() -> PlaybackId {
    PlaybackId(NEXT_PLAYBACK_ID.fetch_add(1, Ordering::Relaxed))
}

#[inline]
pub fn generate_schedule_id() -> ScheduleId {
    ScheduleId(NEXT_SCHEDULE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Easing curve applied to fade-in/fade-out envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Evaluate the curve at `t` in `[0, 1]`, returning a value in `[0, 1]`.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Fade-in or fade-out configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeCfg {
    /// Duration in seconds, `(0, 10]`.
    pub duration_s: f64,
    pub easing: Easing,
}

impl FadeCfg {
    pub fn new(duration_s: f64, easing: Easing) -> Self {
        Self { duration_s: duration_s.clamp(f64::MIN_POSITIVE, 10.0), easing }
    }
}

/// An authored animation: a motion model applied over a duration, with
/// optional looping, ping-pong, and fades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub id: String,
    pub name: String,
    pub duration_s: f64,
    pub r#loop: bool,
    pub ping_pong: bool,
    pub model: ModelKind,
    pub parameters: Parameters,
    pub fade_in: Option<FadeCfg>,
    pub fade_out: Option<FadeCfg>,
}

impl Animation {
    /// `ping_pong` requires `loop`; constructing with an invalid combination
    /// silently disables ping-pong rather than producing a runtime failure
    /// (model evaluation is total, per §4.2, and admission validates intent
    /// separately).
    pub fn validated(mut self) -> Self {
        if self.ping_pong && !self.r#loop {
            self.ping_pong = false;
        }
        if self.duration_s <= 0.0 {
            self.duration_s = 1.0;
        }
        self
    }
}

/// How a single animation's motion is applied across an ordered set of tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MultiTrackMode {
    /// Each track evaluates independently from its own initial position.
    Relative,
    /// All tracks share one evaluated position.
    BarycentricShared,
    /// Tracks keep a fixed offset from the recomputed barycentre of their
    /// initial positions (rotated for rotational models).
    BarycentricIso,
    /// Like `BarycentricIso` but the reference point is user-specified, not
    /// recomputed from track positions.
    BarycentricCentered { center: Position },
    /// Each track evaluates independently with its own parameter record.
    BarycentricCustom { custom_params_per_track: HashMap<TrackId, Parameters> },
}

/// Submission priority; higher preempts lower under `PriorityBased` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Background,
    Low,
    Normal,
    High,
    Emergency,
}

/// Where a playback request originated, for diagnostics/telemetry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestSource {
    Ui,
    Timeline,
    Cue,
    Osc,
}

/// How the orchestrator resolves ownership conflicts on admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictStrategy {
    StopExisting,
    RejectNew,
    /// Permitted only if policy allows overlap; the new playback evaluates
    /// but never emits OSC for tracks already owned (it is "ghosted").
    AllowConcurrent,
    PriorityBased,
}

/// A request to start a new playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub animation: Animation,
    /// Ordered, nonempty, unique track ids.
    pub track_ids: Vec<TrackId>,
    pub mode: MultiTrackMode,
    pub priority: Priority,
    /// Overrides `animation.r#loop` when set.
    pub r#loop: Option<bool>,
    /// Playback speed multiplier, `(0, 4]`.
    pub speed: f64,
    pub source: RequestSource,
    /// Delay in seconds before the playback transitions out of `Scheduled`.
    pub delay_s: f64,
    /// Per-track stagger applied sequentially to ordered `track_ids`: track
    /// `i` holds at its initial position until `L >= i * phase_offset_s`,
    /// then evaluates with local time `L - i * phase_offset_s`. `0.0`
    /// (the default) means every track moves in lockstep.
    #[serde(default)]
    pub phase_offset_s: f64,
}

impl PlaybackRequest {
    pub fn effective_loop(&self) -> bool {
        self.r#loop.unwrap_or(self.animation.r#loop)
    }

    pub fn validate(&self) -> Result<(), crate::error::RequestError> {
        if self.track_ids.is_empty() {
            return Err(crate::error::RequestError::EmptyTracks);
        }
        let mut seen = std::collections::HashSet::new();
        if !self.track_ids.iter().all(|t| seen.insert(*t)) {
            return Err(crate::error::RequestError::InvalidRequest(
                "track_ids must be unique".into(),
            ));
        }
        if !(self.speed > 0.0 && self.speed <= 4.0) {
            return Err(crate::error::RequestError::InvalidRequest(format!(
                "speed {} out of range (0, 4]",
                self.speed
            )));
        }
        if self.delay_s < 0.0 {
            return Err(crate::error::RequestError::InvalidRequest("delay_s must be >= 0".into()));
        }
        if self.phase_offset_s < 0.0 {
            return Err(crate::error::RequestError::InvalidRequest("phase_offset_s must be >= 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong_without_loop_is_disabled() {
        let anim = Animation {
            id: "a".into(),
            name: "a".into(),
            duration_s: 1.0,
            r#loop: false,
            ping_pong: true,
            model: ModelKind::Linear,
            parameters: Parameters::default(),
            fade_in: None,
            fade_out: None,
        }
        .validated();
        assert!(!anim.ping_pong);
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_playback_id();
        let b = generate_playback_id();
        assert_ne!(a, b);
    }

    #[test]
    fn easing_boundaries_and_monotonic() {
        for e in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert!((e.evaluate(0.0) - 0.0).abs() < 1e-9);
            assert!((e.evaluate(1.0) - 1.0).abs() < 1e-9);
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = e.evaluate(t);
                assert!(v >= prev - 1e-9, "{:?} not monotonic at t={}", e, t);
                prev = v;
            }
        }
    }

    #[test]
    fn empty_tracks_rejected() {
        let req = PlaybackRequest {
            animation: Animation {
                id: "a".into(),
                name: "a".into(),
                duration_s: 1.0,
                r#loop: false,
                ping_pong: false,
                model: ModelKind::Linear,
                parameters: Parameters::default(),
                fade_in: None,
                fade_out: None,
            },
            track_ids: vec![],
            mode: MultiTrackMode::Relative,
            priority: Priority::Normal,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Ui,
            delay_s: 0.0,
            phase_offset_s: 0.0,
        };
        assert_eq!(req.validate(), Err(crate::error::RequestError::EmptyTracks));
    }

    #[test]
    fn negative_phase_offset_rejected() {
        let req = PlaybackRequest {
            animation: Animation {
                id: "a".into(),
                name: "a".into(),
                duration_s: 1.0,
                r#loop: false,
                ping_pong: false,
                model: ModelKind::Linear,
                parameters: Parameters::default(),
                fade_in: None,
                fade_out: None,
            },
            track_ids: vec![TrackId(0)],
            mode: MultiTrackMode::Relative,
            priority: Priority::Normal,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Ui,
            delay_s: 0.0,
            phase_offset_s: -0.1,
        };
        assert!(req.validate().is_err());
    }
}
