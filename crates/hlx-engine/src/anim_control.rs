//! Translates inbound `/anim/*` OSC messages into `Orchestrator` calls.
//!
//! Every address takes the target playback as its first argument, either
//! the decimal `PlaybackId` or the owning animation's name/id string.
//! `play`/`stop`/`pause` on a target that doesn't resolve are silently
//! ignored (the remote control surface doesn't get a reply channel); the
//! device is never the source of truth for *which* playback is meant.

use std::time::Instant;

use hlx_orchestrator::Orchestrator;
use rosc::OscType;

fn string_arg(args: &[OscType], i: usize) -> Option<&str> {
    match args.get(i) {
        Some(OscType::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn f64_arg(args: &[OscType], i: usize) -> Option<f64> {
    match args.get(i) {
        Some(OscType::Float(f)) => Some(*f as f64),
        Some(OscType::Double(d)) => Some(*d),
        Some(OscType::Int(n)) => Some(*n as f64),
        _ => None,
    }
}

fn bool_arg(args: &[OscType], i: usize) -> Option<bool> {
    match args.get(i) {
        Some(OscType::Bool(b)) => Some(*b),
        Some(OscType::Int(n)) => Some(*n != 0),
        Some(OscType::Float(f)) => Some(*f != 0.0),
        _ => None,
    }
}

/// Dispatch one `/anim/*` address. `address` still carries the leading
/// `/anim/` segment; only the suffix after it selects the operation.
pub fn dispatch(orchestrator: &mut Orchestrator, now: Instant, address: &str, args: &[OscType]) {
    let op = address.trim_start_matches("/anim/");
    let Some(target) = string_arg(args, 0) else {
        log::debug!("{address}: missing target token, ignored");
        return;
    };
    let Some(id) = orchestrator.find_playback(target) else {
        log::debug!("{address}: no playback matches '{target}'");
        return;
    };

    let result = match op {
        "play" => orchestrator.resume(id, now),
        "stop" => orchestrator.stop(id, now),
        "pause" => orchestrator.pause(id, now),
        "gotoStart" => orchestrator.seek(id, now, 0.0),
        "seek" => match f64_arg(args, 1) {
            Some(t_s) => orchestrator.seek(id, now, t_s),
            None => {
                log::debug!("{address}: missing numeric time argument");
                return;
            }
        },
        "time" => match f64_arg(args, 1) {
            Some(t_s) => orchestrator.seek(id, now, t_s),
            None => {
                log::debug!("{address}: missing numeric time argument");
                return;
            }
        },
        "speed" => match f64_arg(args, 1) {
            Some(speed) => orchestrator.set_speed(id, now, speed),
            None => {
                log::debug!("{address}: missing numeric speed argument");
                return;
            }
        },
        "loop" => match bool_arg(args, 1) {
            Some(enabled) => orchestrator.set_loop(id, enabled),
            None => {
                log::debug!("{address}: missing boolean loop argument");
                return;
            }
        },
        "pingPong" => match bool_arg(args, 1) {
            Some(enabled) => orchestrator.set_ping_pong(id, enabled),
            None => {
                log::debug!("{address}: missing boolean pingPong argument");
                return;
            }
        },
        _ => {
            log::debug!("unrecognised animation-control address: {address}");
            return;
        }
    };

    if let Err(e) = result {
        log::debug!("{address} on {target}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_core::{
        Animation, EngineConfig, FadeCfg, ModelKind, MultiTrackMode, Parameters, PlaybackRequest, Position,
        Priority, RequestSource, Track, TrackId,
    };

    fn playing_orchestrator() -> (Orchestrator, hlx_core::PlaybackId) {
        let mut o = Orchestrator::new(EngineConfig::default());
        o.register_track(Track::new(TrackId(1), 1, "t1", Position::ORIGIN));
        let request = PlaybackRequest {
            animation: Animation {
                id: "a1".into(),
                name: "sweep".into(),
                duration_s: 10.0,
                r#loop: false,
                ping_pong: false,
                model: ModelKind::Linear,
                parameters: Parameters::default(),
                fade_in: None,
                fade_out: None::<FadeCfg>,
            },
            track_ids: vec![TrackId(1)],
            mode: MultiTrackMode::Relative,
            priority: Priority::Normal,
            r#loop: None,
            speed: 1.0,
            source: RequestSource::Osc,
            delay_s: 0.0,
            phase_offset_s: 0.0,
        };
        let now = Instant::now();
        let id = o.play(request, now).expect("valid request admits");
        o.tick(now);
        (o, id)
    }

    #[test]
    fn pause_by_name_resolves_and_pauses() {
        let (mut o, id) = playing_orchestrator();
        let now = Instant::now();
        dispatch(&mut o, now, "/anim/pause", &[OscType::String("sweep".into())]);
        assert_eq!(o.find_playback(&id.0.to_string()), Some(id));
    }

    #[test]
    fn speed_requires_numeric_argument() {
        let (mut o, _id) = playing_orchestrator();
        let now = Instant::now();
        dispatch(&mut o, now, "/anim/speed", &[OscType::String("sweep".into())]);
    }

    #[test]
    fn unknown_target_is_a_no_op() {
        let (mut o, _id) = playing_orchestrator();
        let now = Instant::now();
        dispatch(&mut o, now, "/anim/stop", &[OscType::String("does-not-exist".into())]);
    }
}
