//! Multi-track composition: turns one authored `Animation` plus a
//! `MultiTrackMode` into a position for every track in the request.

use std::collections::HashMap;

use hlx_core::{Animation, MultiTrackMode, Position, TrackId};

/// Evaluate every track in `track_ids` for this tick.
///
/// `track_t` gives each track's own normalized `t ∈ [0, 1]` (already passed
/// through the phase-offset + cycle mapping in `clock`); `frozen_initial`
/// is the position captured when the playback entered `Starting`.
pub fn evaluate_tracks(
    animation: &Animation,
    mode: &MultiTrackMode,
    track_ids: &[TrackId],
    frozen_initial: &HashMap<TrackId, Position>,
    track_t: &HashMap<TrackId, f64>,
) -> HashMap<TrackId, Position> {
    match mode {
        MultiTrackMode::Relative => evaluate_relative(animation, track_ids, frozen_initial, track_t),
        MultiTrackMode::BarycentricShared => evaluate_shared(animation, track_ids, track_t),
        MultiTrackMode::BarycentricIso => {
            let center = mean_position(track_ids, frozen_initial);
            evaluate_barycentric(animation, track_ids, frozen_initial, track_t, center)
        }
        MultiTrackMode::BarycentricCentered { center } => {
            evaluate_barycentric(animation, track_ids, frozen_initial, track_t, *center)
        }
        MultiTrackMode::BarycentricCustom { custom_params_per_track } => {
            evaluate_custom(track_ids, custom_params_per_track, &animation.parameters, track_t)
        }
    }
}

fn mean_position(track_ids: &[TrackId], frozen_initial: &HashMap<TrackId, Position>) -> Position {
    if track_ids.is_empty() {
        return Position::ORIGIN;
    }
    let sum = track_ids.iter().fold(Position::ORIGIN, |acc, t| {
        acc.add(frozen_initial.get(t).unwrap_or(&Position::ORIGIN))
    });
    sum.scale(1.0 / track_ids.len() as f64)
}

/// Each track rides the authored curve, re-anchored at its own frozen
/// initial position (shape preserved, origin translated).
fn evaluate_relative(
    animation: &Animation,
    track_ids: &[TrackId],
    frozen_initial: &HashMap<TrackId, Position>,
    track_t: &HashMap<TrackId, f64>,
) -> HashMap<TrackId, Position> {
    let nominal = hlx_model::nominal_anchor(&animation.parameters);
    track_ids
        .iter()
        .map(|&id| {
            let t = *track_t.get(&id).unwrap_or(&0.0);
            let origin = *frozen_initial.get(&id).unwrap_or(&nominal);
            let params = hlx_model::translate(&animation.parameters, origin.sub(&nominal));
            (id, hlx_model::evaluate(&params, t))
        })
        .collect()
}

fn evaluate_shared(animation: &Animation, track_ids: &[TrackId], track_t: &HashMap<TrackId, f64>) -> HashMap<TrackId, Position> {
    let t = track_ids.first().and_then(|id| track_t.get(id)).copied().unwrap_or(0.0);
    let pos = hlx_model::evaluate(&animation.parameters, t);
    track_ids.iter().map(|&id| (id, pos)).collect()
}

/// Evaluate the model centred at `center`, then add each track's offset from
/// `center`, rotating the offset for rotational models so the formation
/// turns together.
fn evaluate_barycentric(
    animation: &Animation,
    track_ids: &[TrackId],
    frozen_initial: &HashMap<TrackId, Position>,
    track_t: &HashMap<TrackId, f64>,
    center: Position,
) -> HashMap<TrackId, Position> {
    let nominal = hlx_model::nominal_anchor(&animation.parameters);
    let centered_params = hlx_model::translate(&animation.parameters, center.sub(&nominal));
    let t = track_ids.first().and_then(|id| track_t.get(id)).copied().unwrap_or(0.0);
    let b_t = hlx_model::evaluate(&centered_params, t);
    let b_0 = hlx_model::evaluate(&centered_params, 0.0);

    let rotation_deg = if animation.model.is_rotational() {
        let v0 = b_0.sub(&center);
        let vt = b_t.sub(&center);
        angle_deg(vt) - angle_deg(v0)
    } else {
        0.0
    };

    track_ids
        .iter()
        .map(|&id| {
            let offset = frozen_initial.get(&id).copied().unwrap_or(center).sub(&center);
            let rotated = if animation.model.is_rotational() { offset.rotate_z(rotation_deg) } else { offset };
            (id, b_t.add(&rotated))
        })
        .collect()
}

fn angle_deg(v: Position) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

fn evaluate_custom(
    track_ids: &[TrackId],
    custom_params_per_track: &HashMap<TrackId, hlx_core::Parameters>,
    fallback: &hlx_core::Parameters,
    track_t: &HashMap<TrackId, f64>,
) -> HashMap<TrackId, Position> {
    track_ids
        .iter()
        .map(|&id| {
            let t = *track_t.get(&id).unwrap_or(&0.0);
            let params = custom_params_per_track.get(&id).unwrap_or(fallback);
            (id, hlx_model::evaluate(params, t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_core::{Animation, ModelKind};

    fn linear_anim() -> Animation {
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

    #[test]
    fn relative_anchors_each_track_at_its_own_start() {
        let anim = linear_anim();
        let t0 = TrackId(0);
        let t1 = TrackId(1);
        let mut frozen = HashMap::new();
        frozen.insert(t0, Position::new(0.0, 0.0, 0.0));
        frozen.insert(t1, Position::new(10.0, 0.0, 0.0));
        let mut ts = HashMap::new();
        ts.insert(t0, 0.0);
        ts.insert(t1, 0.0);
        let result = evaluate_tracks(&anim, &MultiTrackMode::Relative, &[t0, t1], &frozen, &ts);
        assert!((result[&t0].sub(&frozen[&t0]).magnitude()) < 1e-9);
        assert!((result[&t1].sub(&frozen[&t1]).magnitude()) < 1e-9);
    }

    #[test]
    fn shared_assigns_identical_position() {
        let anim = linear_anim();
        let t0 = TrackId(0);
        let t1 = TrackId(1);
        let frozen = HashMap::new();
        let mut ts = HashMap::new();
        ts.insert(t0, 0.5);
        ts.insert(t1, 0.5);
        let result = evaluate_tracks(&anim, &MultiTrackMode::BarycentricShared, &[t0, t1], &frozen, &ts);
        assert_eq!(result[&t0], result[&t1]);
    }

    #[test]
    fn barycentric_iso_preserves_relative_offsets_for_non_rotational() {
        let anim = linear_anim();
        let t0 = TrackId(0);
        let t1 = TrackId(1);
        let mut frozen = HashMap::new();
        frozen.insert(t0, Position::new(-1.0, 0.0, 0.0));
        frozen.insert(t1, Position::new(1.0, 0.0, 0.0));
        let mut ts = HashMap::new();
        ts.insert(t0, 0.0);
        ts.insert(t1, 0.0);
        let result = evaluate_tracks(&anim, &MultiTrackMode::BarycentricIso, &[t0, t1], &frozen, &ts);
        let spread = result[&t1].sub(&result[&t0]).magnitude();
        assert!((spread - 2.0).abs() < 1e-6);
    }
}
