//! Multi-source-flavoured models: `formation`, `attractRepel`, `doppler`,
//! and `custom` (author-supplied keyframes).

use hlx_core::{AttractRepelParams, CustomParams, DopplerParams, FormationParams, Position};

/// A single track orbiting a slowly-breathing circle around `center` —
/// useful as one member of a `formation` when driven per-track with phase
/// offsets by the runtime.
pub fn evaluate_formation(p: &FormationParams, t: f64) -> Position {
    let theta = 2.0 * std::f64::consts::PI * t;
    let r = p.spread * (1.0 + 0.15 * (4.0 * theta).sin());
    p.center.add(&Position::new(r * theta.cos(), r * theta.sin(), 0.0))
}

pub fn default_formation(track_position: Position) -> FormationParams {
    FormationParams { center: track_position, spread: 2.0 }
}

pub fn control_points_formation(p: &FormationParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_formation(p, 0.0)), ("center", p.center)]
}

/// Eases from `start` toward (`repel=false`) or away from (`repel=true`)
/// `target`, strength controlling how close the approach (or how far the
/// retreat) gets.
pub fn evaluate_attract_repel(p: &AttractRepelParams, t: f64) -> Position {
    let strength = p.strength.clamp(0.0, 1.0);
    let eased = t * t * (3.0 - 2.0 * t);
    if p.repel {
        let away = p.start.sub(&p.target);
        let dist = away.magnitude().max(1e-6);
        let unit = away.scale(1.0 / dist);
        p.start.add(&unit.scale(eased * strength * dist))
    } else {
        p.start.lerp(&p.target, eased * strength)
    }
}

pub fn default_attract_repel(track_position: Position) -> AttractRepelParams {
    AttractRepelParams { start: track_position, target: track_position.add(&Position::new(3.0, 0.0, 0.0)), strength: 0.8, repel: false }
}

pub fn control_points_attract_repel(p: &AttractRepelParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("target", p.target)]
}

/// A straight pass-by at lateral offset `passDistance`, from `start` to
/// `end`, evoking the classic Doppler fly-by without modelling pitch.
pub fn evaluate_doppler(p: &DopplerParams, t: f64) -> Position {
    let base = p.start.lerp(&p.end, t);
    let lateral = p.pass_distance * (std::f64::consts::PI * t).sin();
    Position::new(base.x, base.y + lateral, base.z)
}

pub fn default_doppler(track_position: Position) -> DopplerParams {
    DopplerParams { start: track_position, end: track_position.add(&Position::new(6.0, 0.0, 0.0)), pass_distance: 1.0 }
}

pub fn control_points_doppler(p: &DopplerParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("end", p.end)]
}

/// Piecewise-linear interpolation through author-supplied `(time, position)`
/// keyframes, sorted by time. Empty keyframes evaluate to the origin.
pub fn evaluate_custom(p: &CustomParams, t: f64) -> Position {
    if p.keyframes.is_empty() {
        return Position::ORIGIN;
    }
    if p.keyframes.len() == 1 {
        return p.keyframes[0].1;
    }
    let mut sorted = p.keyframes.clone();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    if t <= sorted[0].0 {
        return sorted[0].1;
    }
    if t >= sorted[sorted.len() - 1].0 {
        return sorted[sorted.len() - 1].1;
    }
    for w in sorted.windows(2) {
        let (t0, p0) = w[0];
        let (t1, p1) = w[1];
        if t >= t0 && t <= t1 {
            let span = (t1 - t0).max(1e-9);
            return p0.lerp(&p1, (t - t0) / span);
        }
    }
    sorted[sorted.len() - 1].1
}

pub fn default_custom(track_position: Position) -> CustomParams {
    CustomParams { keyframes: vec![(0.0, track_position), (1.0, track_position.add(&Position::new(2.0, 0.0, 0.0)))] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_empty_keyframes_is_origin() {
        let p = CustomParams { keyframes: vec![] };
        assert_eq!(evaluate_custom(&p, 0.5), Position::ORIGIN);
    }

    #[test]
    fn custom_matches_keyframes_at_their_times() {
        let p = default_custom(Position::new(1.0, 1.0, 1.0));
        assert_eq!(evaluate_custom(&p, 0.0), p.keyframes[0].1);
        assert_eq!(evaluate_custom(&p, 1.0), p.keyframes[1].1);
    }

    #[test]
    fn doppler_returns_to_baseline_at_ends() {
        let p = default_doppler(Position::ORIGIN);
        let start = evaluate_doppler(&p, 0.0);
        let end = evaluate_doppler(&p, 1.0);
        assert!((start.y - p.start.y).abs() < 1e-9);
        assert!((end.y - p.end.y).abs() < 1e-9);
    }
}
