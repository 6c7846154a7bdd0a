//! Oscillating and periodic models: `pendulum`, `bounce`, `spring`, `wave`,
//! `lissajous`, `helix`.

use hlx_core::{BounceParams, HelixParams, LissajousParams, PendulumParams, Plane, Position, SpringParams, WaveParams};

use crate::{bump_orthogonal, project_plane};

/// Swings between `+amplitude` and `-amplitude` degrees from vertical, one
/// full swing per unit of `t`.
pub fn evaluate_pendulum(p: &PendulumParams, t: f64) -> Position {
    let angle = (p.amplitude_deg * (2.0 * std::f64::consts::PI * t).sin()).to_radians();
    let u = p.length * angle.sin();
    let v = -p.length * angle.cos();
    project_plane(p.pivot, u, v, p.plane)
}

pub fn default_pendulum(track_position: Position) -> PendulumParams {
    PendulumParams { pivot: track_position, length: 2.0, amplitude_deg: 30.0, plane: Plane::Xy }
}

pub fn control_points_pendulum(p: &PendulumParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_pendulum(p, 0.0)), ("pivot", p.pivot)]
}

/// Travels `start -> end` while a damped sinusoidal bounce decays over
/// `bounces` bounces.
pub fn evaluate_bounce(p: &BounceParams, t: f64) -> Position {
    let base = p.start.lerp(&p.end, t);
    let bounces = p.bounces.max(1) as f64;
    let envelope = (1.0 - t).max(0.0);
    let bounce = (p.bounce_height * envelope * (bounces * std::f64::consts::PI * t).sin().abs()).max(0.0);
    bump_orthogonal(base, Plane::Xy, bounce)
}

pub fn default_bounce(track_position: Position) -> BounceParams {
    BounceParams { start: track_position, end: track_position.add(&Position::new(3.0, 0.0, 0.0)), bounce_height: 1.0, bounces: 4 }
}

pub fn control_points_bounce(p: &BounceParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("end", p.end)]
}

/// Damped oscillation from `anchor` settling to `rest`, per the classic
/// spring-mass-damper envelope `e^(-damping·t)·cos(stiffness·t)`.
pub fn evaluate_spring(p: &SpringParams, t: f64) -> Position {
    let envelope = (-p.damping * t * 10.0).exp();
    let osc = (p.stiffness * t * 10.0).cos();
    let factor = 1.0 - envelope * osc;
    p.anchor.lerp(&p.rest, factor.clamp(-1.0, 2.0))
}

pub fn default_spring(track_position: Position) -> SpringParams {
    SpringParams { anchor: track_position, rest: track_position.add(&Position::new(1.5, 0.0, 0.0)), stiffness: 1.5, damping: 0.5 }
}

pub fn control_points_spring(p: &SpringParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_spring(p, 0.0)), ("rest", p.rest)]
}

/// Sinusoidal ride along `start -> end`, `frequency` full cycles over `t`.
pub fn evaluate_wave(p: &WaveParams, t: f64) -> Position {
    let base = p.start.lerp(&p.end, t);
    let offset = p.amplitude * (2.0 * std::f64::consts::PI * p.frequency * t).sin();
    bump_orthogonal(base, p.plane, offset)
}

pub fn default_wave(track_position: Position) -> WaveParams {
    WaveParams { start: track_position, end: track_position.add(&Position::new(3.0, 0.0, 0.0)), amplitude: 0.5, frequency: 3.0, plane: Plane::Xy }
}

pub fn control_points_wave(p: &WaveParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("end", p.end)]
}

pub fn evaluate_lissajous(p: &LissajousParams, t: f64) -> Position {
    let theta = 2.0 * std::f64::consts::PI * t;
    let x = p.amplitude_x * (p.freq_x * theta + p.phase).sin();
    let y = p.amplitude_y * (p.freq_y * theta).sin();
    p.center.add(&Position::new(x, y, 0.0))
}

pub fn default_lissajous(track_position: Position) -> LissajousParams {
    LissajousParams { center: track_position, amplitude_x: 2.0, amplitude_y: 2.0, freq_x: 3.0, freq_y: 2.0, phase: std::f64::consts::FRAC_PI_2 }
}

pub fn control_points_lissajous(p: &LissajousParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_lissajous(p, 0.0)), ("center", p.center)]
}

/// A helical climb: `turns` revolutions around `center` while height ramps
/// linearly to `height`.
pub fn evaluate_helix(p: &HelixParams, t: f64) -> Position {
    let theta = 2.0 * std::f64::consts::PI * p.turns * t;
    let x = p.radius * theta.cos();
    let y = p.radius * theta.sin();
    let z = p.height * t;
    p.center.add(&Position::new(x, y, z))
}

pub fn default_helix(track_position: Position) -> HelixParams {
    HelixParams { center: track_position, radius: 1.5, turns: 4.0, height: 3.0 }
}

pub fn control_points_helix(p: &HelixParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_helix(p, 0.0)), ("center", p.center)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pendulum_rests_at_bottom_at_t_zero() {
        let p = default_pendulum(Position::ORIGIN);
        let pos = evaluate_pendulum(&p, 0.0);
        assert!((pos.y - (-p.length)).abs() < 1e-6);
    }

    #[test]
    fn spring_converges_toward_rest() {
        let p = default_spring(Position::ORIGIN);
        let early = evaluate_spring(&p, 0.05).sub(&p.rest).magnitude();
        let late = evaluate_spring(&p, 5.0).sub(&p.rest).magnitude();
        assert!(late <= early + 1e-6);
    }

    #[test]
    fn helix_climbs_linearly_in_z() {
        let p = default_helix(Position::ORIGIN);
        let mid = evaluate_helix(&p, 0.5);
        assert!((mid.z - p.height * 0.5).abs() < 1e-6);
    }
}
