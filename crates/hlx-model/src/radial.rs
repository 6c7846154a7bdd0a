//! Models whose motion is primarily angular: `circular`, `circularScan`,
//! `orbit`, `zoom`, `elliptical`, `spiral`, `roseCurve`, `epicycloid`.

use hlx_core::{
    CircularParams, CircularScanParams, EllipticalParams, EpicycloidParams, OrbitParams, Plane,
    Position, RoseCurveParams, SpiralParams, ZoomParams,
};

use crate::project_plane;

pub fn evaluate_circular(p: &CircularParams, t: f64) -> Position {
    let theta = (p.start_angle + (p.end_angle - p.start_angle) * t).to_radians();
    project_plane(p.center, p.radius * theta.cos(), p.radius * theta.sin(), p.plane)
}

pub fn default_circular(track_position: Position) -> CircularParams {
    CircularParams { center: track_position, radius: 2.0, start_angle: 0.0, end_angle: 360.0, plane: Plane::Xy }
}

pub fn control_points_circular(p: &CircularParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_circular(p, 0.0)), ("center", p.center)]
}

/// Triangle-wave sweep between `-sweepDeg/2` and `+sweepDeg/2`, repeated
/// `scans` times over the animation's duration.
pub fn evaluate_circular_scan(p: &CircularScanParams, t: f64) -> Position {
    let scans = p.scans.max(1) as f64;
    let seg_t = (t * scans).fract();
    let triangle01 = 1.0 - (2.0 * seg_t - 1.0).abs();
    let theta = (-p.sweep_deg / 2.0 + p.sweep_deg * triangle01).to_radians();
    project_plane(p.center, p.radius * theta.cos(), p.radius * theta.sin(), Plane::Xy)
}

pub fn default_circular_scan(track_position: Position) -> CircularScanParams {
    CircularScanParams { center: track_position, radius: 2.0, sweep_deg: 90.0, scans: 3 }
}

pub fn control_points_circular_scan(p: &CircularScanParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_circular_scan(p, 0.0)), ("center", p.center)]
}

/// A circle in the XY plane tilted by `inclinationDeg` around the X axis.
pub fn evaluate_orbit(p: &OrbitParams, t: f64) -> Position {
    let angle = 2.0 * std::f64::consts::PI * p.revolutions * t;
    let (sin_a, cos_a) = angle.sin_cos();
    let incl = p.inclination_deg.to_radians();
    let x = p.radius * cos_a;
    let y = p.radius * sin_a * incl.cos();
    let z = p.radius * sin_a * incl.sin();
    p.center.add(&Position::new(x, y, z))
}

pub fn default_orbit(track_position: Position) -> OrbitParams {
    OrbitParams { center: track_position, radius: 2.0, inclination_deg: 30.0, revolutions: 1.0 }
}

pub fn control_points_orbit(p: &OrbitParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_orbit(p, 0.0)), ("center", p.center)]
}

pub fn evaluate_zoom(p: &ZoomParams, t: f64) -> Position {
    let dist = p.start_distance + (p.end_distance - p.start_distance) * t;
    let dir = p.direction;
    let mag = dir.magnitude();
    let unit = if mag > 1e-12 { dir.scale(1.0 / mag) } else { Position::new(0.0, 1.0, 0.0) };
    p.anchor.add(&unit.scale(dist))
}

pub fn default_zoom(track_position: Position) -> ZoomParams {
    ZoomParams { anchor: track_position, direction: Position::new(0.0, 1.0, 0.0), start_distance: 1.0, end_distance: 5.0 }
}

pub fn evaluate_elliptical(p: &EllipticalParams, t: f64) -> Position {
    let theta = (p.start_angle + (p.end_angle - p.start_angle) * t).to_radians();
    project_plane(p.center, p.radius_a * theta.cos(), p.radius_b * theta.sin(), p.plane)
}

pub fn default_elliptical(track_position: Position) -> EllipticalParams {
    EllipticalParams {
        center: track_position,
        radius_a: 3.0,
        radius_b: 1.5,
        start_angle: 0.0,
        end_angle: 360.0,
        plane: Plane::Xy,
    }
}

pub fn control_points_elliptical(p: &EllipticalParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_elliptical(p, 0.0)), ("center", p.center)]
}

/// A spiral: radius interpolates `startRadius..endRadius` while angle sweeps
/// `turns` full revolutions and height ramps linearly.
pub fn evaluate_spiral(p: &SpiralParams, t: f64) -> Position {
    let radius = p.start_radius + (p.end_radius - p.start_radius) * t;
    let theta = 2.0 * std::f64::consts::PI * p.turns * t;
    let base = project_plane(p.center, radius * theta.cos(), radius * theta.sin(), p.plane);
    crate::bump_orthogonal(base, p.plane, p.height * t)
}

pub fn default_spiral(track_position: Position) -> SpiralParams {
    SpiralParams { center: track_position, start_radius: 0.2, end_radius: 2.5, turns: 3.0, height: 1.0, plane: Plane::Xy }
}

pub fn control_points_spiral(p: &SpiralParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_spiral(p, 0.0)), ("center", p.center)]
}

/// `r(θ) = radius · cos(petals · θ)`, `θ` sweeping a full turn over `t`.
pub fn evaluate_rose_curve(p: &RoseCurveParams, t: f64) -> Position {
    let theta = 2.0 * std::f64::consts::PI * t;
    let r = p.radius * (p.petals * theta).cos();
    project_plane(p.center, r * theta.cos(), r * theta.sin(), p.plane)
}

pub fn default_rose_curve(track_position: Position) -> RoseCurveParams {
    RoseCurveParams { center: track_position, radius: 2.0, petals: 5.0, plane: Plane::Xy }
}

pub fn control_points_rose_curve(p: &RoseCurveParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_rose_curve(p, 0.0)), ("center", p.center)]
}

/// A rolling circle of `rollingRadius` around a fixed circle of
/// `fixedRadius`, traced over one full revolution.
pub fn evaluate_epicycloid(p: &EpicycloidParams, t: f64) -> Position {
    let theta = 2.0 * std::f64::consts::PI * t;
    let r = p.fixed_radius;
    let k = p.rolling_radius.max(1e-6);
    let x = (r + k) * theta.cos() - k * ((r + k) / k * theta).cos();
    let y = (r + k) * theta.sin() - k * ((r + k) / k * theta).sin();
    project_plane(p.center, x, y, p.plane)
}

pub fn default_epicycloid(track_position: Position) -> EpicycloidParams {
    EpicycloidParams { center: track_position, fixed_radius: 1.5, rolling_radius: 0.5, plane: Plane::Xy }
}

pub fn control_points_epicycloid(p: &EpicycloidParams) -> Vec<(&'static str, Position)> {
    vec![("start", evaluate_epicycloid(p, 0.0)), ("center", p.center)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_sweeps_full_circle_back_to_start() {
        let p = default_circular(Position::ORIGIN);
        let start = evaluate_circular(&p, 0.0);
        let end = evaluate_circular(&p, 1.0);
        assert!((start.x - end.x).abs() < 1e-6);
        assert!((start.y - end.y).abs() < 1e-6);
    }

    #[test]
    fn circular_scan_starts_at_negative_half_sweep() {
        let p = default_circular_scan(Position::ORIGIN);
        let pos = evaluate_circular_scan(&p, 0.0);
        let expected_theta = (-p.sweep_deg / 2.0).to_radians();
        let expected = Position::new(p.radius * expected_theta.cos(), p.radius * expected_theta.sin(), 0.0);
        assert!((pos.x - expected.x).abs() < 1e-6);
    }

    #[test]
    fn zoom_uses_unit_direction() {
        let mut p = default_zoom(Position::ORIGIN);
        p.direction = Position::new(0.0, 3.0, 4.0);
        let at_start = evaluate_zoom(&p, 0.0);
        assert!((at_start.magnitude() - p.start_distance).abs() < 1e-6);
    }
}
