//! `linear` and `zigzag`: motion along a straight line between two points.

use hlx_core::{LinearParams, Plane, Position, ZigzagParams};

use crate::bump_orthogonal;

pub fn evaluate_linear(p: &LinearParams, t: f64) -> Position {
    p.start.lerp(&p.end, t)
}

pub fn default_linear(track_position: Position) -> LinearParams {
    LinearParams { start: track_position, end: track_position.add(&Position::new(2.0, 0.0, 0.0)) }
}

pub fn control_points_linear(p: &LinearParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("end", p.end)]
}

/// Triangle-wave offset, orthogonal to the plane, riding the start-end line.
pub fn evaluate_zigzag(p: &ZigzagParams, t: f64) -> Position {
    let base = p.start.lerp(&p.end, t);
    let segments = p.segments.max(1) as f64;
    let seg_t = (t * segments).fract();
    let phase = seg_t * 4.0;
    let triangle = if phase < 1.0 {
        phase
    } else if phase < 3.0 {
        2.0 - phase
    } else {
        phase - 4.0
    };
    bump_orthogonal(base, p.plane, p.amplitude * triangle)
}

pub fn default_zigzag(track_position: Position) -> ZigzagParams {
    ZigzagParams {
        start: track_position,
        end: track_position.add(&Position::new(2.0, 0.0, 0.0)),
        amplitude: 0.3,
        segments: 6,
        plane: Plane::Xy,
    }
}

pub fn control_points_zigzag(p: &ZigzagParams) -> Vec<(&'static str, Position)> {
    vec![("start", p.start), ("end", p.end)]
}
