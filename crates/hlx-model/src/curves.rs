//! Spline models: `bezier` (cubic, 4 fixed control points) and `catmullRom`
//! (arbitrary control points, uniform parameterisation).

use hlx_core::{BezierParams, CatmullRomParams, Position};

/// `(1-t)³P0 + 3(1-t)²tP1 + 3(1-t)t²P2 + t³P3`.
pub fn evaluate_bezier(p: &BezierParams, t: f64) -> Position {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Position::new(
        a * p.p0.x + b * p.p1.x + c * p.p2.x + d * p.p3.x,
        a * p.p0.y + b * p.p1.y + c * p.p2.y + d * p.p3.y,
        a * p.p0.z + b * p.p1.z + c * p.p2.z + d * p.p3.z,
    )
}

pub fn default_bezier(track_position: Position) -> BezierParams {
    BezierParams {
        p0: track_position,
        p1: track_position.add(&Position::new(1.0, 2.0, 0.0)),
        p2: track_position.add(&Position::new(2.0, -2.0, 0.0)),
        p3: track_position.add(&Position::new(3.0, 0.0, 0.0)),
    }
}

pub fn control_points_bezier(p: &BezierParams) -> Vec<(&'static str, Position)> {
    vec![("p0", p.p0), ("p1", p.p1), ("p2", p.p2), ("p3", p.p3)]
}

/// Uniform Catmull-Rom spline through `points`. Falls back to the sole
/// point (or the origin if empty) rather than failing on a degenerate
/// control-point list.
pub fn evaluate_catmull_rom(p: &CatmullRomParams, t: f64) -> Position {
    let n = p.points.len();
    if n == 0 {
        return Position::ORIGIN;
    }
    if n == 1 {
        return p.points[0];
    }
    let segment_count = if p.closed { n } else { n - 1 };
    let scaled = t * segment_count as f64;
    let seg = (scaled.floor() as usize).min(segment_count - 1);
    let local_t = scaled - seg as f64;

    let idx = |i: i64| -> Position {
        if p.closed {
            p.points[i.rem_euclid(n as i64) as usize]
        } else {
            p.points[i.clamp(0, n as i64 - 1) as usize]
        }
    };
    let p0 = idx(seg as i64 - 1);
    let p1 = idx(seg as i64);
    let p2 = idx(seg as i64 + 1);
    let p3 = idx(seg as i64 + 2);

    catmull_rom_segment(p0, p1, p2, p3, local_t, p.tension)
}

fn catmull_rom_segment(p0: Position, p1: Position, p2: Position, p3: Position, t: f64, tension: f64) -> Position {
    let s = (1.0 - tension.clamp(0.0, 1.0)) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;

    let component = |c0: f64, c1: f64, c2: f64, c3: f64| -> f64 {
        let m1 = s * (c2 - c0);
        let m2 = s * (c3 - c1);
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        h00 * c1 + h10 * m1 + h01 * c2 + h11 * m2
    };

    Position::new(
        component(p0.x, p1.x, p2.x, p3.x),
        component(p0.y, p1.y, p2.y, p3.y),
        component(p0.z, p1.z, p2.z, p3.z),
    )
}

pub fn default_catmull_rom(track_position: Position) -> CatmullRomParams {
    CatmullRomParams {
        points: vec![
            track_position,
            track_position.add(&Position::new(1.0, 1.5, 0.0)),
            track_position.add(&Position::new(2.5, 0.5, 0.0)),
            track_position.add(&Position::new(3.5, 2.0, 0.0)),
        ],
        closed: false,
        tension: 0.5,
    }
}

pub fn control_points_catmull_rom(p: &CatmullRomParams) -> Vec<(&'static str, Position)> {
    p.points.iter().map(|pos| ("point", *pos)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_matches_declared_endpoints() {
        let p = default_bezier(Position::ORIGIN);
        assert_eq!(evaluate_bezier(&p, 0.0), p.p0);
        assert_eq!(evaluate_bezier(&p, 1.0), p.p3);
    }

    #[test]
    fn catmull_rom_passes_through_first_and_last_point() {
        let p = default_catmull_rom(Position::ORIGIN);
        let first = evaluate_catmull_rom(&p, 0.0);
        let last = evaluate_catmull_rom(&p, 1.0);
        assert!(first.sub(&p.points[0]).magnitude() < 1e-6);
        assert!(last.sub(p.points.last().unwrap()).magnitude() < 1e-6);
    }

    #[test]
    fn catmull_rom_empty_points_is_origin() {
        let p = CatmullRomParams { points: vec![], closed: false, tension: 0.5 };
        assert_eq!(evaluate_catmull_rom(&p, 0.3), Position::ORIGIN);
    }
}
