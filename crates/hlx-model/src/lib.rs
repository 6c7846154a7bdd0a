//! The closed set of motion models.
//!
//! Each model is a pure, total function `(parameters, t) -> Position`, plus
//! `default_parameters` and `control_points` for the editor. Dispatch is a
//! match over `ModelKind`/`Parameters`, not a table of trait objects — the
//! set is closed and small enough that a match reads better than the
//! indirection of a callback registry.

mod curves;
mod linear_family;
mod multi;
mod oscillatory;
mod radial;
mod stochastic;

pub use hlx_core::{CoordinateSystem, ModelKind, Parameters, Plane};
use hlx_core::Position;

/// Evaluate a model at normalized time `t ∈ [0, 1]`. Total: `t` is clamped,
/// and any non-finite parameter is replaced by a safe default before use.
pub fn evaluate(parameters: &Parameters, t: f64) -> Position {
    let t = t.clamp(0.0, 1.0);
    match parameters {
        Parameters::Linear(p) => linear_family::evaluate_linear(p, t),
        Parameters::Zigzag(p) => linear_family::evaluate_zigzag(p, t),
        Parameters::Circular(p) => radial::evaluate_circular(p, t),
        Parameters::CircularScan(p) => radial::evaluate_circular_scan(p, t),
        Parameters::Orbit(p) => radial::evaluate_orbit(p, t),
        Parameters::Zoom(p) => radial::evaluate_zoom(p, t),
        Parameters::Elliptical(p) => radial::evaluate_elliptical(p, t),
        Parameters::Spiral(p) => radial::evaluate_spiral(p, t),
        Parameters::RoseCurve(p) => radial::evaluate_rose_curve(p, t),
        Parameters::Epicycloid(p) => radial::evaluate_epicycloid(p, t),
        Parameters::Pendulum(p) => oscillatory::evaluate_pendulum(p, t),
        Parameters::Bounce(p) => oscillatory::evaluate_bounce(p, t),
        Parameters::Spring(p) => oscillatory::evaluate_spring(p, t),
        Parameters::Wave(p) => oscillatory::evaluate_wave(p, t),
        Parameters::Lissajous(p) => oscillatory::evaluate_lissajous(p, t),
        Parameters::Helix(p) => oscillatory::evaluate_helix(p, t),
        Parameters::Bezier(p) => curves::evaluate_bezier(p, t),
        Parameters::CatmullRom(p) => curves::evaluate_catmull_rom(p, t),
        Parameters::Random(p) => stochastic::evaluate_random(p, t),
        Parameters::PerlinNoise(p) => stochastic::evaluate_perlin_noise(p, t),
        Parameters::Formation(p) => multi::evaluate_formation(p, t),
        Parameters::AttractRepel(p) => multi::evaluate_attract_repel(p, t),
        Parameters::Doppler(p) => multi::evaluate_doppler(p, t),
        Parameters::Custom(p) => multi::evaluate_custom(p, t),
    }
}

/// Default parameters for a freshly-assigned model, seeded from the track's
/// current position so the animation starts where the track already is.
pub fn default_parameters(kind: ModelKind, track_position: Position) -> Parameters {
    match kind {
        ModelKind::Linear => Parameters::Linear(linear_family::default_linear(track_position)),
        ModelKind::Zigzag => Parameters::Zigzag(linear_family::default_zigzag(track_position)),
        ModelKind::Circular => Parameters::Circular(radial::default_circular(track_position)),
        ModelKind::CircularScan => Parameters::CircularScan(radial::default_circular_scan(track_position)),
        ModelKind::Orbit => Parameters::Orbit(radial::default_orbit(track_position)),
        ModelKind::Zoom => Parameters::Zoom(radial::default_zoom(track_position)),
        ModelKind::Elliptical => Parameters::Elliptical(radial::default_elliptical(track_position)),
        ModelKind::Spiral => Parameters::Spiral(radial::default_spiral(track_position)),
        ModelKind::RoseCurve => Parameters::RoseCurve(radial::default_rose_curve(track_position)),
        ModelKind::Epicycloid => Parameters::Epicycloid(radial::default_epicycloid(track_position)),
        ModelKind::Pendulum => Parameters::Pendulum(oscillatory::default_pendulum(track_position)),
        ModelKind::Bounce => Parameters::Bounce(oscillatory::default_bounce(track_position)),
        ModelKind::Spring => Parameters::Spring(oscillatory::default_spring(track_position)),
        ModelKind::Wave => Parameters::Wave(oscillatory::default_wave(track_position)),
        ModelKind::Lissajous => Parameters::Lissajous(oscillatory::default_lissajous(track_position)),
        ModelKind::Helix => Parameters::Helix(oscillatory::default_helix(track_position)),
        ModelKind::Bezier => Parameters::Bezier(curves::default_bezier(track_position)),
        ModelKind::CatmullRom => Parameters::CatmullRom(curves::default_catmull_rom(track_position)),
        ModelKind::Random => Parameters::Random(stochastic::default_random(track_position)),
        ModelKind::PerlinNoise => Parameters::PerlinNoise(stochastic::default_perlin_noise(track_position)),
        ModelKind::Formation => Parameters::Formation(multi::default_formation(track_position)),
        ModelKind::AttractRepel => Parameters::AttractRepel(multi::default_attract_repel(track_position)),
        ModelKind::Doppler => Parameters::Doppler(multi::default_doppler(track_position)),
        ModelKind::Custom => Parameters::Custom(multi::default_custom(track_position)),
    }
}

/// Named control points for the editor (start/end handles, centers, etc).
pub fn control_points(parameters: &Parameters) -> Vec<(&'static str, Position)> {
    match parameters {
        Parameters::Linear(p) => linear_family::control_points_linear(p),
        Parameters::Zigzag(p) => linear_family::control_points_zigzag(p),
        Parameters::Circular(p) => radial::control_points_circular(p),
        Parameters::CircularScan(p) => radial::control_points_circular_scan(p),
        Parameters::Orbit(p) => radial::control_points_orbit(p),
        Parameters::Zoom(_) => vec![],
        Parameters::Elliptical(p) => radial::control_points_elliptical(p),
        Parameters::Spiral(p) => radial::control_points_spiral(p),
        Parameters::RoseCurve(p) => radial::control_points_rose_curve(p),
        Parameters::Epicycloid(p) => radial::control_points_epicycloid(p),
        Parameters::Pendulum(p) => oscillatory::control_points_pendulum(p),
        Parameters::Bounce(p) => oscillatory::control_points_bounce(p),
        Parameters::Spring(p) => oscillatory::control_points_spring(p),
        Parameters::Wave(p) => oscillatory::control_points_wave(p),
        Parameters::Lissajous(p) => oscillatory::control_points_lissajous(p),
        Parameters::Helix(p) => oscillatory::control_points_helix(p),
        Parameters::Bezier(p) => curves::control_points_bezier(p),
        Parameters::CatmullRom(p) => curves::control_points_catmull_rom(p),
        Parameters::Random(_) | Parameters::PerlinNoise(_) => vec![],
        Parameters::Formation(p) => multi::control_points_formation(p),
        Parameters::AttractRepel(p) => multi::control_points_attract_repel(p),
        Parameters::Doppler(p) => multi::control_points_doppler(p),
        Parameters::Custom(_) => vec![],
    }
}

/// Project a planar offset `(u, v)` around `center` into the named plane.
pub(crate) fn project_plane(center: Position, u: f64, v: f64, plane: Plane) -> Position {
    match plane {
        Plane::Xy => Position::new(center.x + u, center.y + v, center.z),
        Plane::Xz => Position::new(center.x + u, center.y, center.z + v),
        Plane::Yz => Position::new(center.x, center.y + u, center.z + v),
    }
}

/// Displace `pos` along the axis orthogonal to `plane` — used by models that
/// ride a line/curve in-plane and bump perpendicular to it.
pub(crate) fn bump_orthogonal(pos: Position, plane: Plane, amount: f64) -> Position {
    match plane {
        Plane::Xy => Position::new(pos.x, pos.y, pos.z + amount),
        Plane::Xz => Position::new(pos.x, pos.y + amount, pos.z),
        Plane::Yz => Position::new(pos.x + amount, pos.y, pos.z),
    }
}

/// The position a model starts at — used by the runtime to re-anchor a
/// parameter record at a different origin (see `translate`).
pub fn nominal_anchor(parameters: &Parameters) -> Position {
    evaluate(parameters, 0.0)
}

/// Rigidly translate every position-valued field in a parameter record by
/// `delta`. This is how the runtime re-centres an authored curve onto a
/// different track's frozen initial position, or onto a barycentre, without
/// needing per-model re-centring logic: every model's parameters are built
/// entirely from `Position` anchors and scalar shape parameters, so
/// translating the anchors is sufficient to rigidly move the whole curve.
pub fn translate(parameters: &Parameters, delta: Position) -> Parameters {
    let t = |p: Position| p.add(&delta);
    match parameters.clone() {
        Parameters::Linear(mut p) => {
            p.start = t(p.start);
            p.end = t(p.end);
            Parameters::Linear(p)
        }
        Parameters::Zigzag(mut p) => {
            p.start = t(p.start);
            p.end = t(p.end);
            Parameters::Zigzag(p)
        }
        Parameters::Circular(mut p) => {
            p.center = t(p.center);
            Parameters::Circular(p)
        }
        Parameters::Elliptical(mut p) => {
            p.center = t(p.center);
            Parameters::Elliptical(p)
        }
        Parameters::Spiral(mut p) => {
            p.center = t(p.center);
            Parameters::Spiral(p)
        }
        Parameters::Random(mut p) => {
            p.center = t(p.center);
            Parameters::Random(p)
        }
        Parameters::Pendulum(mut p) => {
            p.pivot = t(p.pivot);
            Parameters::Pendulum(p)
        }
        Parameters::Bounce(mut p) => {
            p.start = t(p.start);
            p.end = t(p.end);
            Parameters::Bounce(p)
        }
        Parameters::Spring(mut p) => {
            p.anchor = t(p.anchor);
            p.rest = t(p.rest);
            Parameters::Spring(p)
        }
        Parameters::Wave(mut p) => {
            p.start = t(p.start);
            p.end = t(p.end);
            Parameters::Wave(p)
        }
        Parameters::Lissajous(mut p) => {
            p.center = t(p.center);
            Parameters::Lissajous(p)
        }
        Parameters::Helix(mut p) => {
            p.center = t(p.center);
            Parameters::Helix(p)
        }
        Parameters::Bezier(mut p) => {
            p.p0 = t(p.p0);
            p.p1 = t(p.p1);
            p.p2 = t(p.p2);
            p.p3 = t(p.p3);
            Parameters::Bezier(p)
        }
        Parameters::CatmullRom(mut p) => {
            for pt in p.points.iter_mut() {
                *pt = t(*pt);
            }
            Parameters::CatmullRom(p)
        }
        Parameters::PerlinNoise(mut p) => {
            p.center = t(p.center);
            Parameters::PerlinNoise(p)
        }
        Parameters::RoseCurve(mut p) => {
            p.center = t(p.center);
            Parameters::RoseCurve(p)
        }
        Parameters::Epicycloid(mut p) => {
            p.center = t(p.center);
            Parameters::Epicycloid(p)
        }
        Parameters::Orbit(mut p) => {
            p.center = t(p.center);
            Parameters::Orbit(p)
        }
        Parameters::Formation(mut p) => {
            p.center = t(p.center);
            Parameters::Formation(p)
        }
        Parameters::AttractRepel(mut p) => {
            p.start = t(p.start);
            p.target = t(p.target);
            Parameters::AttractRepel(p)
        }
        Parameters::Doppler(mut p) => {
            p.start = t(p.start);
            p.end = t(p.end);
            Parameters::Doppler(p)
        }
        Parameters::CircularScan(mut p) => {
            p.center = t(p.center);
            Parameters::CircularScan(p)
        }
        Parameters::Zoom(mut p) => {
            p.anchor = t(p.anchor);
            Parameters::Zoom(p)
        }
        Parameters::Custom(mut p) => {
            for (_, pt) in p.keyframes.iter_mut() {
                *pt = t(*pt);
            }
            Parameters::Custom(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_starts_at_its_declared_start_point() {
        for kind in ModelKind::ALL {
            let params = default_parameters(kind, Position::new(1.0, 2.0, 3.0));
            let start = evaluate(&params, 0.0);
            let cps = control_points(&params);
            if let Some((_, expected)) = cps.first() {
                let d = start.sub(expected).magnitude();
                assert!(d < 1e-6, "{:?} start {:?} != control point {:?}", kind, start, expected);
            }
            assert!(start.is_finite());
        }
    }

    #[test]
    fn translate_shifts_the_whole_curve() {
        let delta = Position::new(10.0, 0.0, 0.0);
        for kind in ModelKind::ALL {
            let params = default_parameters(kind, Position::ORIGIN);
            let moved = translate(&params, delta);
            let before = evaluate(&params, 0.3);
            let after = evaluate(&moved, 0.3);
            assert!((after.sub(&before).sub(&delta).magnitude()) < 1e-6, "{:?}", kind);
        }
    }

    #[test]
    fn evaluate_clamps_out_of_range_t() {
        let params = default_parameters(ModelKind::Linear, Position::ORIGIN);
        let a = evaluate(&params, -5.0);
        let b = evaluate(&params, 0.0);
        assert_eq!(a, b);
        let c = evaluate(&params, 5.0);
        let d = evaluate(&params, 1.0);
        assert_eq!(c, d);
    }
}
