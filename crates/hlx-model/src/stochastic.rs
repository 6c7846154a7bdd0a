//! `random` and `perlinNoise`: deterministic per-seed noise walks. Both are
//! pure functions of `(parameters, t)` — the seed is part of the parameter
//! record so replaying the same animation reproduces the same path.

use hlx_core::{PerlinNoiseParams, Position, RandomParams};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Picks `steps` waypoints deterministically from `seed`, then interpolates
/// between them as `t` advances — a random walk with a reproducible path.
pub fn evaluate_random(p: &RandomParams, t: f64) -> Position {
    let steps = p.steps.max(1);
    let mut rng = StdRng::seed_from_u64(p.seed);
    let waypoints: Vec<Position> = (0..=steps)
        .map(|_| {
            Position::new(
                p.center.x + rng.random_range(-1.0..=1.0) * p.extent.x,
                p.center.y + rng.random_range(-1.0..=1.0) * p.extent.y,
                p.center.z + rng.random_range(-1.0..=1.0) * p.extent.z,
            )
        })
        .collect();
    if steps == 0 {
        return waypoints[0];
    }
    let scaled = t * steps as f64;
    let idx = (scaled.floor() as usize).min(steps as usize - 1);
    let local_t = scaled - idx as f64;
    waypoints[idx].lerp(&waypoints[idx + 1], local_t)
}

pub fn default_random(track_position: Position) -> RandomParams {
    RandomParams { center: track_position, extent: Position::new(2.0, 2.0, 0.5), seed: 0, steps: 8 }
}

/// A coarse value-noise approximation: a handful of fixed-frequency sine
/// harmonics seeded by `seed`, summed and scaled to `extent`. Deterministic
/// and total — no external noise-library dependency for a single pure
/// function.
pub fn evaluate_perlin_noise(p: &PerlinNoiseParams, t: f64) -> Position {
    let mut rng = StdRng::seed_from_u64(p.seed);
    let phases: [f64; 3] = std::array::from_fn(|_| rng.random_range(0.0..std::f64::consts::TAU));
    let f = p.frequency.max(0.01);
    let nx = ((t * f * std::f64::consts::TAU + phases[0]).sin() + (t * f * 2.0 * std::f64::consts::TAU).sin() * 0.5) / 1.5;
    let ny = ((t * f * std::f64::consts::TAU + phases[1]).sin() + (t * f * 2.3 * std::f64::consts::TAU).sin() * 0.5) / 1.5;
    let nz = ((t * f * std::f64::consts::TAU + phases[2]).sin() + (t * f * 1.7 * std::f64::consts::TAU).sin() * 0.5) / 1.5;
    p.center.add(&Position::new(nx * p.extent.x, ny * p.extent.y, nz * p.extent.z))
}

pub fn default_perlin_noise(track_position: Position) -> PerlinNoiseParams {
    PerlinNoiseParams { center: track_position, extent: Position::new(1.5, 1.5, 0.5), seed: 0, frequency: 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_is_deterministic_for_same_seed() {
        let p = default_random(Position::ORIGIN);
        let a = evaluate_random(&p, 0.37);
        let b = evaluate_random(&p, 0.37);
        assert_eq!(a, b);
    }

    #[test]
    fn random_differs_across_seeds() {
        let mut p = default_random(Position::ORIGIN);
        let a = evaluate_random(&p, 0.5);
        p.seed = 42;
        let b = evaluate_random(&p, 0.5);
        assert_ne!(a, b);
    }

    #[test]
    fn perlin_noise_stays_finite_and_bounded() {
        let p = default_perlin_noise(Position::ORIGIN);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let pos = evaluate_perlin_noise(&p, t);
            assert!(pos.is_finite());
        }
    }
}
