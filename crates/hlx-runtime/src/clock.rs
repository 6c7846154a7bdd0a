//! Local clock and cycle-time mapping.
//!
//! `L = (now - startedAtMono - pausedAccum) * speed`, then mapped to a
//! normalized `t ∈ [0, 1]` according to loop/ping-pong.

use std::time::{Duration, Instant};

/// Elapsed local time in seconds, honoring pauses and speed.
pub fn local_time_s(started_at: Instant, paused_accum: Duration, speed: f64, now: Instant) -> f64 {
    let elapsed = now.saturating_duration_since(started_at).saturating_sub(paused_accum);
    elapsed.as_secs_f64() * speed
}

/// A track's own local time, delayed by `index * phase_offset_s`. Holds at
/// the origin (returns 0, not negative) until its turn arrives.
pub fn track_local_time_s(global_local_time_s: f64, index: usize, phase_offset_s: f64) -> f64 {
    (global_local_time_s - index as f64 * phase_offset_s).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleResult {
    pub t: f64,
    /// Set only for non-looping animations once `local_time >= duration`.
    pub completed: bool,
}

/// Maps a track's local time to normalized `t` per the loop/ping-pong rules.
pub fn cycle_t(local_time_s: f64, duration_s: f64, loop_enabled: bool, ping_pong: bool) -> CycleResult {
    let d = duration_s.max(1e-9);
    if !loop_enabled {
        let t = (local_time_s / d).clamp(0.0, 1.0);
        CycleResult { t, completed: local_time_s >= d }
    } else if !ping_pong {
        CycleResult { t: fract(local_time_s / d), completed: false }
    } else {
        let u = fract(local_time_s / (2.0 * d));
        let t = if u < 0.5 { 2.0 * u } else { 2.0 * (1.0 - u) };
        CycleResult { t, completed: false }
    }
}

fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Rebase `started_at` so that, evaluated at `now`, local time equals
/// `target_local_time_s` under the given `speed`/`paused_accum`.
pub fn rebase_for_local_time(now: Instant, paused_accum: Duration, speed: f64, target_local_time_s: f64) -> Instant {
    let unscaled = target_local_time_s / speed.max(1e-9);
    now.checked_sub(paused_accum)
        .and_then(|t| t.checked_sub(Duration::from_secs_f64(unscaled.max(0.0))))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_loop_clamps_and_completes() {
        let r = cycle_t(5.0, 2.0, false, false);
        assert_eq!(r.t, 1.0);
        assert!(r.completed);
    }

    #[test]
    fn loop_wraps_via_fract() {
        let r = cycle_t(2.5, 2.0, true, false);
        assert!((r.t - 0.25).abs() < 1e-9);
        assert!(!r.completed);
    }

    #[test]
    fn ping_pong_reverses_past_halfway() {
        let forward = cycle_t(0.5, 2.0, true, true);
        let reverse = cycle_t(2.5, 2.0, true, true);
        assert!((forward.t - 0.25).abs() < 1e-9);
        assert!((reverse.t - 0.25).abs() < 1e-9, "reverse t = {}", reverse.t);
    }

    #[test]
    fn ping_pong_is_continuous_at_the_turn() {
        let just_before = cycle_t(1.999, 2.0, true, true);
        let just_after = cycle_t(2.001, 2.0, true, true);
        assert!((just_before.t - just_after.t).abs() < 0.01);
    }

    #[test]
    fn track_local_time_holds_at_zero_before_its_turn() {
        assert_eq!(track_local_time_s(1.0, 3, 1.0), 0.0);
        assert_eq!(track_local_time_s(5.0, 3, 1.0), 2.0);
    }

    #[test]
    fn rebase_preserves_local_time() {
        let now = Instant::now();
        let rebased = rebase_for_local_time(now, Duration::ZERO, 2.0, 4.0);
        let l = local_time_s(rebased, Duration::ZERO, 2.0, now);
        assert!((l - 4.0).abs() < 1e-6);
    }
}
