//! Compresses a tick's `TrackPositionUpdate`s into the minimum OSC traffic:
//! coordinate selection, pattern addressing, incremental deltas, and
//! single-axis dominance.

use std::collections::HashMap;

use hlx_core::{wrap_azimuth, xyz_to_aed, CoordinateSystem, ModelKind, MultiTrackMode, Position, TrackId};
use hlx_runtime::TrackPositionUpdate;

use crate::message::{track_address, OscMsg};

/// The optimiser-relevant subset of `EngineConfig`.
#[derive(Debug, Clone, Copy)]
pub struct OptimiserConfig {
    pub incremental_threshold_xyz: f64,
    pub incremental_threshold_aed: f64,
    pub single_axis_threshold: f64,
    pub enable_incremental_updates: bool,
    pub enable_pattern_matching: bool,
    pub auto_select_coordinate_system: bool,
    pub force_coordinate_system: Option<CoordinateSystem>,
}

impl From<&hlx_core::EngineConfig> for OptimiserConfig {
    fn from(c: &hlx_core::EngineConfig) -> Self {
        Self {
            incremental_threshold_xyz: c.incremental_threshold_xyz,
            incremental_threshold_aed: c.incremental_threshold_aed,
            single_axis_threshold: c.single_axis_threshold,
            enable_incremental_updates: c.enable_incremental_updates,
            enable_pattern_matching: c.enable_pattern_matching,
            auto_select_coordinate_system: c.auto_select_coordinate_system,
            force_coordinate_system: c.force_coordinate_system,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTelemetry {
    pub original_count: usize,
    pub optimised_count: usize,
    pub reduction_pct: f64,
}

/// Whether every track in this tick's output shares one compressed
/// representation, or each needs its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Uniform,
    PerTrack,
}

/// Derived directly from §4.5's per-mode compression rules.
pub fn grouping_for(mode: &MultiTrackMode, model: ModelKind) -> Grouping {
    match mode {
        MultiTrackMode::Relative => Grouping::PerTrack,
        MultiTrackMode::BarycentricShared => Grouping::Uniform,
        MultiTrackMode::BarycentricIso | MultiTrackMode::BarycentricCentered { .. } => {
            if model.is_rotational() {
                Grouping::PerTrack
            } else {
                Grouping::Uniform
            }
        }
        MultiTrackMode::BarycentricCustom { .. } => Grouping::PerTrack,
    }
}

pub fn coordinate_system_for(model: ModelKind, cfg: &OptimiserConfig) -> CoordinateSystem {
    if let Some(forced) = cfg.force_coordinate_system {
        return forced;
    }
    if cfg.auto_select_coordinate_system {
        model.preferred_coordinate_system()
    } else {
        CoordinateSystem::Xyz
    }
}

/// Compress one tick of position updates into OSC messages plus telemetry.
pub fn optimise(
    updates: &[TrackPositionUpdate],
    holophonix_index: &HashMap<TrackId, u32>,
    model: ModelKind,
    mode: &MultiTrackMode,
    cfg: &OptimiserConfig,
    first_tick: bool,
) -> (Vec<OscMsg>, TickTelemetry) {
    let original_count = updates.len();
    if updates.is_empty() {
        return (vec![], TickTelemetry { original_count: 0, optimised_count: 0, reduction_pct: 0.0 });
    }

    let cs = coordinate_system_for(model, cfg);
    let grouping = if cfg.enable_pattern_matching { grouping_for(mode, model) } else { Grouping::PerTrack };

    let msgs = match grouping {
        Grouping::Uniform => {
            let mut indices: Vec<u32> =
                updates.iter().map(|u| holophonix_index.get(&u.track_id).copied().unwrap_or(0)).collect();
            indices.sort_unstable();
            let rep = &updates[0];
            compress_group(rep.position, rep.previous_position, &indices, cs, cfg, first_tick, cfg.enable_pattern_matching)
        }
        Grouping::PerTrack => updates
            .iter()
            .flat_map(|u| {
                let idx = holophonix_index.get(&u.track_id).copied().unwrap_or(0);
                compress_group(u.position, u.previous_position, &[idx], cs, cfg, first_tick, cfg.enable_pattern_matching)
            })
            .collect(),
    };

    let optimised_count = msgs.len();
    let reduction_pct = 100.0 * (original_count as f64 - optimised_count as f64) / original_count as f64;
    (msgs, TickTelemetry { original_count, optimised_count, reduction_pct })
}

/// Three wire-space values plus their axis names, in wire units (degrees for
/// azimuth/elevation, meters for the rest).
fn to_wire_space(pos: Position, cs: CoordinateSystem) -> ([f64; 3], [&'static str; 3]) {
    match cs {
        CoordinateSystem::Xyz => ([pos.x, pos.y, pos.z], ["x", "y", "z"]),
        CoordinateSystem::Aed => {
            let aed = xyz_to_aed(pos);
            let wire_azimuth = if aed.azimuth < 0.0 { aed.azimuth + 360.0 } else { aed.azimuth };
            ([wire_azimuth, aed.elevation, aed.distance], ["azim", "elev", "dist"])
        }
    }
}

/// Azimuth/elevation use the configured AED threshold directly (degrees);
/// distance reuses the same numeric constant as a fraction of the
/// device-native distance unit (`distance_scale = 1.0` by default).
fn axis_thresholds(cs: CoordinateSystem, cfg: &OptimiserConfig) -> [f64; 3] {
    match cs {
        CoordinateSystem::Xyz => [cfg.incremental_threshold_xyz; 3],
        CoordinateSystem::Aed => {
            [cfg.incremental_threshold_aed, cfg.incremental_threshold_aed, cfg.incremental_threshold_aed]
        }
    }
}

fn axis_delta(cs: CoordinateSystem, axis: usize, current: f64, previous: f64) -> f64 {
    if cs == CoordinateSystem::Aed && axis == 0 {
        wrap_azimuth(current - previous)
    } else {
        current - previous
    }
}

fn compress_group(
    position: Position,
    previous_position: Position,
    indices: &[u32],
    cs: CoordinateSystem,
    cfg: &OptimiserConfig,
    first_tick: bool,
    pattern_matching: bool,
) -> Vec<OscMsg> {
    let (values, axis_names) = to_wire_space(position, cs);
    let absolute_suffix = match cs {
        CoordinateSystem::Xyz => "xyz",
        CoordinateSystem::Aed => "aed",
    };

    let emit_absolute = |indices: &[u32]| -> OscMsg {
        OscMsg {
            address: track_address(indices, absolute_suffix),
            args: values.iter().map(|&v| v as f32).collect(),
            affected_track_indices: indices.to_vec(),
        }
    };

    if first_tick || !cfg.enable_incremental_updates {
        return emit_group(indices, pattern_matching, emit_absolute);
    }

    let (prev_values, _) = to_wire_space(previous_position, cs);
    let thresholds = axis_thresholds(cs, cfg);
    let deltas: [f64; 3] =
        std::array::from_fn(|i| axis_delta(cs, i, values[i], prev_values[i]));
    let exceeds = (0..3).any(|i| deltas[i].abs() > thresholds[i]);

    if exceeds {
        return emit_group(indices, pattern_matching, emit_absolute);
    }

    let total: f64 = deltas.iter().map(|d| d.abs()).sum();
    let dominant = (0..3).max_by(|&a, &b| deltas[a].abs().partial_cmp(&deltas[b].abs()).unwrap());
    let single_axis = match dominant {
        Some(i) if total > 1e-12 && deltas[i].abs() >= cfg.single_axis_threshold * total => Some(i),
        _ => None,
    };

    let emit_incremental = |indices: &[u32], axis: usize| -> Option<OscMsg> {
        if deltas[axis].abs() < 1e-9 {
            return None;
        }
        Some(OscMsg {
            address: track_address(indices, &format!("{}++", axis_names[axis])),
            args: vec![deltas[axis] as f32],
            affected_track_indices: indices.to_vec(),
        })
    };

    if pattern_matching {
        match single_axis {
            Some(axis) => emit_incremental(indices, axis).into_iter().collect(),
            None => (0..3).filter_map(|axis| emit_incremental(indices, axis)).collect(),
        }
    } else {
        indices
            .iter()
            .flat_map(|&i| match single_axis {
                Some(axis) => emit_incremental(&[i], axis).into_iter().collect::<Vec<_>>(),
                None => (0..3).filter_map(|axis| emit_incremental(&[i], axis)).collect(),
            })
            .collect()
    }
}

fn emit_group(indices: &[u32], pattern_matching: bool, emit_absolute: impl Fn(&[u32]) -> OscMsg) -> Vec<OscMsg> {
    if pattern_matching {
        vec![emit_absolute(indices)]
    } else {
        indices.iter().map(|&i| emit_absolute(&[i])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> OptimiserConfig {
        OptimiserConfig {
            incremental_threshold_xyz: 0.5,
            incremental_threshold_aed: 5.0,
            single_axis_threshold: 0.9,
            enable_incremental_updates: true,
            enable_pattern_matching: true,
            auto_select_coordinate_system: true,
            force_coordinate_system: None,
        }
    }

    fn update(track_id: TrackId, position: Position, previous: Position) -> TrackPositionUpdate {
        TrackPositionUpdate { track_id, position, previous_position: previous }
    }

    #[test]
    fn first_tick_is_always_absolute() {
        let idx = HashMap::from([(TrackId(1), 1)]);
        let updates = vec![update(TrackId(1), Position::new(1.0, 2.0, 3.0), Position::ORIGIN)];
        let (msgs, tel) =
            optimise(&updates, &idx, ModelKind::Linear, &MultiTrackMode::Relative, &cfg(), true);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].address.ends_with("/xyz"));
        assert_eq!(tel.optimised_count, 1);
    }

    #[test]
    fn small_move_emits_incremental() {
        let idx = HashMap::from([(TrackId(1), 1)]);
        let updates = vec![update(TrackId(1), Position::new(0.1, 0.0, 0.0), Position::ORIGIN)];
        let (msgs, _) =
            optimise(&updates, &idx, ModelKind::Linear, &MultiTrackMode::Relative, &cfg(), false);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].address.ends_with("x++"), "{}", msgs[0].address);
    }

    #[test]
    fn large_move_emits_absolute() {
        let idx = HashMap::from([(TrackId(1), 1)]);
        let updates = vec![update(TrackId(1), Position::new(5.0, 0.0, 0.0), Position::ORIGIN)];
        let (msgs, _) =
            optimise(&updates, &idx, ModelKind::Linear, &MultiTrackMode::Relative, &cfg(), false);
        assert!(msgs[0].address.ends_with("/xyz"));
    }

    #[test]
    fn shared_mode_patterns_into_one_message() {
        let idx = HashMap::from([(TrackId(1), 1), (TrackId(2), 2), (TrackId(3), 3)]);
        let p = Position::new(0.2, 0.0, 0.0);
        let updates = vec![
            update(TrackId(1), p, Position::ORIGIN),
            update(TrackId(2), p, Position::ORIGIN),
            update(TrackId(3), p, Position::ORIGIN),
        ];
        let (msgs, tel) = optimise(
            &updates,
            &idx,
            ModelKind::Linear,
            &MultiTrackMode::BarycentricShared,
            &cfg(),
            false,
        );
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].address.contains("[1-3]"));
        assert_eq!(tel.original_count, 3);
    }

    #[test]
    fn disabling_pattern_matching_forces_per_track_single_indices() {
        let idx = HashMap::from([(TrackId(1), 1), (TrackId(2), 2)]);
        let p = Position::new(5.0, 0.0, 0.0);
        let updates = vec![update(TrackId(1), p, Position::ORIGIN), update(TrackId(2), p, Position::ORIGIN)];
        let mut c = cfg();
        c.enable_pattern_matching = false;
        let (msgs, _) =
            optimise(&updates, &idx, ModelKind::Linear, &MultiTrackMode::BarycentricShared, &c, false);
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().all(|m| !m.address.contains('[') && !m.address.contains('{')));
    }

    #[test]
    fn aed_preferred_model_emits_aed_address() {
        let idx = HashMap::from([(TrackId(1), 1)]);
        let updates = vec![update(TrackId(1), Position::new(1.0, 0.0, 1.0), Position::ORIGIN)];
        let (msgs, _) =
            optimise(&updates, &idx, ModelKind::Circular, &MultiTrackMode::Relative, &cfg(), true);
        assert!(msgs[0].address.ends_with("/aed"));
    }
}
