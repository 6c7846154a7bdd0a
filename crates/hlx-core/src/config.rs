//! Engine configuration: every tunable knob, with the defaults from the
//! design document, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::animation::ConflictStrategy;
use crate::model::CoordinateSystem;

/// All configuration knobs for the engine, deserializable from a TOML file.
/// Every field has a default matching the reference configuration, so a
/// partial (or absent) config file is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_rate_hz: u32,
    pub max_concurrent_playbacks: usize,
    pub default_conflict_strategy: ConflictStrategy,
    pub incremental_threshold_xyz: f64,
    pub incremental_threshold_aed: f64,
    pub single_axis_threshold: f64,
    pub enable_incremental_updates: bool,
    pub enable_pattern_matching: bool,
    pub auto_select_coordinate_system: bool,
    pub force_coordinate_system: Option<CoordinateSystem>,
    pub osc_send_buffer_bytes: usize,
    pub max_queue: usize,
    pub max_batch_size: usize,
    pub min_throttle_ms: u64,
    pub max_throttle_ms: u64,
    pub connection_timeout_ms: u64,
    pub availability_interval_ms: u64,
    pub probe_deadline_ms: u64,
    pub discovery_max_probe: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            max_concurrent_playbacks: 50,
            default_conflict_strategy: ConflictStrategy::PriorityBased,
            incremental_threshold_xyz: 0.5,
            incremental_threshold_aed: 5.0,
            single_axis_threshold: 0.9,
            enable_incremental_updates: true,
            enable_pattern_matching: true,
            auto_select_coordinate_system: true,
            force_coordinate_system: None,
            osc_send_buffer_bytes: 65536,
            max_queue: 20,
            max_batch_size: 10,
            min_throttle_ms: 50,
            max_throttle_ms: 100,
            connection_timeout_ms: 5000,
            availability_interval_ms: 5000,
            probe_deadline_ms: 900,
            discovery_max_probe: 128,
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML document, falling back to defaults for any field
    /// the document omits.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn tick_interval_s(&self) -> f64 {
        1.0 / self.frame_rate_hz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_values() {
        let c = EngineConfig::default();
        assert_eq!(c.frame_rate_hz, 60);
        assert_eq!(c.max_queue, 20);
        assert_eq!(c.discovery_max_probe, 128);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let c = EngineConfig::from_toml_str("frame_rate_hz = 30\n").unwrap();
        assert_eq!(c.frame_rate_hz, 30);
        assert_eq!(c.max_concurrent_playbacks, 50);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let c = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(c, EngineConfig::default());
    }
}
