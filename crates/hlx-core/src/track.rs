//! Track entities: the engine's view of a sound source.

use serde::{Deserialize, Serialize};

use crate::vector::Position;

/// Opaque local track identifier, stable across a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

/// RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }
}

/// A sound source tracked by the engine.
///
/// `holophonix_index` is the 1-based, device-contiguous index used on the
/// wire; `id` is this process's opaque handle. `initial_position` is only
/// mutated while no playback owns the track (see `OrchestratorState`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub holophonix_index: u32,
    pub name: String,
    pub color: Color,
    pub position: Position,
    pub initial_position: Position,
}

impl Track {
    pub fn new(id: TrackId, holophonix_index: u32, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            holophonix_index,
            name: name.into(),
            color: Color::default(),
            position,
            initial_position: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_initial_position_matches_position() {
        let t = Track::new(TrackId(1), 1, "Vox", Position::new(1.0, 2.0, 3.0));
        assert_eq!(t.position, t.initial_position);
    }
}
