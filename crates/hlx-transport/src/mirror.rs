//! Device Mirror: the engine's cache of what the device last reported for
//! each track, populated exclusively by the recv loop.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use hlx_core::{Color, Position};

#[derive(Debug, Clone)]
pub struct MirroredTrack {
    pub name: Option<String>,
    pub last_known_position: Option<Position>,
    pub color: Option<Color>,
    pub last_seen_mono: Instant,
}

impl MirroredTrack {
    fn touched(now: Instant) -> Self {
        Self { name: None, last_known_position: None, color: None, last_seen_mono: now }
    }
}

#[derive(Default)]
pub struct DeviceMirror {
    by_index: HashMap<u32, MirroredTrack>,
    failed_indices: HashSet<u32>,
    max_valid_index: u32,
}

impl DeviceMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, index: u32, name: String, now: Instant) {
        let entry = self.by_index.entry(index).or_insert_with(|| MirroredTrack::touched(now));
        entry.name = Some(name);
        entry.last_seen_mono = now;
    }

    pub fn set_position(&mut self, index: u32, position: Position, now: Instant) {
        let entry = self.by_index.entry(index).or_insert_with(|| MirroredTrack::touched(now));
        entry.last_known_position = Some(position);
        entry.last_seen_mono = now;
    }

    pub fn set_color(&mut self, index: u32, color: Color, now: Instant) {
        let entry = self.by_index.entry(index).or_insert_with(|| MirroredTrack::touched(now));
        entry.color = Some(color);
        entry.last_seen_mono = now;
    }

    /// Record `/error "from Core: Cannot get track,N,..."` for index `N`.
    pub fn mark_failed(&mut self, index: u32) {
        self.failed_indices.insert(index);
        if index > 0 {
            self.max_valid_index = self.max_valid_index.max(index - 1);
        }
    }

    pub fn is_failed(&self, index: u32) -> bool {
        self.failed_indices.contains(&index)
    }

    pub fn max_valid_index(&self) -> u32 {
        self.max_valid_index
    }

    pub fn get(&self, index: u32) -> Option<&MirroredTrack> {
        self.by_index.get(&index)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_failed_caps_max_valid_index() {
        let mut m = DeviceMirror::new();
        m.mark_failed(5);
        assert_eq!(m.max_valid_index(), 4);
        assert!(m.is_failed(5));
    }

    #[test]
    fn set_position_creates_entry_on_first_touch() {
        let mut m = DeviceMirror::new();
        m.set_position(1, Position::new(1.0, 0.0, 0.0), Instant::now());
        assert_eq!(m.get(1).unwrap().last_known_position, Some(Position::new(1.0, 0.0, 0.0)));
    }
}
