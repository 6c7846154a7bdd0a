//! Animation runtime: local clock, multi-track evaluation, fades, and the
//! per-playback state machine. Stateless evaluation lives in `hlx-model`;
//! this crate is where time enters the picture.

pub mod clock;
pub mod evaluator;
pub mod playback;

pub use playback::{Playback, PlaybackState, TickOutput, TrackPositionUpdate};
