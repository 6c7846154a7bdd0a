//! Shared vector/coordinate kernel, data model, config, and error types for
//! the Holophonix animation engine. No crate in the workspace should
//! reimplement anything defined here.

pub mod animation;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod track;
pub mod vector;

pub use animation::{
    generate_playback_id, generate_schedule_id, Animation, ConflictStrategy, Easing, FadeCfg,
    MultiTrackMode, PlaybackId, PlaybackRequest, Priority, RequestSource, ScheduleId,
};
pub use config::EngineConfig;
pub use error::{HlxResult, RequestError};
pub use event::Event;
pub use model::{CoordinateSystem, ModelKind, Parameters, Plane};
pub use track::{Color, Track, TrackId};
pub use vector::{aed_to_xyz, lerp_aed, lerp_xyz, wrap_azimuth, xyz_to_aed, Aed, Position};
