//! Playback Orchestrator: admission/conflict policy, the 60 Hz tick loop,
//! and the public surface the engine facade and transport sit on top of.

pub mod admission;
pub mod events;
pub mod orchestrator;
pub mod state;

pub use admission::AdmissionDecision;
pub use events::EventBus;
pub use orchestrator::{Orchestrator, PlaybackTick};
pub use state::OrchestratorState;
