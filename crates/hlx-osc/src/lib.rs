//! OSC Message Optimiser: turns a tick's position updates into the minimum
//! OSC traffic using pattern addressing, incremental deltas, and
//! coordinate-system selection (§4.5).

pub mod message;
pub mod optimiser;

pub use message::{address_pattern, track_address, OscMsg};
pub use optimiser::{coordinate_system_for, grouping_for, optimise, Grouping, OptimiserConfig, TickTelemetry};
