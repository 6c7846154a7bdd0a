//! OSC transport: outbound queue + send loop, inbound recv loop, the
//! Device Mirror, and discovery/liveness probing.

pub mod discovery;
pub mod error;
pub mod inbound;
pub mod mirror;
pub mod outbound;
pub mod sender;

pub use discovery::{run_discovery, run_liveness_loop, probe_liveness, Availability, DiscoveryConfig};
pub use error::TransportError;
pub use inbound::{handle_message, run_recv_loop, InboundEvent};
pub use mirror::{DeviceMirror, MirroredTrack};
pub use outbound::OutboundQueue;
pub use sender::{bind_outbound_socket, run_send_loop, OutboundSocket, SendStats, Throttle};
