//! Transport-internal errors. `hlx_core::event::TransportError` is the
//! lightweight telemetry-facing counterpart surfaced through `onEvent`;
//! this is the richer error the transport actor handles internally.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to bind outbound socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to send datagram: {0}")]
    Send(#[source] std::io::Error),

    #[error("failed to receive datagram: {0}")]
    Recv(#[source] std::io::Error),

    #[error("malformed OSC packet: {0}")]
    Decode(String),

    #[error("outbound queue full, message dropped")]
    QueueOverflow,
}
