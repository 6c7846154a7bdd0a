use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("transport setup failed: {0}")]
    Transport(#[from] hlx_transport::TransportError),

    #[error("failed to bind inbound socket: {0}")]
    InboundBind(#[source] std::io::Error),
}
