//! UDP send loop: the transport actor's outbound half. Wakes on an
//! adaptive throttle, drains a batch from the `OutboundQueue`, and writes
//! each message as an OSC 1.0 datagram.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rosc::{encoder, OscPacket};
use socket2::{Domain, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use crate::error::TransportError;
use crate::outbound::OutboundQueue;

/// Bind a UDP socket with the shallow `SO_SNDBUF` called for in §5, then
/// connect it to the device endpoint so later writes can use `send` instead
/// of `send_to`.
pub fn bind_outbound_socket(target: SocketAddr, send_buffer_bytes: usize) -> Result<UdpSocket, TransportError> {
    let domain = if target.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let sock = Socket::new(domain, Type::DGRAM, None).map_err(TransportError::Bind)?;
    sock.set_send_buffer_size(send_buffer_bytes).map_err(TransportError::Bind)?;
    sock.set_nonblocking(true).map_err(TransportError::Bind)?;
    let bind_addr: SocketAddr = if target.is_ipv6() { "[::]:0".parse().unwrap() } else { "0.0.0.0:0".parse().unwrap() };
    sock.bind(&bind_addr.into()).map_err(TransportError::Bind)?;
    sock.connect(&target.into()).map_err(TransportError::Bind)?;
    UdpSocket::from_std(sock.into()).map_err(TransportError::Bind)
}

/// The engine's outbound socket, behind a handle that can be swapped out
/// live. `recreate` rebinds a fresh socket to the same endpoint and
/// discards the old one, taking with it any datagram still sitting in the
/// OS-level send buffer — §4.6's "clear buffer" operation on playback stop.
pub struct OutboundSocket {
    target: SocketAddr,
    send_buffer_bytes: usize,
    current: Mutex<Arc<UdpSocket>>,
}

impl OutboundSocket {
    pub fn bind(target: SocketAddr, send_buffer_bytes: usize) -> Result<Self, TransportError> {
        let socket = bind_outbound_socket(target, send_buffer_bytes)?;
        Ok(Self { target, send_buffer_bytes, current: Mutex::new(Arc::new(socket)) })
    }

    /// A snapshot of the currently live socket; cheap `Arc` clone.
    pub fn current(&self) -> Arc<UdpSocket> {
        self.current.lock().clone()
    }

    /// Rebind a fresh socket to the same endpoint and swap it in. Any
    /// datagram still buffered by the kernel on the old socket is dropped
    /// with it rather than trickling out after the fact.
    pub fn recreate(&self) -> Result<(), TransportError> {
        let fresh = bind_outbound_socket(self.target, self.send_buffer_bytes)?;
        *self.current.lock() = Arc::new(fresh);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SendStats {
    pub sent: AtomicU64,
    pub errors: AtomicU64,
}

/// Adaptive throttle state: nudges the wake interval within
/// `[min_throttle_ms, max_throttle_ms]` based on queue backlog.
pub struct Throttle {
    min_ms: u64,
    max_ms: u64,
    current_ms: u64,
}

impl Throttle {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms, current_ms: min_ms }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    /// Backlog widens the interval (favor batching); an empty queue after a
    /// drain narrows it back toward the minimum.
    pub fn adjust(&mut self, queue_len_after_drain: usize) {
        if queue_len_after_drain > 0 {
            self.current_ms = (self.current_ms + 10).min(self.max_ms);
        } else {
            self.current_ms = self.current_ms.saturating_sub(10).max(self.min_ms);
        }
    }
}

/// Runs until `shutdown` fires. Intended to be spawned as its own task.
/// Re-fetches `socket.current()` every wake so a live `recreate()` (a
/// playback stop's clear-buffer operation) takes effect on the very next
/// send without needing to restart this task.
pub async fn run_send_loop(
    socket: Arc<OutboundSocket>,
    queue: Arc<OutboundQueue>,
    stats: Arc<SendStats>,
    max_batch_size: usize,
    min_throttle_ms: u64,
    max_throttle_ms: u64,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut throttle = Throttle::new(min_throttle_ms, max_throttle_ms);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(throttle.interval()) => {
                let batch = queue.drain_batch(max_batch_size);
                let current = socket.current();
                for msg in &batch {
                    let packet = OscPacket::Message(msg.to_rosc());
                    match encoder::encode(&packet) {
                        Ok(bytes) => {
                            if let Err(e) = current.send(&bytes).await {
                                stats.errors.fetch_add(1, Ordering::Relaxed);
                                log::warn!("osc send failed: {e}");
                            } else {
                                stats.sent.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(e) => log::warn!("osc encode failed: {e:?}"),
                    }
                }
                throttle.adjust(queue.len());
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_widens_under_backlog_and_narrows_when_empty() {
        let mut t = Throttle::new(50, 100);
        t.adjust(5);
        assert_eq!(t.current_ms, 60);
        t.adjust(0);
        assert_eq!(t.current_ms, 50);
    }

    #[test]
    fn throttle_clamps_to_bounds() {
        let mut t = Throttle::new(50, 100);
        for _ in 0..20 {
            t.adjust(1);
        }
        assert_eq!(t.current_ms, 100);
    }
}
