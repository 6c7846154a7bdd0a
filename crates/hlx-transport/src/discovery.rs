//! Track discovery and liveness probing (spec-internal name: Device Mirror
//! & Discovery). Sends `/get` queries directly on the outbound socket,
//! bypassing the coalescing queue — these are one-shot reads, not
//! positions to be superseded by a later write.

use std::sync::Arc;
use std::time::Duration;

use hlx_core::CoordinateSystem;
use parking_lot::Mutex;
use rosc::{encoder, OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::error::TransportError;
use crate::inbound::InboundEvent;
use crate::mirror::DeviceMirror;

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub max_probe: u32,
    pub probe_deadline_ms: u64,
    pub availability_interval_ms: u64,
    pub end_of_batch_grace_ms: u64,
    pub inter_send_ms: u64,
    pub coordinate_system: CoordinateSystem,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_probe: 128,
            probe_deadline_ms: 900,
            availability_interval_ms: 5000,
            end_of_batch_grace_ms: 2000,
            inter_send_ms: 40,
            coordinate_system: CoordinateSystem::Xyz,
        }
    }
}

fn position_field(cs: CoordinateSystem) -> &'static str {
    match cs {
        CoordinateSystem::Xyz => "xyz",
        CoordinateSystem::Aed => "aed",
    }
}

async fn send_get(socket: &UdpSocket, path: &str) -> Result<(), TransportError> {
    let msg = OscMessage { addr: "/get".to_string(), args: vec![OscType::String(path.to_string())] };
    let bytes = encoder::encode(&OscPacket::Message(msg)).map_err(|e| TransportError::Decode(format!("{e:?}")))?;
    socket.send(&bytes).await.map_err(TransportError::Send)
}

/// Probe `1..=max_probe`, stopping as soon as the inbound loop reports a
/// failure for the index currently being probed. Responses continue to
/// trickle in via `events` and are applied to `mirror` by the inbound loop
/// itself; this function only drives the send side and the early-stop
/// decision.
pub async fn run_discovery(
    socket: &UdpSocket,
    mirror: &Mutex<DeviceMirror>,
    events: &mut broadcast::Receiver<InboundEvent>,
    config: &DiscoveryConfig,
) -> Result<u32, TransportError> {
    let field = position_field(config.coordinate_system);
    let mut last_discovered = 0;

    for i in 1..=config.max_probe {
        for suffix in ["name", field, "color"] {
            send_get(socket, &format!("/track/{i}/{suffix}")).await?;
            tokio::time::sleep(Duration::from_millis(config.inter_send_ms)).await;
        }

        if drain_until_failure_or_idle(events, i, Duration::from_millis(config.inter_send_ms * 4)).await {
            break;
        }
        last_discovered = i;
    }

    drain_stragglers(events, Duration::from_millis(config.end_of_batch_grace_ms)).await;
    Ok(last_discovered)
}

/// Drain any events already queued for index `i`; return `true` if a
/// failure for `i` was observed (discovery should stop here).
async fn drain_until_failure_or_idle(events: &mut broadcast::Receiver<InboundEvent>, i: u32, budget: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + budget;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return false;
        }
        match timeout(remaining, events.recv()).await {
            Ok(Ok(InboundEvent::TrackFailed { index })) if index == i => return true,
            Ok(Ok(_)) => continue,
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            Ok(Err(broadcast::error::RecvError::Closed)) => return false,
            Err(_) => return false,
        }
    }
}

async fn drain_stragglers(events: &mut broadcast::Receiver<InboundEvent>, budget: Duration) {
    let deadline = tokio::time::Instant::now() + budget;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() || timeout(remaining, events.recv()).await.is_err() {
            return;
        }
    }
}

/// Device availability as observed by the most recent liveness probe.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Available,
    Unavailable { last_error: Option<String> },
}

/// Send a single lightweight `/get /track/1/name` and wait up to
/// `probe_deadline_ms` for any matching response.
pub async fn probe_liveness(
    socket: &UdpSocket,
    events: &mut broadcast::Receiver<InboundEvent>,
    config: &DiscoveryConfig,
) -> Availability {
    if send_get(socket, "/track/1/name").await.is_err() {
        return Availability::Unavailable { last_error: Some("send failed".to_string()) };
    }
    let deadline = Duration::from_millis(config.probe_deadline_ms);
    match timeout(deadline, events.recv()).await {
        Ok(Ok(InboundEvent::ProbeMatched { .. })) => Availability::Available,
        Ok(Ok(InboundEvent::TrackFailed { .. })) => {
            Availability::Unavailable { last_error: Some("device reported failure".to_string()) }
        }
        _ => Availability::Unavailable { last_error: Some("no response within deadline".to_string()) },
    }
}

/// Runs a liveness probe every `availability_interval_ms`, stopping when
/// `shutdown` fires. `on_change` is invoked only when availability flips.
pub async fn run_liveness_loop(
    socket: Arc<UdpSocket>,
    mut events: broadcast::Receiver<InboundEvent>,
    config: DiscoveryConfig,
    mut shutdown: broadcast::Receiver<()>,
    mut on_change: impl FnMut(Availability),
) {
    let mut last = None;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(config.availability_interval_ms)) => {
                let availability = probe_liveness(&socket, &mut events, &config).await;
                if last.as_ref() != Some(&availability) {
                    on_change(availability.clone());
                    last = Some(availability);
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let c = DiscoveryConfig::default();
        assert_eq!(c.max_probe, 128);
        assert_eq!(c.probe_deadline_ms, 900);
        assert_eq!(c.availability_interval_ms, 5000);
    }

    #[test]
    fn position_field_follows_coordinate_system() {
        assert_eq!(position_field(CoordinateSystem::Xyz), "xyz");
        assert_eq!(position_field(CoordinateSystem::Aed), "aed");
    }
}
