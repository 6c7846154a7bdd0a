//! Inbound OSC parsing: one UDP listen socket, dispatched to the Device
//! Mirror, the probe handler, the error handler, or animation-control.

use std::sync::Arc;
use std::time::Instant;

use hlx_core::{Color, Position};
use parking_lot::Mutex;
use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use crate::mirror::DeviceMirror;

/// Something the recv loop observed, handed upstream for the orchestrator
/// (animation-control) or probe/liveness bookkeeping to react to.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    ProbeMatched { index: u32 },
    TrackFailed { index: u32 },
    AnimControl { address: String, args: Vec<OscType> },
    Unrecognized { address: String },
}

fn track_index(segments: &[&str]) -> Option<u32> {
    segments.get(1)?.parse().ok()
}

fn f64_arg(args: &[OscType], i: usize) -> Option<f64> {
    match args.get(i) {
        Some(OscType::Float(f)) => Some(*f as f64),
        Some(OscType::Double(d)) => Some(*d),
        _ => None,
    }
}

/// Parse one inbound OSC message, updating the mirror in place and
/// returning an event for anything the recv loop can't fully resolve
/// itself (probe matches, failures, animation control).
pub fn handle_message(msg: &OscMessage, mirror: &Mutex<DeviceMirror>, now: Instant) -> Option<InboundEvent> {
    let segments: Vec<&str> = msg.addr.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        ["track", n, "name"] => {
            let index = n.parse().ok()?;
            if let Some(OscType::String(name)) = msg.args.first() {
                mirror.lock().set_name(index, name.clone(), now);
            }
            Some(InboundEvent::ProbeMatched { index })
        }
        ["track", n, "xyz"] => {
            let index = n.parse().ok()?;
            let (x, y, z) = (f64_arg(&msg.args, 0)?, f64_arg(&msg.args, 1)?, f64_arg(&msg.args, 2)?);
            mirror.lock().set_position(index, Position::new(x, y, z), now);
            Some(InboundEvent::ProbeMatched { index })
        }
        ["track", n, "aed"] => {
            let index = n.parse().ok()?;
            let (az, el, dist) = (f64_arg(&msg.args, 0)?, f64_arg(&msg.args, 1)?, f64_arg(&msg.args, 2)?);
            let wire_az = if az > 180.0 { az - 360.0 } else { az };
            let position = hlx_core::aed_to_xyz(hlx_core::Aed::new(wire_az, el, dist));
            mirror.lock().set_position(index, position, now);
            Some(InboundEvent::ProbeMatched { index })
        }
        ["track", n, "color"] => {
            let index = n.parse().ok()?;
            let (r, g, b, a) = (
                f64_arg(&msg.args, 0)?,
                f64_arg(&msg.args, 1)?,
                f64_arg(&msg.args, 2)?,
                f64_arg(&msg.args, 3).unwrap_or(1.0),
            );
            mirror.lock().set_color(index, Color { r, g, b, a }, now);
            Some(InboundEvent::ProbeMatched { index })
        }
        ["error"] => {
            if let Some(OscType::String(payload)) = msg.args.first() {
                parse_error_payload(payload).map(|index| {
                    mirror.lock().mark_failed(index);
                    InboundEvent::TrackFailed { index }
                })
            } else {
                None
            }
        }
        ["anim", ..] => Some(InboundEvent::AnimControl { address: msg.addr.clone(), args: msg.args.clone() }),
        _ => {
            let _ = track_index(&segments);
            Some(InboundEvent::Unrecognized { address: msg.addr.clone() })
        }
    }
}

/// `"from Core: Cannot get track,N,<field>"` -> `N`.
fn parse_error_payload(payload: &str) -> Option<u32> {
    payload.split(',').nth(1)?.trim().parse().ok()
}

/// Runs until `shutdown` fires, broadcasting every parsed event to all
/// current subscribers (discovery, liveness, and animation-control
/// dispatch each hold their own `broadcast::Receiver`).
pub async fn run_recv_loop(
    socket: Arc<UdpSocket>,
    mirror: Arc<Mutex<DeviceMirror>>,
    tx: broadcast::Sender<InboundEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut buf = [0u8; 4096];
    loop {
        tokio::select! {
            recv = socket.recv(&mut buf) => {
                match recv {
                    Ok(n) => {
                        match rosc::decoder::decode_udp(&buf[..n]) {
                            Ok((_, OscPacket::Message(m))) => {
                                if let Some(event) = handle_message(&m, &mirror, Instant::now()) {
                                    let _ = tx.send(event);
                                }
                            }
                            Ok((_, OscPacket::Bundle(bundle))) => {
                                for packet in bundle.content {
                                    if let OscPacket::Message(m) = packet {
                                        if let Some(event) = handle_message(&m, &mirror, Instant::now()) {
                                            let _ = tx.send(event);
                                        }
                                    }
                                }
                            }
                            Err(e) => log::warn!("malformed OSC packet: {e:?}"),
                        }
                    }
                    Err(e) => log::warn!("udp recv error: {e}"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror() -> Mutex<DeviceMirror> {
        Mutex::new(DeviceMirror::new())
    }

    #[test]
    fn xyz_updates_mirror_position() {
        let m = mirror();
        let msg = OscMessage {
            addr: "/track/3/xyz".into(),
            args: vec![OscType::Float(1.0), OscType::Float(2.0), OscType::Float(3.0)],
        };
        handle_message(&msg, &m, Instant::now());
        assert_eq!(m.lock().get(3).unwrap().last_known_position, Some(Position::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn error_marks_failed_index() {
        let m = mirror();
        let msg = OscMessage {
            addr: "/error".into(),
            args: vec![OscType::String("from Core: Cannot get track,7,xyz".into())],
        };
        let event = handle_message(&msg, &m, Instant::now());
        assert!(matches!(event, Some(InboundEvent::TrackFailed { index: 7 })));
        assert!(m.lock().is_failed(7));
    }

    #[test]
    fn anim_control_is_passed_through() {
        let m = mirror();
        let msg = OscMessage { addr: "/anim/play".into(), args: vec![OscType::String("a1".into())] };
        let event = handle_message(&msg, &m, Instant::now());
        assert!(matches!(event, Some(InboundEvent::AnimControl { .. })));
    }
}
