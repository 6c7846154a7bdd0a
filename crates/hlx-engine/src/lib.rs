//! Engine facade: one process-wide instance wiring together the Playback
//! Orchestrator, the OSC Message Optimiser, and the Transport/Device
//! Mirror. This is the only crate that owns sockets and tokio tasks.

mod anim_control;
pub mod error;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;
use hlx_core::{EngineConfig, Event, PlaybackId, PlaybackRequest, RequestError, ScheduleId, Track};
use hlx_orchestrator::Orchestrator;
use hlx_osc::{OptimiserConfig, TickTelemetry};
use hlx_transport::{
    run_discovery, run_liveness_loop, run_recv_loop, run_send_loop, Availability, DeviceMirror, DiscoveryConfig,
    InboundEvent, OutboundQueue, OutboundSocket, SendStats,
};
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub use error::EngineError;

/// Tunable endpoints an `Engine` binds at construction; every other knob
/// lives on `EngineConfig`.
pub struct Endpoints {
    pub outbound: SocketAddr,
    pub inbound_bind: SocketAddr,
}

pub struct Engine {
    config: EngineConfig,
    orchestrator: Orchestrator,
    optimiser_cfg: OptimiserConfig,
    outbound_queue: Arc<OutboundQueue>,
    mirror: Arc<Mutex<DeviceMirror>>,
    send_stats: Arc<SendStats>,
    outbound_socket: Arc<OutboundSocket>,
    inbound_tx: broadcast::Sender<InboundEvent>,
    inbound_events: broadcast::Receiver<InboundEvent>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
    seen_playbacks: HashSet<PlaybackId>,
}

impl Engine {
    pub async fn new(config: EngineConfig, tracks: Vec<Track>, endpoints: Endpoints) -> Result<Self, EngineError> {
        let outbound_socket =
            Arc::new(OutboundSocket::bind(endpoints.outbound, config.osc_send_buffer_bytes)?);
        let inbound_socket =
            Arc::new(UdpSocket::bind(endpoints.inbound_bind).await.map_err(EngineError::InboundBind)?);

        let outbound_queue = Arc::new(OutboundQueue::new(config.max_queue));
        let mirror = Arc::new(Mutex::new(DeviceMirror::new()));
        let send_stats = Arc::new(SendStats::default());
        let (shutdown_tx, _) = broadcast::channel(4);
        let (inbound_tx, inbound_events) = broadcast::channel(256);

        let mut orchestrator = Orchestrator::new(config);
        for t in tracks {
            orchestrator.register_track(t);
        }

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(run_send_loop(
            outbound_socket.clone(),
            outbound_queue.clone(),
            send_stats.clone(),
            config.max_batch_size,
            config.min_throttle_ms,
            config.max_throttle_ms,
            shutdown_tx.subscribe(),
        )));
        tasks.push(tokio::spawn(run_recv_loop(
            inbound_socket,
            mirror.clone(),
            inbound_tx.clone(),
            shutdown_tx.subscribe(),
        )));

        Ok(Self {
            config,
            orchestrator,
            optimiser_cfg: OptimiserConfig::from(&config),
            outbound_queue,
            mirror,
            send_stats,
            outbound_socket,
            inbound_tx,
            inbound_events,
            shutdown_tx,
            tasks,
            seen_playbacks: HashSet::new(),
        })
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.orchestrator.subscribe()
    }

    pub fn play(&mut self, request: PlaybackRequest, now: Instant) -> Result<PlaybackId, RequestError> {
        self.orchestrator.play(request, now)
    }

    pub fn schedule(&mut self, request: PlaybackRequest, execute_at: Instant) -> Result<ScheduleId, RequestError> {
        self.orchestrator.schedule(request, execute_at)
    }

    pub fn cancel_schedule(&mut self, id: ScheduleId) -> Result<(), RequestError> {
        self.orchestrator.cancel_schedule(id)
    }

    /// Stop a playback. If this is its final tick (no fade-out armed), the
    /// engine immediately clears the outbound socket's OS-level send
    /// buffer so the return-to-initial isn't tailed by stale positions
    /// still in flight from before the stop.
    pub fn stop(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        let result = self.orchestrator.stop(id, now);
        if result.is_ok() && !self.orchestrator.is_running(id) {
            self.clear_outbound_buffer();
        }
        result
    }

    pub fn stop_all(&mut self, now: Instant) {
        self.orchestrator.stop_all(now);
        self.clear_outbound_buffer();
    }

    fn clear_outbound_buffer(&self) {
        if let Err(e) = self.outbound_socket.recreate() {
            log::warn!("failed to clear outbound socket buffer on stop: {e}");
        }
    }

    pub fn pause(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        self.orchestrator.pause(id, now)
    }

    pub fn resume(&mut self, id: PlaybackId, now: Instant) -> Result<(), RequestError> {
        self.orchestrator.resume(id, now)
    }

    pub fn seek(&mut self, id: PlaybackId, now: Instant, t_s: f64) -> Result<(), RequestError> {
        self.orchestrator.seek(id, now, t_s)
    }

    pub fn send_stats(&self) -> &SendStats {
        &self.send_stats
    }

    pub fn dropped_outbound(&self) -> u64 {
        self.outbound_queue.dropped_count()
    }

    /// Probe every track index and merge discovered name/position/color
    /// into the project's track list. Intended to run once at startup,
    /// before the tick loop.
    pub async fn discover(&mut self) -> Result<u32, EngineError> {
        let discovery_cfg = DiscoveryConfig {
            max_probe: self.config.discovery_max_probe,
            probe_deadline_ms: self.config.probe_deadline_ms,
            availability_interval_ms: self.config.availability_interval_ms,
            ..DiscoveryConfig::default()
        };
        let socket = self.outbound_socket.current();
        let count = run_discovery(&socket, &self.mirror, &mut self.inbound_events, &discovery_cfg).await?;
        Ok(count)
    }

    /// Spawn the liveness loop; `on_change` is called on the tokio runtime
    /// whenever device availability flips.
    pub fn spawn_liveness(&mut self, on_change: impl FnMut(Availability) + Send + 'static) {
        let discovery_cfg = DiscoveryConfig {
            max_probe: self.config.discovery_max_probe,
            probe_deadline_ms: self.config.probe_deadline_ms,
            availability_interval_ms: self.config.availability_interval_ms,
            ..DiscoveryConfig::default()
        };
        let rx = self.inbound_tx.subscribe();
        let socket = self.outbound_socket.current();
        let shutdown = self.shutdown_tx.subscribe();
        self.tasks.push(tokio::spawn(run_liveness_loop(socket, rx, discovery_cfg, shutdown, on_change)));
    }

    /// Advance the orchestrator by one frame, compress each playback's
    /// updates through the OSC optimiser, and enqueue the result on the
    /// outbound queue. Returns aggregated telemetry for the tick.
    pub fn tick(&mut self, now: Instant) -> TickTelemetry {
        while let Ok(event) = self.inbound_events.try_recv() {
            if let InboundEvent::AnimControl { address, args } = event {
                anim_control::dispatch(&mut self.orchestrator, now, &address, &args);
            }
        }

        let running_before = self.orchestrator.running_ids();
        let holophonix_index = self.orchestrator.holophonix_indices();
        let groups = self.orchestrator.tick_grouped(now);

        let running_after = self.orchestrator.running_ids();
        if running_before.difference(&running_after).next().is_some() {
            // A playback completed (non-looping finish, or a fade-out this
            // tick wound down) without going through `stop()` directly.
            self.clear_outbound_buffer();
        }

        let mut total = TickTelemetry { original_count: 0, optimised_count: 0, reduction_pct: 0.0 };
        for group in groups {
            let first_tick = self.seen_playbacks.insert(group.playback_id);
            let (msgs, telemetry) = hlx_osc::optimise(
                &group.updates,
                &holophonix_index,
                group.model,
                &group.mode,
                &self.optimiser_cfg,
                first_tick,
            );
            self.outbound_queue.push_all(msgs);
            total.original_count += telemetry.original_count;
            total.optimised_count += telemetry.optimised_count;
        }
        total.reduction_pct = if total.original_count > 0 {
            100.0 * (1.0 - total.optimised_count as f64 / total.original_count as f64)
        } else {
            0.0
        };
        total
    }

    /// Signal every spawned task to stop and clear anything still queued
    /// so a subsequent restart doesn't flush stale positions.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        self.outbound_queue.clear();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}
