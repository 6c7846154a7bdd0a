//! Event fan-out: the orchestrator doesn't know or care who's listening.
//! Subscribers get their own receiver; a full receiver is dropped from the
//! registry rather than blocking the tick loop.

use crossbeam_channel::{unbounded, Receiver, Sender};
use hlx_core::Event;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: Event) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for e in events {
            self.emit(e);
        }
    }
}
