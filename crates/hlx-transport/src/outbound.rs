//! Bounded outbound FIFO: latest-position-wins coalescing per
//! `(trackIndex, axis)`, capped at `MAX_QUEUE`. The engine tick pushes,
//! the send loop drains in batches.

use std::collections::VecDeque;

use hlx_osc::OscMsg;
use parking_lot::Mutex;

/// The axis (or `"abs"` for a 3-arg absolute message) a queued message
/// targets, keyed together with its affected track indices for coalescing.
fn coalesce_key(msg: &OscMsg) -> (Vec<u32>, String) {
    let axis = msg
        .address
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim_end_matches("++")
        .to_string();
    (msg.affected_track_indices.clone(), axis)
}

struct Inner {
    queue: VecDeque<OscMsg>,
    capacity: usize,
    dropped_count: u64,
}

/// Thread-safe outbound queue shared between the engine tick (producer) and
/// the UDP send loop (consumer).
pub struct OutboundQueue {
    inner: Mutex<Inner>,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { queue: VecDeque::with_capacity(capacity), capacity, dropped_count: 0 }) }
    }

    /// Enqueue one message, replacing any pending message with the same
    /// `(trackIndex, axis)` key (latest-position-wins). If the queue is
    /// still full after coalescing, the message is dropped.
    pub fn push(&self, msg: OscMsg) {
        let mut inner = self.inner.lock();
        let key = coalesce_key(&msg);
        if let Some(existing) = inner.queue.iter_mut().find(|m| coalesce_key(m) == key) {
            *existing = msg;
            return;
        }
        if inner.queue.len() >= inner.capacity {
            inner.dropped_count += 1;
            log::warn!("outbound queue full ({}), dropping message", inner.capacity);
            return;
        }
        inner.queue.push_back(msg);
    }

    pub fn push_all(&self, msgs: impl IntoIterator<Item = OscMsg>) {
        for m in msgs {
            self.push(m);
        }
    }

    /// Drain up to `max_batch_size` messages in FIFO order.
    pub fn drain_batch(&self, max_batch_size: usize) -> Vec<OscMsg> {
        let mut inner = self.inner.lock();
        let n = max_batch_size.min(inner.queue.len());
        inner.queue.drain(..n).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.lock().dropped_count
    }

    /// Discard everything queued, used when the socket is recreated on stop
    /// so a final return-to-initial isn't tailed by stale positions.
    pub fn clear(&self) {
        self.inner.lock().queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(addr: &str, indices: Vec<u32>) -> OscMsg {
        OscMsg { address: addr.to_string(), args: vec![0.0], affected_track_indices: indices }
    }

    #[test]
    fn same_track_axis_replaces_pending() {
        let q = OutboundQueue::new(20);
        q.push(msg("/track/1/x++", vec![1]));
        q.push(msg("/track/1/x++", vec![1]));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn different_axis_does_not_coalesce() {
        let q = OutboundQueue::new(20);
        q.push(msg("/track/1/x++", vec![1]));
        q.push(msg("/track/1/y++", vec![1]));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let q = OutboundQueue::new(1);
        q.push(msg("/track/1/x++", vec![1]));
        q.push(msg("/track/2/x++", vec![2]));
        assert_eq!(q.len(), 1);
        assert_eq!(q.dropped_count(), 1);
    }

    #[test]
    fn drain_batch_respects_cap() {
        let q = OutboundQueue::new(20);
        for i in 0..15u32 {
            q.push(msg(&format!("/track/{i}/x++"), vec![i]));
        }
        let batch = q.drain_batch(10);
        assert_eq!(batch.len(), 10);
        assert_eq!(q.len(), 5);
    }

    #[test]
    fn clear_empties_the_queue() {
        let q = OutboundQueue::new(20);
        q.push(msg("/track/1/x++", vec![1]));
        q.clear();
        assert!(q.is_empty());
    }
}
