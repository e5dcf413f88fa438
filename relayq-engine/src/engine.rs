//! In-memory queue engine

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of an [`QueueEngine::enqueue`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The value was handed directly to a blocked consumer and never touched
    /// storage.
    Delivered,
    /// No consumer was waiting; the value was appended to the key's queue,
    /// which now holds `depth` values.
    Stored { depth: usize },
}

/// A consumer blocked on a key, reachable through a one-shot channel.
///
/// The id is unique for the engine's lifetime so the timeout path can remove
/// its own entry by identity; positions shift as neighbouring waiters are
/// delivered to or removed.
#[derive(Debug)]
struct Waiter {
    id: u64,
    tx: oneshot::Sender<String>,
}

/// Queue and waiter list for one key. The two are only ever mutated together,
/// under the owning map entry's guard.
#[derive(Debug, Default)]
struct KeyState {
    values: VecDeque<String>,
    waiters: VecDeque<Waiter>,
}

/// Registry of per-key FIFO queues and blocked consumers.
///
/// Keys are opaque strings; queues and waiter lists are created lazily on
/// first use and persist for the engine's lifetime. An engine is cheap to
/// construct and owns all of its state, so tests can run any number of
/// independent instances; the server shares one behind an `Arc`.
#[derive(Debug, Default)]
pub struct QueueEngine {
    keys: DashMap<String, KeyState>,
    next_waiter_id: AtomicU64,
}

impl QueueEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value under a key.
    ///
    /// If a consumer is blocked on the key, the value goes straight to the
    /// earliest-registered one and storage is never touched. Otherwise it is
    /// appended to the tail of the key's queue. Exactly one of the two
    /// happens.
    pub fn enqueue(&self, key: &str, value: String) -> Enqueued {
        let mut state = self.keys.entry(key.to_owned()).or_default();

        let mut value = value;
        while let Some(waiter) = state.waiters.pop_front() {
            match waiter.tx.send(value) {
                Ok(()) => {
                    debug!(key = %key, waiter = waiter.id, "delivered to waiter");
                    return Enqueued::Delivered;
                }
                // Receiver gone: the waiter's request was cancelled after
                // registration. Reclaim the value and try the next one.
                Err(reclaimed) => value = reclaimed,
            }
        }

        state.values.push_back(value);
        let depth = state.values.len();
        debug!(key = %key, depth, "stored");
        Enqueued::Stored { depth }
    }

    /// Pop the head value for a key without blocking.
    ///
    /// Never touches the waiter list: a blocked consumer can only be
    /// satisfied by a producer.
    pub fn try_dequeue(&self, key: &str) -> Option<String> {
        let mut state = self.keys.get_mut(key)?;
        state.values.pop_front()
    }

    /// Pop the head value for a key, blocking up to `timeout` for a producer
    /// to supply one.
    ///
    /// A zero timeout degenerates to [`Self::try_dequeue`]. The per-key lock
    /// is released while suspended; the waiter's one-shot channel is the only
    /// synchronization point between the producer and this call.
    pub async fn dequeue_blocking(&self, key: &str, timeout: Duration) -> Option<String> {
        if timeout.is_zero() {
            return self.try_dequeue(key);
        }

        let (tx, mut rx) = oneshot::channel();
        let waiter_id = {
            let mut state = self.keys.entry(key.to_owned()).or_default();
            if let Some(value) = state.values.pop_front() {
                return Some(value);
            }
            let id = self.next_waiter_id.fetch_add(1, Ordering::Relaxed);
            state.waiters.push_back(Waiter { id, tx });
            id
        };
        debug!(key = %key, waiter = waiter_id, timeout_ms = timeout.as_millis() as u64, "waiting");

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(value)) => Some(value),
            // The sender half never drops without sending while the waiter is
            // registered, so this arm is unreachable; treat it as a miss.
            Ok(Err(_)) => None,
            Err(_elapsed) => self.abandon(key, waiter_id, rx),
        }
    }

    /// Deadline path of [`Self::dequeue_blocking`]: withdraw the waiter and
    /// resolve the race against a concurrent delivery.
    ///
    /// Producers pop-and-send under the key guard, so once the guard is held
    /// here exactly one of two states is visible: the waiter is still
    /// registered (no delivery can ever happen, and removing it drops the
    /// sender), or it was already popped and the send has completed (the
    /// value is sitting in the channel and must be consumed, not leaked).
    fn abandon(&self, key: &str, waiter_id: u64, mut rx: oneshot::Receiver<String>) -> Option<String> {
        let mut state = self.keys.entry(key.to_owned()).or_default();
        state.waiters.retain(|w| w.id != waiter_id);
        match rx.try_recv() {
            Ok(value) => {
                debug!(key = %key, waiter = waiter_id, "delivery beat the deadline");
                Some(value)
            }
            Err(_) => {
                debug!(key = %key, waiter = waiter_id, "timed out");
                None
            }
        }
    }

    /// Number of values currently stored under a key.
    pub fn depth(&self, key: &str) -> usize {
        self.keys.get(key).map_or(0, |state| state.values.len())
    }

    /// Number of consumers currently blocked on a key.
    pub fn waiting(&self, key: &str) -> usize {
        self.keys.get(key).map_or(0, |state| state.waiters.len())
    }
}
