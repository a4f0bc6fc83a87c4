//! Live subscriber bookkeeping for the SSE fan-out.
//!
//! The registry owns the only shared mutable resource in the relay: the map of
//! connected output channels. Registration hands back a [`Subscription`] that
//! unregisters itself on drop, so the transport-close path and the
//! failed-write path both converge on the same removal.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::relay::NormalizedEvent;

pub type SubscriberId = u64;

type LiveSet = HashMap<SubscriberId, mpsc::UnboundedSender<NormalizedEvent>>;

/// Tracks the set of currently connected subscribers.
///
/// All operations are synchronous and hold the lock only for the duration of
/// one pass, so `register` / `unregister` / `broadcast` interleave safely from
/// any task.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    live: Mutex<LiveSet>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new subscriber to the live set and returns its receiving half.
    pub fn register(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.live().insert(id, tx);
        debug!(id, "subscriber registered");
        Subscription {
            id,
            registry: Arc::clone(self),
            rx,
        }
    }

    /// Removes a subscriber from the live set. Idempotent.
    pub fn unregister(&self, id: SubscriberId) {
        if self.live().remove(&id).is_some() {
            debug!(id, "subscriber unregistered");
        }
    }

    /// Fans one event out to every live subscriber, in no particular order.
    ///
    /// A failed write means the receiving end is gone; that subscriber is
    /// evicted immediately and delivery continues to the rest. No retry, no
    /// buffering. Returns the number of subscribers that received the event.
    pub fn broadcast(&self, event: &NormalizedEvent) -> usize {
        let mut live = self.live();
        let mut delivered = 0;
        let mut dead: Vec<SubscriberId> = Vec::new();

        for (id, tx) in live.iter() {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            live.remove(&id);
            debug!(id, "evicted dead subscriber");
        }

        delivered
    }

    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live().is_empty()
    }

    fn live(&self) -> MutexGuard<'_, LiveSet> {
        // A panic while holding this lock leaves the map intact; keep serving.
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One subscriber's receiving half plus an RAII guard: dropping the
/// subscription removes it from the registry.
pub struct Subscription {
    id: SubscriberId,
    registry: Arc<SubscriberRegistry>,
    rx: mpsc::UnboundedReceiver<NormalizedEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<NormalizedEvent> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = NormalizedEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
