//! Single-slot observable state with ordered fan-out to subscribers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

/// Stream of published snapshots, starting with the value current at
/// subscription time.
pub type Subscription<S> = UnboundedReceiverStream<Arc<S>>;

/// Every update runs inside a single critical section: the closure sees the
/// latest committed snapshot, the replacement is stored, and it is queued to
/// every subscriber before the lock is released. Subscribers therefore see
/// the same values in the same order, and nothing is dropped for slow
/// readers.
pub struct StateBox<S> {
    inner: Arc<Mutex<Slot<S>>>,
}

struct Slot<S> {
    current: Arc<S>,
    version: u64,
    subscribers: Vec<mpsc::UnboundedSender<Arc<S>>>,
}

impl<S> Clone for StateBox<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> StateBox<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slot {
                current: Arc::new(initial),
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn read(&self) -> Arc<S> {
        Arc::clone(&self.lock().current)
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn subscriber_count(&self) -> usize {
        let mut slot = self.lock();
        slot.subscribers.retain(|tx| !tx.is_closed());
        slot.subscribers.len()
    }

    pub fn update<F>(&self, f: F) -> Arc<S>
    where
        F: FnOnce(&S) -> S,
    {
        let mut slot = self.lock();
        let next = Arc::new(f(&slot.current));
        Self::publish(&mut slot, Arc::clone(&next));
        next
    }

    /// Like [`StateBox::update`], but an `Err` from `f` rejects the update:
    /// nothing is stored or published.
    pub fn try_update<F, E>(&self, f: F) -> Result<Arc<S>, E>
    where
        F: FnOnce(&S) -> Result<S, E>,
    {
        let mut slot = self.lock();
        let next = Arc::new(f(&slot.current)?);
        Self::publish(&mut slot, Arc::clone(&next));
        Ok(next)
    }

    pub fn subscribe(&self) -> Subscription<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut slot = self.lock();
        if tx.send(Arc::clone(&slot.current)).is_ok() {
            slot.subscribers.push(tx);
        }
        UnboundedReceiverStream::new(rx)
    }

    fn publish(slot: &mut Slot<S>, next: Arc<S>) {
        slot.current = Arc::clone(&next);
        slot.version += 1;
        slot.subscribers
            .retain(|tx| tx.send(Arc::clone(&next)).is_ok());
        trace!(
            version = slot.version,
            subscribers = slot.subscribers.len(),
            "published snapshot"
        );
    }

    // Snapshots are replaced wholesale, so a panic inside an update closure
    // cannot leave the slot half-written.
    fn lock(&self) -> MutexGuard<'_, Slot<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/state_box_tests.rs"]
mod tests;
