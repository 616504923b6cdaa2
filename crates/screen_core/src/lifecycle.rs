//! Host lifecycle observation, injected rather than ambient.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::LifecycleSignal;
use tracing::debug;

pub type LifecycleObserver = Arc<dyn Fn(LifecycleSignal) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Something that emits lifecycle signals to registered observers, in the
/// order it decides.
pub trait LifecycleHost: Send + Sync {
    fn add_observer(&self, observer: LifecycleObserver) -> ObserverId;
    fn remove_observer(&self, id: ObserverId) -> bool;
}

#[must_use = "dropping a Registration removes the observer immediately"]
pub struct Registration {
    host: Arc<dyn LifecycleHost>,
    id: ObserverId,
}

impl Registration {
    pub fn register(host: Arc<dyn LifecycleHost>, observer: LifecycleObserver) -> Self {
        let id = host.add_observer(observer);
        debug!(observer = id.0, "lifecycle observer registered");
        Self { host, id }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.host.remove_observer(self.id) {
            debug!(observer = self.id.0, "lifecycle observer removed");
        }
    }
}

#[derive(Default)]
pub struct LifecycleRegistry {
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    observers: Vec<(ObserverId, LifecycleObserver)>,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn dispatch(&self, signal: LifecycleSignal) {
        // Observers run outside the lock so they may (de)register freely.
        let observers: Vec<LifecycleObserver> = self
            .lock()
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer(signal);
        }
    }

    pub fn dispatch_all(&self, signals: impl IntoIterator<Item = LifecycleSignal>) {
        for signal in signals {
            self.dispatch(signal);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LifecycleHost for LifecycleRegistry {
    fn add_observer(&self, observer: LifecycleObserver) -> ObserverId {
        let mut state = self.lock();
        let id = ObserverId(state.next_id);
        state.next_id += 1;
        state.observers.push((id, observer));
        id
    }

    fn remove_observer(&self, id: ObserverId) -> bool {
        let mut state = self.lock();
        let before = state.observers.len();
        state.observers.retain(|(existing, _)| *existing != id);
        state.observers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn registration_removes_observer_on_drop() {
        let registry = Arc::new(LifecycleRegistry::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let registration = Registration::register(
            registry.clone(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.dispatch(LifecycleSignal::Start);
        assert_eq!(registry.observer_count(), 1);

        drop(registration);
        registry.dispatch(LifecycleSignal::Stop);

        assert_eq!(registry.observer_count(), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observers_receive_signals_in_dispatch_order() {
        let registry = Arc::new(LifecycleRegistry::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _registration = Registration::register(
            registry.clone(),
            Arc::new(move |signal| sink.lock().expect("sink").push(signal)),
        );
        registry.dispatch_all([
            LifecycleSignal::Create,
            LifecycleSignal::Any,
            LifecycleSignal::Start,
        ]);

        assert_eq!(
            *seen.lock().expect("seen"),
            [LifecycleSignal::Create, LifecycleSignal::Any, LifecycleSignal::Start]
        );
    }

    #[test]
    fn removing_unknown_observer_is_a_no_op() {
        let registry = LifecycleRegistry::new();
        assert!(!registry.remove_observer(ObserverId(99)));
    }
}
