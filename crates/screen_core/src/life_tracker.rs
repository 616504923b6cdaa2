//! Life-tracker screen: logs host lifecycle transitions, newest first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use shared::domain::LifecycleSignal;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{
    clock::{Clock, SystemClock},
    lifecycle::{LifecycleHost, Registration},
    state_box::{StateBox, Subscription},
    types::{LifeSnapshot, TransientNotice},
};

pub type NoticeReceiver = mpsc::UnboundedReceiver<TransientNotice>;

#[derive(Clone)]
pub struct LifeTrackerController {
    core: Arc<TrackerCore>,
}

struct TrackerCore {
    state: StateBox<LifeSnapshot>,
    notices: Mutex<Vec<mpsc::UnboundedSender<TransientNotice>>>,
    clock: Arc<dyn Clock>,
    registration: Mutex<Option<Registration>>,
}

impl Default for LifeTrackerController {
    fn default() -> Self {
        Self::new()
    }
}

impl LifeTrackerController {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            core: Arc::new(TrackerCore {
                state: StateBox::new(LifeSnapshot::default()),
                notices: Mutex::new(Vec::new()),
                clock,
                registration: Mutex::new(None),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<LifeSnapshot> {
        self.core.state.read()
    }

    pub fn subscribe(&self) -> Subscription<LifeSnapshot> {
        self.core.state.subscribe()
    }

    pub fn subscribe_notices(&self) -> NoticeReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.core.notices().push(tx);
        rx
    }

    pub fn toggle_notify(&self) -> Arc<LifeSnapshot> {
        self.core.state.update(LifeSnapshot::with_notify_toggled)
    }

    /// Returns `false` without adding a second listener when already active.
    pub fn activate(&self, host: Arc<dyn LifecycleHost>) -> bool {
        let mut registration = self.core.registration();
        if registration.is_some() {
            debug!("life tracker already active");
            return false;
        }

        let core: Weak<TrackerCore> = Arc::downgrade(&self.core);
        *registration = Some(Registration::register(
            host,
            Arc::new(move |signal| {
                if let Some(core) = core.upgrade() {
                    core.on_signal(signal);
                }
            }),
        ));
        true
    }

    pub fn deactivate(&self) -> bool {
        let registration = self.core.registration().take();
        registration.is_some()
    }

    /// Unrecognized signals change nothing and return `None`.
    pub fn on_signal(&self, signal: LifecycleSignal) -> Option<Arc<LifeSnapshot>> {
        self.core.on_signal(signal)
    }
}

impl TrackerCore {
    fn on_signal(&self, signal: LifecycleSignal) -> Option<Arc<LifeSnapshot>> {
        let Some((label, state)) = signal.transition() else {
            trace!(?signal, "ignoring lifecycle signal");
            return None;
        };

        // Held across the append so notices keep the log's order.
        let mut notices = self.notices();
        let clock = self.clock.as_ref();
        let snapshot = self.state.update(|s| s.with_event(label, state, clock));
        trace!(label, %state, events = snapshot.events.len(), "lifecycle event logged");

        if snapshot.notify_enabled {
            let message = format!("Transition: {label}");
            notices.retain(|tx| {
                tx.send(TransientNotice {
                    message: message.clone(),
                })
                .is_ok()
            });
        }
        Some(snapshot)
    }

    fn notices(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<TransientNotice>>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registration(&self) -> MutexGuard<'_, Option<Registration>> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/life_tracker_tests.rs"]
mod tests;
