//! Counter screen: manual steps plus an optional auto-increment loop.

use std::sync::Arc;

use shared::{domain::IntervalMs, error::ScreenError};
use tracing::{info, warn};

use crate::{
    periodic::{PeriodicTask, RestartPolicy},
    state_box::{StateBox, Subscription},
    types::CounterSnapshot,
};

pub struct CounterController {
    state: StateBox<CounterSnapshot>,
    auto: PeriodicTask,
}

impl CounterController {
    pub fn new() -> Result<Self, ScreenError> {
        Self::with_interval(IntervalMs::DEFAULT)
    }

    pub fn with_interval(interval_ms: IntervalMs) -> Result<Self, ScreenError> {
        let auto = PeriodicTask::new("counter-auto", RestartPolicy::Replace)?;
        info!(%interval_ms, "counter controller created");
        Ok(Self {
            state: StateBox::new(CounterSnapshot::with_interval(interval_ms)),
            auto,
        })
    }

    pub fn snapshot(&self) -> Arc<CounterSnapshot> {
        self.state.read()
    }

    pub fn subscribe(&self) -> Subscription<CounterSnapshot> {
        self.state.subscribe()
    }

    pub fn increment(&self) -> Arc<CounterSnapshot> {
        self.state.update(CounterSnapshot::incremented)
    }

    pub fn decrement(&self) -> Arc<CounterSnapshot> {
        self.state.update(CounterSnapshot::decremented)
    }

    pub fn reset(&self) -> Arc<CounterSnapshot> {
        self.state.update(|s| CounterSnapshot { count: 0, ..*s })
    }

    /// Restarts a running loop even when the value is unchanged.
    pub fn set_interval(&mut self, ms: i64) -> Result<Arc<CounterSnapshot>, ScreenError> {
        let interval_ms =
            IntervalMs::new(ms).inspect_err(|err| warn!(%err, "interval rejected"))?;
        Ok(self.apply_interval(interval_ms))
    }

    pub fn set_interval_text(&mut self, text: &str) -> Result<Arc<CounterSnapshot>, ScreenError> {
        let interval_ms =
            IntervalMs::parse(text).inspect_err(|err| warn!(%err, "interval rejected"))?;
        Ok(self.apply_interval(interval_ms))
    }

    pub fn toggle_auto(&mut self) -> Arc<CounterSnapshot> {
        if self.state.read().auto_running {
            self.stop_auto()
        } else {
            self.start_auto()
        }
    }

    pub fn is_auto_running(&self) -> bool {
        self.auto.is_running()
    }

    fn apply_interval(&mut self, interval_ms: IntervalMs) -> Arc<CounterSnapshot> {
        let snapshot = self.state.update(|s| CounterSnapshot { interval_ms, ..*s });
        if snapshot.auto_running {
            self.spawn_auto(interval_ms);
        }
        snapshot
    }

    fn start_auto(&mut self) -> Arc<CounterSnapshot> {
        let snapshot = self.state.update(|s| CounterSnapshot {
            auto_running: true,
            ..*s
        });
        self.spawn_auto(snapshot.interval_ms);
        snapshot
    }

    fn spawn_auto(&mut self, interval_ms: IntervalMs) {
        let state = self.state.clone();
        self.auto.start(interval_ms.as_duration(), move || {
            state.update(CounterSnapshot::incremented);
        });
    }

    fn stop_auto(&mut self) -> Arc<CounterSnapshot> {
        self.auto.cancel();
        self.state.update(|s| CounterSnapshot {
            auto_running: false,
            ..*s
        })
    }
}

#[cfg(test)]
#[path = "tests/counter_tests.rs"]
mod tests;
