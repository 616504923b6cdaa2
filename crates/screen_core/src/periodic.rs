//! Cancellable `wait -> mutate -> repeat` background loop.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::error::ScreenError;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, trace};

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Cancel the running loop and start a fresh one with the new period.
    Replace,
    /// Leave the running loop alone; only a prior `cancel` allows a new start.
    KeepRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Restarted,
    AlreadyRunning,
}

/// Owner handle for at most one live periodic loop.
///
/// Each tick runs its mutation while holding the loop's gate, and `cancel`
/// closes that gate before aborting the task. Once `cancel` returns no new
/// mutation can begin; one already running is allowed to finish first.
pub struct PeriodicTask {
    name: &'static str,
    policy: RestartPolicy,
    runtime: Handle,
    active: Option<ActiveLoop>,
}

struct ActiveLoop {
    period: Duration,
    gate: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn new(name: &'static str, policy: RestartPolicy) -> Result<Self, ScreenError> {
        let runtime = Handle::try_current().map_err(|_| ScreenError::NoRuntime { task: name })?;
        Ok(Self::with_runtime(name, policy, runtime))
    }

    pub fn with_runtime(name: &'static str, policy: RestartPolicy, runtime: Handle) -> Self {
        Self {
            name,
            policy,
            runtime,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.active.as_ref().map(|active| active.period)
    }

    pub fn start<F>(&mut self, period: Duration, mutate: F) -> StartOutcome
    where
        F: FnMut() + Send + 'static,
    {
        let outcome = match (self.active.is_some(), self.policy) {
            (true, RestartPolicy::KeepRunning) => {
                debug!(task = self.name, "start ignored, loop already running");
                return StartOutcome::AlreadyRunning;
            }
            (true, RestartPolicy::Replace) => {
                self.cancel();
                StartOutcome::Restarted
            }
            (false, _) => StartOutcome::Started,
        };

        let period = period.max(MIN_PERIOD);
        self.active = Some(self.spawn_loop(period, mutate));
        debug!(
            task = self.name,
            period_ms = period.as_millis() as u64,
            ?outcome,
            "periodic loop running"
        );
        outcome
    }

    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        *active.gate.lock().unwrap_or_else(PoisonError::into_inner) = false;
        active.handle.abort();
        debug!(task = self.name, "periodic loop cancelled");
        true
    }

    fn spawn_loop<F>(&self, period: Duration, mut mutate: F) -> ActiveLoop
    where
        F: FnMut() + Send + 'static,
    {
        let gate = Arc::new(Mutex::new(true));
        let tick_gate = Arc::clone(&gate);
        let name = self.name;

        let handle = self.runtime.spawn(async move {
            loop {
                tokio::time::sleep(period).await;

                let live = tick_gate.lock().unwrap_or_else(PoisonError::into_inner);
                if !*live {
                    break;
                }
                mutate();
                trace!(task = name, "tick");
            }
        });

        ActiveLoop {
            period,
            gate,
            handle,
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/periodic_tests.rs"]
mod tests;
