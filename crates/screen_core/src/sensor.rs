//! Sensor screen: a fixed-cadence poller over a bounded reading window.

use std::{
    ops::Range,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::{domain::Reading, error::ScreenError};
use tracing::info;

use crate::{
    clock::{Clock, SystemClock},
    periodic::{PeriodicTask, RestartPolicy, StartOutcome},
    readings::{ReadingSource, UniformReadings},
    state_box::{StateBox, Subscription},
    types::SensorSnapshot,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SensorOptions {
    pub period: Duration,
    /// Most-recent readings retained.
    pub window: usize,
    pub range: Range<f32>,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(2000),
            window: 20,
            range: 65.0..85.0,
        }
    }
}

type SharedSource = Arc<Mutex<Box<dyn ReadingSource>>>;

pub struct SensorController {
    state: StateBox<SensorSnapshot>,
    poller: PeriodicTask,
    options: SensorOptions,
    source: SharedSource,
    clock: Arc<dyn Clock>,
}

impl SensorController {
    pub fn new() -> Result<Self, ScreenError> {
        let options = SensorOptions::default();
        let source = UniformReadings::new(options.range.clone());
        Self::with_parts(options, source, Arc::new(SystemClock))
    }

    pub fn with_options(options: SensorOptions) -> Result<Self, ScreenError> {
        let source = UniformReadings::new(options.range.clone());
        Self::with_parts(options, source, Arc::new(SystemClock))
    }

    pub fn with_parts(
        options: SensorOptions,
        source: impl ReadingSource,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ScreenError> {
        let poller = PeriodicTask::new("sensor-poller", RestartPolicy::KeepRunning)?;
        info!(
            period_ms = options.period.as_millis() as u64,
            window = options.window,
            "sensor controller created"
        );

        let source: Box<dyn ReadingSource> = Box::new(source);
        let mut controller = Self {
            state: StateBox::new(SensorSnapshot::default()),
            poller,
            options,
            source: Arc::new(Mutex::new(source)),
            clock,
        };
        controller.start();
        Ok(controller)
    }

    pub fn snapshot(&self) -> Arc<SensorSnapshot> {
        self.state.read()
    }

    pub fn subscribe(&self) -> Subscription<SensorSnapshot> {
        self.state.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn start(&mut self) -> StartOutcome {
        let state = self.state.clone();
        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let window = self.options.window;

        let outcome = self.poller.start(self.options.period, move || {
            let value = source
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next_value();
            let reading = Reading {
                timestamp_ms: clock.now_ms(),
                value,
            };
            state.update(|s| s.with_reading(reading, window));
        });

        if outcome != StartOutcome::AlreadyRunning {
            self.state.update(|s| s.with_running(true));
        }
        outcome
    }

    pub fn pause(&mut self) -> Arc<SensorSnapshot> {
        self.poller.cancel();
        self.state.update(|s| s.with_running(false))
    }
}

#[cfg(test)]
#[path = "tests/sensor_tests.rs"]
mod tests;
