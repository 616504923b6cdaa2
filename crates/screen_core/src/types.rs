use std::collections::VecDeque;

use serde::Serialize;
use shared::domain::{IntervalMs, LifeState, Reading};

use crate::{clock::Clock, event_log::EventLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub count: i64,
    pub auto_running: bool,
    pub interval_ms: IntervalMs,
}

impl Default for CounterSnapshot {
    fn default() -> Self {
        Self::with_interval(IntervalMs::DEFAULT)
    }
}

impl CounterSnapshot {
    pub fn with_interval(interval_ms: IntervalMs) -> Self {
        Self {
            count: 0,
            auto_running: false,
            interval_ms,
        }
    }

    pub fn incremented(&self) -> Self {
        Self {
            count: self.count.saturating_add(1),
            ..*self
        }
    }

    pub fn decremented(&self) -> Self {
        Self {
            count: self.count.saturating_sub(1),
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Oldest first.
    pub readings: VecDeque<Reading>,
    pub running: bool,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            readings: VecDeque::new(),
            running: true,
        }
    }
}

impl SensorSnapshot {
    pub fn with_reading(&self, reading: Reading, window: usize) -> Self {
        let window = window.max(1);
        let mut readings = self.readings.clone();
        readings.push_back(reading);
        while readings.len() > window {
            readings.pop_front();
        }
        Self {
            readings,
            running: true,
        }
    }

    pub fn with_running(&self, running: bool) -> Self {
        Self {
            readings: self.readings.clone(),
            running,
        }
    }

    pub fn current(&self) -> Option<f32> {
        self.readings.back().map(|r| r.value)
    }

    pub fn average(&self) -> Option<f32> {
        if self.readings.is_empty() {
            return None;
        }
        let sum: f64 = self.readings.iter().map(|r| f64::from(r.value)).sum();
        Some((sum / self.readings.len() as f64) as f32)
    }

    pub fn min(&self) -> Option<f32> {
        self.readings.iter().map(|r| r.value).reduce(f32::min)
    }

    pub fn max(&self) -> Option<f32> {
        self.readings.iter().map(|r| r.value).reduce(f32::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeSnapshot {
    pub current_state: LifeState,
    /// Newest first.
    pub events: EventLog,
    pub notify_enabled: bool,
}

impl Default for LifeSnapshot {
    fn default() -> Self {
        Self {
            current_state: LifeState::Created,
            events: EventLog::new(),
            notify_enabled: true,
        }
    }
}

impl LifeSnapshot {
    pub fn with_event(&self, label: &str, state: LifeState, clock: &dyn Clock) -> Self {
        let mut events = self.events.clone();
        events.append(label, state, clock);
        Self {
            current_state: state,
            events,
            notify_enabled: self.notify_enabled,
        }
    }

    pub fn with_notify_toggled(&self) -> Self {
        Self {
            notify_enabled: !self.notify_enabled,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransientNotice {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f32) -> Reading {
        Reading {
            timestamp_ms: 0,
            value,
        }
    }

    #[test]
    fn empty_window_has_no_statistics() {
        let snapshot = SensorSnapshot::default();
        assert_eq!(snapshot.current(), None);
        assert_eq!(snapshot.average(), None);
        assert_eq!(snapshot.min(), None);
        assert_eq!(snapshot.max(), None);
    }

    #[test]
    fn statistics_cover_the_window() {
        let snapshot = [70.0, 66.5, 80.0]
            .into_iter()
            .fold(SensorSnapshot::default(), |s, v| s.with_reading(reading(v), 20));

        assert_eq!(snapshot.current(), Some(80.0));
        assert_eq!(snapshot.min(), Some(66.5));
        assert_eq!(snapshot.max(), Some(80.0));
        let average = snapshot.average().expect("average");
        assert!((average - 72.166_664).abs() < 1e-4);
    }

    #[test]
    fn window_evicts_oldest() {
        let snapshot = (0..5)
            .map(|v| v as f32)
            .fold(SensorSnapshot::default(), |s, v| s.with_reading(reading(v), 3));
        let values: Vec<f32> = snapshot.readings.iter().map(|r| r.value).collect();
        assert_eq!(values, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn counter_steps_keep_other_fields() {
        let snapshot = CounterSnapshot {
            count: 4,
            auto_running: true,
            interval_ms: IntervalMs::DEFAULT,
        };
        assert_eq!(snapshot.incremented().count, 5);
        assert_eq!(snapshot.decremented().count, 3);
        assert!(snapshot.incremented().auto_running);
    }

    #[test]
    fn notify_toggle_keeps_events() {
        let clock = crate::clock::FixedClock::new(0);
        let snapshot = LifeSnapshot::default().with_event("onCreate", LifeState::Created, &clock);
        let toggled = snapshot.with_notify_toggled();
        assert!(!toggled.notify_enabled);
        assert_eq!(toggled.events, snapshot.events);
    }
}
