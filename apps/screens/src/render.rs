//! Plain-text rendering of snapshots; the only presentation concern here.

use chrono::{Local, TimeZone};
use screen_core::{CounterSnapshot, LifeSnapshot, SensorSnapshot};
use shared::domain::LifeEvent;

const ABSENT: &str = "—";

fn clock_time(timestamp_ms: i64, pattern: &str) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format(pattern).to_string(),
        None => timestamp_ms.to_string(),
    }
}

fn stat(value: Option<f32>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{v:.1}"))
}

pub fn counter_line(snapshot: &CounterSnapshot) -> String {
    format!(
        "count={} auto={} interval={}",
        snapshot.count,
        if snapshot.auto_running { "ON" } else { "OFF" },
        snapshot.interval_ms
    )
}

pub fn sensor_line(snapshot: &SensorSnapshot) -> String {
    let latest = snapshot
        .readings
        .back()
        .map(|r| format!("{:.1} °F @ {}", r.value, clock_time(r.timestamp_ms, "%H:%M:%S")))
        .unwrap_or_else(|| ABSENT.to_string());

    format!(
        "[{}] n={} current={} avg={} min={} max={} latest={latest}",
        if snapshot.running { "running" } else { "paused" },
        snapshot.readings.len(),
        stat(snapshot.current()),
        stat(snapshot.average()),
        stat(snapshot.min()),
        stat(snapshot.max()),
    )
}

pub fn life_event_line(event: &LifeEvent) -> String {
    format!(
        "{} • {} (#{:08X})",
        clock_time(event.timestamp_ms, "%H:%M:%S%.3f"),
        event.label,
        event.color.argb()
    )
}

pub fn life_lines(snapshot: &LifeSnapshot) -> Vec<String> {
    let mut lines = vec![format!(
        "state={} events={} notify={}",
        snapshot.current_state,
        snapshot.events.len(),
        if snapshot.notify_enabled { "on" } else { "off" }
    )];
    lines.extend(snapshot.events.iter().map(|e| format!("  {}", life_event_line(e))));
    lines
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use shared::domain::{IntervalMs, Reading};

    use super::*;

    #[test]
    fn counter_line_shows_mode_and_interval() {
        let snapshot = CounterSnapshot {
            count: 7,
            auto_running: true,
            interval_ms: IntervalMs::DEFAULT,
        };
        assert_eq!(counter_line(&snapshot), "count=7 auto=ON interval=3000ms");
    }

    #[test]
    fn empty_sensor_shows_absent_stats() {
        let line = sensor_line(&SensorSnapshot::default());
        assert!(line.starts_with("[running] n=0 current=— avg=— min=— max=—"));
    }

    #[test]
    fn sensor_stats_use_one_decimal() {
        let snapshot = SensorSnapshot {
            readings: VecDeque::from([
                Reading {
                    timestamp_ms: 0,
                    value: 70.0,
                },
                Reading {
                    timestamp_ms: 0,
                    value: 80.44,
                },
            ]),
            running: false,
        };
        let line = sensor_line(&snapshot);
        assert!(line.contains("current=80.4 avg=75.2 min=70.0 max=80.4"), "{line}");
        assert!(line.starts_with("[paused]"));
    }
}
