use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use screen_core::SensorOptions;
use serde::Deserialize;
use shared::domain::IntervalMs;

pub const DEFAULT_CONFIG_PATH: &str = "screens.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub counter_interval_ms: i64,
    pub sensor_period_ms: u64,
    pub sensor_window: usize,
    pub sensor_min: f32,
    pub sensor_max: f32,
    pub notify_on_transition: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            counter_interval_ms: 3000,
            sensor_period_ms: 2000,
            sensor_window: 20,
            sensor_min: 65.0,
            sensor_max: 85.0,
            notify_on_transition: true,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    counter_interval_ms: Option<i64>,
    sensor_period_ms: Option<u64>,
    sensor_window: Option<usize>,
    sensor_min: Option<f32>,
    sensor_max: Option<f32>,
    notify_on_transition: Option<bool>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn counter_interval(&self) -> anyhow::Result<IntervalMs> {
        IntervalMs::new(self.counter_interval_ms).context("counter_interval_ms")
    }

    pub fn sensor_options(&self) -> SensorOptions {
        SensorOptions {
            period: Duration::from_millis(self.sensor_period_ms),
            window: self.sensor_window,
            range: self.sensor_min..self.sensor_max,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.counter_interval()?;
        if self.sensor_period_ms == 0 {
            bail!("sensor_period_ms must be at least 1");
        }
        if self.sensor_window == 0 {
            bail!("sensor_window must be at least 1");
        }
        if !(self.sensor_min < self.sensor_max) {
            bail!(
                "sensor range is empty: min {} must be below max {}",
                self.sensor_min,
                self.sensor_max
            );
        }
        if !(self.sensor_max - self.sensor_min).is_finite() {
            bail!(
                "sensor range {}..{} is too wide",
                self.sensor_min,
                self.sensor_max
            );
        }
        Ok(())
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.counter_interval_ms {
            self.counter_interval_ms = v;
        }
        if let Some(v) = file.sensor_period_ms {
            self.sensor_period_ms = v;
        }
        if let Some(v) = file.sensor_window {
            self.sensor_window = v;
        }
        if let Some(v) = file.sensor_min {
            self.sensor_min = v;
        }
        if let Some(v) = file.sensor_max {
            self.sensor_max = v;
        }
        if let Some(v) = file.notify_on_transition {
            self.notify_on_transition = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("APP__COUNTER_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.counter_interval_ms = v;
        }
        if let Some(v) = env("APP__SENSOR_PERIOD_MS").and_then(|v| v.parse().ok()) {
            self.sensor_period_ms = v;
        }
        if let Some(v) = env("APP__SENSOR_WINDOW").and_then(|v| v.parse().ok()) {
            self.sensor_window = v;
        }
        if let Some(v) = env("APP__NOTIFY_ON_TRANSITION").and_then(|v| v.parse().ok()) {
            self.notify_on_transition = v;
        }
        if let Some(v) = env("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

/// Defaults, then `path` (when it exists), then `APP__*` environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        settings.apply_file(file);
    }

    settings.apply_env(env);
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
