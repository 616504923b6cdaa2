use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeState {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl LifeState {
    pub const ALL: [LifeState; 6] = [
        LifeState::Created,
        LifeState::Started,
        LifeState::Resumed,
        LifeState::Paused,
        LifeState::Stopped,
        LifeState::Destroyed,
    ];

    /// Display tag for an event logged in this state. Must stay exhaustive:
    /// a new state without a tag is a compile error, not a fallback color.
    pub const fn color_tag(self) -> ColorTag {
        match self {
            LifeState::Created => ColorTag::Green,
            LifeState::Started => ColorTag::Blue,
            LifeState::Resumed => ColorTag::Purple,
            LifeState::Paused => ColorTag::Amber,
            LifeState::Stopped => ColorTag::DeepOrange,
            LifeState::Destroyed => ColorTag::Grey,
        }
    }
}

impl fmt::Display for LifeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    Green,
    Blue,
    Purple,
    Amber,
    DeepOrange,
    Grey,
}

impl ColorTag {
    pub const fn argb(self) -> u32 {
        match self {
            ColorTag::Green => 0xFF4C_AF50,
            ColorTag::Blue => 0xFF21_96F3,
            ColorTag::Purple => 0xFF9C_27B0,
            ColorTag::Amber => 0xFFFF_C107,
            ColorTag::DeepOrange => 0xFFFF_5722,
            ColorTag::Grey => 0xFF9E_9E9E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleSignal {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
    /// Host catch-all; carries no transition.
    Any,
}

impl LifecycleSignal {
    pub const fn transition(self) -> Option<(&'static str, LifeState)> {
        match self {
            LifecycleSignal::Create => Some(("onCreate", LifeState::Created)),
            LifecycleSignal::Start => Some(("onStart", LifeState::Started)),
            LifecycleSignal::Resume => Some(("onResume", LifeState::Resumed)),
            LifecycleSignal::Pause => Some(("onPause", LifeState::Paused)),
            LifecycleSignal::Stop => Some(("onStop", LifeState::Stopped)),
            LifecycleSignal::Destroy => Some(("onDestroy", LifeState::Destroyed)),
            LifecycleSignal::Any => None,
        }
    }
}

impl FromStr for LifecycleSignal {
    type Err = ScreenError;

    /// Accepts `create`, `on_create`, `onCreate` and `ON_CREATE` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let name = normalized.strip_prefix("on").unwrap_or(&normalized);

        match name {
            "create" => Ok(LifecycleSignal::Create),
            "start" => Ok(LifecycleSignal::Start),
            "resume" => Ok(LifecycleSignal::Resume),
            "pause" => Ok(LifecycleSignal::Pause),
            "stop" => Ok(LifecycleSignal::Stop),
            "destroy" => Ok(LifecycleSignal::Destroy),
            "any" => Ok(LifecycleSignal::Any),
            _ => Err(ScreenError::UnrecognizedSignal {
                name: s.trim().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp_ms: i64,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub label: String,
    pub timestamp_ms: i64,
    pub color: ColorTag,
}

/// Auto-increment cadence; never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct IntervalMs(u64);

impl IntervalMs {
    pub const DEFAULT: IntervalMs = IntervalMs(3000);

    pub fn new(ms: i64) -> Result<Self, ScreenError> {
        match u64::try_from(ms) {
            Ok(ms) if ms >= 1 => Ok(Self(ms)),
            _ => Err(ScreenError::InvalidInterval {
                raw: ms.to_string(),
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ScreenError> {
        let trimmed = text.trim();
        let ms = trimmed
            .parse::<i64>()
            .map_err(|_| ScreenError::InvalidInterval {
                raw: trimmed.to_string(),
            })?;
        Self::new(ms)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for IntervalMs {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for IntervalMs {
    type Error = ScreenError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IntervalMs> for u64 {
    fn from(value: IntervalMs) -> Self {
        value.0
    }
}

impl fmt::Display for IntervalMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_state_has_a_distinct_color() {
        let tags: HashSet<ColorTag> = LifeState::ALL.iter().map(|s| s.color_tag()).collect();
        assert_eq!(tags.len(), LifeState::ALL.len());
    }

    #[test]
    fn color_tags_keep_argb_values() {
        assert_eq!(LifeState::Created.color_tag().argb(), 0xFF4CAF50);
        assert_eq!(LifeState::Destroyed.color_tag().argb(), 0xFF9E9E9E);
    }

    #[test]
    fn signals_map_to_labels_and_states() {
        assert_eq!(
            LifecycleSignal::Resume.transition(),
            Some(("onResume", LifeState::Resumed))
        );
        assert_eq!(LifecycleSignal::Any.transition(), None);
    }

    #[test]
    fn parses_signal_spellings() {
        assert_eq!("onCreate".parse::<LifecycleSignal>().ok(), Some(LifecycleSignal::Create));
        assert_eq!("ON_STOP".parse::<LifecycleSignal>().ok(), Some(LifecycleSignal::Stop));
        assert_eq!(" pause ".parse::<LifecycleSignal>().ok(), Some(LifecycleSignal::Pause));
        assert!(matches!(
            "onRestart".parse::<LifecycleSignal>(),
            Err(ScreenError::UnrecognizedSignal { name }) if name == "onRestart"
        ));
    }

    #[test]
    fn rejects_non_positive_intervals() {
        assert!(IntervalMs::new(0).is_err());
        assert!(IntervalMs::new(-5).is_err());
        assert_eq!(IntervalMs::new(1).map(IntervalMs::get).ok(), Some(1));
    }

    #[test]
    fn parses_interval_text() {
        assert_eq!(IntervalMs::parse(" 250 ").map(IntervalMs::get).ok(), Some(250));
        assert!(matches!(
            IntervalMs::parse("fast"),
            Err(ScreenError::InvalidInterval { raw }) if raw == "fast"
        ));
    }

    #[test]
    fn interval_deserialization_validates() {
        assert!(serde_json::from_str::<IntervalMs>("0").is_err());
        let interval: IntervalMs = serde_json::from_str("125").expect("valid interval");
        assert_eq!(interval.as_duration(), Duration::from_millis(125));
        assert_eq!(serde_json::to_string(&interval).expect("serialize"), "125");
    }
}
