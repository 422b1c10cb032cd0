use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The four fixed-duration buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    TwelveMinutes,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::OneMinute,
        Preset::TwoMinutes,
        Preset::FiveMinutes,
        Preset::TwelveMinutes,
    ];

    pub fn minutes(self) -> u64 {
        match self {
            Preset::OneMinute => 1,
            Preset::TwoMinutes => 2,
            Preset::FiveMinutes => 5,
            Preset::TwelveMinutes => 12,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(self.minutes() * 60)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    /// Accepts `1`, `1m`, `1min` and so on for each of 1, 2, 5 and 12.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed
            .strip_suffix("min")
            .or_else(|| trimmed.strip_suffix('m'))
            .unwrap_or(trimmed.as_str());
        Preset::ALL
            .into_iter()
            .find(|p| digits.parse::<u64>().ok() == Some(p.minutes()))
            .ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}
