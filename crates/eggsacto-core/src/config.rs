//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Tick (label refresh) period
//! - Ruler scale and length
//! - Expiry pulse shape
//! - Completion sound and haptic sequence
//!
//! Configuration is stored at `~/.config/eggsacto/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, CoreError, Result};
use crate::fanfare::PulseAnimation;
use crate::screen::ScreenSettings;

/// Countdown refresh configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Ruler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulerConfig {
    #[serde(default = "default_pixels_per_second")]
    pub pixels_per_second: f64,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

/// Expiry pulse configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanfareConfig {
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    #[serde(default = "default_half_cycle_ms")]
    pub half_cycle_ms: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Path to a custom completion sound (optional).
    /// The terminal bell is used when unset or unreadable.
    #[serde(default)]
    pub sound_path: Option<String>,
    /// Number of haptic pulses after the sound. 0 disables them.
    #[serde(default)]
    pub haptic_repeats: u32,
    #[serde(default = "default_haptic_interval_ms")]
    pub haptic_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/eggsacto/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ruler: RulerConfig,
    #[serde(default)]
    pub fanfare: FanfareConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    200
}
fn default_pixels_per_second() -> f64 {
    crate::scroll_sync::DEFAULT_PIXELS_PER_SECOND
}
fn default_max_duration_secs() -> u64 {
    crate::scroll_sync::DEFAULT_MAX_DURATION.as_secs()
}
fn default_min_opacity() -> f64 {
    0.1
}
fn default_half_cycle_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}
fn default_haptic_interval_ms() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: default_pixels_per_second(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

impl Default for FanfareConfig {
    fn default() -> Self {
        Self {
            min_opacity: default_min_opacity(),
            half_cycle_ms: default_half_cycle_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            sound_path: None,
            haptic_repeats: 0,
            haptic_interval_ms: default_haptic_interval_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                // Optional fields serialize as null; "none" clears them.
                serde_json::Value::Null | serde_json::Value::String(_) => {
                    if value.eq_ignore_ascii_case("none") {
                        serde_json::Value::Null
                    } else {
                        serde_json::Value::String(value.into())
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    /// Default location, under [`crate::data_dir`].
    pub fn path() -> Result<PathBuf> {
        Ok(crate::data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. The result is validated before
    /// it replaces `self`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// [`Config::apply`] then [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Reject values the screen cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bad = |key: &str, message: &str| -> CoreError {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            }
            .into()
        };

        if self.timer.tick_interval_ms == 0 {
            return Err(bad("timer.tick_interval_ms", "must be at least 1"));
        }
        if !(self.ruler.pixels_per_second.is_finite() && self.ruler.pixels_per_second > 0.0) {
            return Err(bad("ruler.pixels_per_second", "must be a positive number"));
        }
        if self.ruler.max_duration_secs == 0 {
            return Err(bad("ruler.max_duration_secs", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.fanfare.min_opacity) {
            return Err(bad("fanfare.min_opacity", "must be between 0 and 1"));
        }
        if self.fanfare.half_cycle_ms == 0 {
            return Err(bad("fanfare.half_cycle_ms", "must be at least 1"));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms)
    }

    pub fn haptic_interval(&self) -> Duration {
        Duration::from_millis(self.notifications.haptic_interval_ms)
    }

    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            tick_period: self.tick_period(),
            pixels_per_second: self.ruler.pixels_per_second,
            max_duration: Duration::from_secs(self.ruler.max_duration_secs),
            pulse: PulseAnimation {
                min_opacity: self.fanfare.min_opacity,
                half_cycle: Duration::from_millis(self.fanfare.half_cycle_ms),
            },
        }
    }
}
