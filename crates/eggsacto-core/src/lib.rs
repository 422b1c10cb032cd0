//! # Eggsacto Core Library
//!
//! Core logic for a single-screen countdown timer: tap a preset, watch the
//! label and the ruler count down, get a flashing label and a sound at zero.
//! The `eggsacto` CLI is a thin terminal host over this library.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: stores an absolute end instant and recomputes the
//!   remaining time on every tick, so late ticks never cause drift
//! - **Scroll Sync**: converts remaining time to a ruler offset and a drag
//!   offset back to a requested duration, one direction at a time
//! - **Fanfare**: the looping opacity pulse and the completion cue
//! - **Timer Screen**: wires the above to inward commands and outward
//!   notifications
//!
//! Time and scheduling are injected ([`Clock`], [`TickScheduler`]), so the
//! whole screen runs deterministically under [`ManualClock`] and
//! [`ManualScheduler`].

pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod fanfare;
pub mod format;
pub mod preset;
pub mod scheduler;
pub mod screen;
pub mod scroll_sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use countdown::{CountdownEngine, CountdownState, Tick, DEFAULT_TICK_PERIOD};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use fanfare::{CompletionCue, Fanfare, PulseAnimation, SilentCue};
pub use format::{format_countdown, format_remaining, parse_clock, ZERO_LABEL};
pub use preset::Preset;
pub use scheduler::{IntervalScheduler, ManualScheduler, TickHandle, TickScheduler};
pub use screen::{ScreenObserver, ScreenSettings, TimerScreen};
pub use scroll_sync::ScrollSync;

use std::path::PathBuf;

/// Returns `~/.config/eggsacto[-dev]/` based on EGGSACTO_ENV.
///
/// Set EGGSACTO_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> error::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EGGSACTO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("eggsacto-dev")
    } else {
        base_dir.join("eggsacto")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
