//! Expiry fanfare: the flashing label and the completion cue.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Looping opacity pulse applied to the label after expiry.
///
/// Fades from fully opaque to `min_opacity` over one half cycle, then back,
/// forever. Each half cycle is eased in and out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseAnimation {
    pub min_opacity: f64,
    pub half_cycle: Duration,
}

impl Default for PulseAnimation {
    fn default() -> Self {
        Self {
            min_opacity: 0.1,
            half_cycle: Duration::from_millis(500),
        }
    }
}

impl PulseAnimation {
    /// Opacity `elapsed` after the pulse started.
    pub fn opacity_at(&self, elapsed: Duration) -> f64 {
        let half = self.half_cycle.as_secs_f64();
        if half <= 0.0 {
            return self.min_opacity;
        }
        let phase = elapsed.as_secs_f64() / half;
        let leg = phase.floor() as u64;
        let eased = ease_in_out(phase.fract());
        let span = 1.0 - self.min_opacity;
        if leg % 2 == 0 {
            1.0 - span * eased
        } else {
            self.min_opacity + span * eased
        }
    }
}

/// Smoothstep, close enough to the platform's ease-in-ease-out curve for a
/// blinking label.
fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Tracks whether the pulse is running on the label.
#[derive(Debug, Clone, Default)]
pub struct Fanfare {
    pulse: PulseAnimation,
    started_at: Option<DateTime<Utc>>,
}

impl Fanfare {
    pub fn new(pulse: PulseAnimation) -> Self {
        Self {
            pulse,
            started_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
    }

    /// Remove the pulse, as when a new countdown is started.
    pub fn clear(&mut self) {
        self.started_at = None;
    }

    /// Current label opacity; 1.0 when no pulse is running.
    pub fn opacity(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(start) => self
                .pulse
                .opacity_at((now - start).to_std().unwrap_or(Duration::ZERO)),
            None => 1.0,
        }
    }
}

/// Sound and haptic playback collaborator.
///
/// Implementations swallow their own failures: a missing asset must never
/// keep the screen from expiring.
pub trait CompletionCue {
    /// Play the completion sound (and haptics, if any). Called once per expiry.
    fn play(&mut self);

    /// Drop any acquired playback resources. Must be safe to call repeatedly.
    fn release(&mut self) {}
}

/// Cue that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl CompletionCue for SilentCue {
    fn play(&mut self) {
        tracing::debug!("completion cue (silent)");
    }
}

impl<Q: CompletionCue + ?Sized> CompletionCue for Box<Q> {
    fn play(&mut self) {
        (**self).play();
    }

    fn release(&mut self) {
        (**self).release();
    }
}
