//! The single timer screen.
//!
//! Wires the countdown engine, the ruler and the fanfare together behind the
//! inward commands (preset taps, `set_duration`, drag callbacks, ticks) and
//! reports outward through a [`ScreenObserver`]. Every call runs to
//! completion on the caller's event loop; nothing here is shared.

use std::time::Duration;

use crate::clock::Clock;
use crate::countdown::{CountdownEngine, CountdownState, Tick, DEFAULT_TICK_PERIOD};
use crate::events::Event;
use crate::fanfare::{CompletionCue, Fanfare, PulseAnimation};
use crate::format::{format_countdown, ZERO_LABEL};
use crate::preset::Preset;
use crate::scheduler::TickScheduler;
use crate::scroll_sync::{ScrollSync, DEFAULT_MAX_DURATION, DEFAULT_PIXELS_PER_SECOND};

/// Outward notifications.
pub trait ScreenObserver {
    /// New label text and, unless the user is dragging, the ruler offset.
    fn on_remaining_changed(&mut self, label: &str, offset_px: Option<f64>);

    /// The countdown hit zero. Fired once per countdown.
    fn on_expired(&mut self);

    /// Every event the screen produces, for logging or JSON output.
    fn on_event(&mut self, _event: &Event) {}
}

/// Tunables for one screen, normally built from [`crate::Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub tick_period: Duration,
    pub pixels_per_second: f64,
    pub max_duration: Duration,
    pub pulse: PulseAnimation,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            max_duration: DEFAULT_MAX_DURATION,
            pulse: PulseAnimation::default(),
        }
    }
}

pub struct TimerScreen<C, S, Q>
where
    C: Clock,
    S: TickScheduler,
    Q: CompletionCue,
{
    engine: CountdownEngine<C, S>,
    ruler: ScrollSync,
    fanfare: Fanfare,
    cue: Q,
    offset_px: f64,
}

impl<C, S, Q> TimerScreen<C, S, Q>
where
    C: Clock,
    S: TickScheduler,
    Q: CompletionCue,
{
    pub fn new(clock: C, scheduler: S, cue: Q, settings: ScreenSettings) -> Self {
        Self {
            engine: CountdownEngine::new(clock, scheduler, settings.tick_period),
            ruler: ScrollSync::new(settings.pixels_per_second, settings.max_duration),
            fanfare: Fanfare::new(settings.pulse),
            cue,
            offset_px: 0.0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &CountdownEngine<C, S> {
        &self.engine
    }

    pub fn ruler(&self) -> &ScrollSync {
        &self.ruler
    }

    pub fn fanfare(&self) -> &Fanfare {
        &self.fanfare
    }

    pub fn cue(&self) -> &Q {
        &self.cue
    }

    /// Last ruler position, whether pushed by the countdown or set by a drag.
    pub fn offset_px(&self) -> f64 {
        self.offset_px
    }

    pub fn label(&self) -> String {
        self.engine.label()
    }

    /// Current label opacity, animated after expiry.
    pub fn label_opacity(&self) -> f64 {
        self.fanfare.opacity(self.engine.now())
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.engine.state(),
            remaining_ms: self.engine.remaining().map(millis),
            label: self.engine.label(),
            dragging: self.ruler.is_dragging(),
            pulsing: self.fanfare.is_active(),
            at: self.engine.now(),
        }
    }

    // ── Inward commands ──────────────────────────────────────────────

    pub fn tap(&mut self, preset: Preset, observer: &mut dyn ScreenObserver) {
        tracing::debug!(%preset, "preset tapped");
        self.set_duration(preset.duration(), observer);
    }

    /// (Re)start the countdown for `duration` and render it right away.
    ///
    /// Durations past the end of the ruler are capped to its maximum.
    pub fn set_duration(&mut self, duration: Duration, observer: &mut dyn ScreenObserver) {
        let max = self.ruler.max_duration();
        let duration = if duration > max {
            tracing::warn!(
                requested_secs = duration.as_secs(),
                max_secs = max.as_secs(),
                "duration capped at ruler maximum"
            );
            max
        } else {
            duration
        };
        self.fanfare.clear();
        let started = self.engine.start(duration);
        observer.on_event(&started);
        self.render(duration, observer);
    }

    pub fn drag_begin(&mut self, observer: &mut dyn ScreenObserver) {
        self.ruler.drag_begin();
        observer.on_event(&Event::DragStarted {
            at: self.engine.now(),
        });
    }

    /// The ruler moved under the user's finger (or while decelerating).
    ///
    /// Returns true if the move re-targeted the countdown.
    pub fn drag_offset_changed(
        &mut self,
        offset_px: f64,
        observer: &mut dyn ScreenObserver,
    ) -> bool {
        if self.ruler.is_dragging() && offset_px.is_finite() {
            self.offset_px = offset_px;
        }
        match self.ruler.dragged(offset_px) {
            Some(duration) => {
                self.set_duration(duration, observer);
                true
            }
            None => false,
        }
    }

    pub fn drag_end(&mut self, will_decelerate: bool, observer: &mut dyn ScreenObserver) {
        if self.ruler.drag_end(will_decelerate) {
            self.drag_cleared(observer);
        }
    }

    pub fn deceleration_end(&mut self, observer: &mut dyn ScreenObserver) {
        if self.ruler.deceleration_end() {
            self.drag_cleared(observer);
        }
    }

    /// Scheduled tick. A tick while not running does nothing.
    pub fn tick(&mut self, observer: &mut dyn ScreenObserver) {
        match self.engine.tick() {
            Some(Tick::Remaining(remaining)) => self.render(remaining, observer),
            Some(Tick::Expired) => self.expire(observer),
            None => {}
        }
    }

    /// Stop ticking and release playback resources.
    pub fn teardown(mut self) {
        self.shutdown();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn render(&mut self, remaining: Duration, observer: &mut dyn ScreenObserver) {
        let label = format_countdown(remaining);
        let offset = self.push_offset(self.ruler.offset_for_remaining(remaining));
        observer.on_remaining_changed(&label, offset);
        observer.on_event(&Event::RemainingChanged {
            label,
            remaining_ms: millis(remaining),
            offset_px: offset,
            at: self.engine.now(),
        });
    }

    fn expire(&mut self, observer: &mut dyn ScreenObserver) {
        debug_assert_eq!(self.engine.state(), CountdownState::Expired);
        let now = self.engine.now();
        let offset = self.push_offset(0.0);
        observer.on_remaining_changed(ZERO_LABEL, offset);
        observer.on_event(&Event::RemainingChanged {
            label: ZERO_LABEL.to_string(),
            remaining_ms: 0,
            offset_px: offset,
            at: now,
        });

        self.fanfare.start(now);
        self.cue.play();
        observer.on_expired();
        observer.on_event(&Event::TimerExpired { at: now });
    }

    fn push_offset(&mut self, offset_px: f64) -> Option<f64> {
        if !self.ruler.should_push_offset() {
            return None;
        }
        self.offset_px = offset_px;
        Some(offset_px)
    }

    fn drag_cleared(&mut self, observer: &mut dyn ScreenObserver) {
        observer.on_event(&Event::DragEnded {
            at: self.engine.now(),
        });
    }

    fn shutdown(&mut self) {
        self.engine.stop();
        self.cue.release();
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<C, S, Q> Drop for TimerScreen<C, S, Q>
where
    C: Clock,
    S: TickScheduler,
    Q: CompletionCue,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
