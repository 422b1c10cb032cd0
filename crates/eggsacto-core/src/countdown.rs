//! Countdown engine.
//!
//! The engine stores an absolute end instant rather than a running
//! remainder, so every tick recomputes `end - now` from the injected clock.
//! A delayed or skipped tick therefore never makes the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Expired -> Running -> ...
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(SystemClock, IntervalScheduler::new(), DEFAULT_TICK_PERIOD);
//! engine.start(Duration::from_secs(120));
//! // On every scheduled tick:
//! match engine.tick() { ... }
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{remaining_until, Clock};
use crate::events::Event;
use crate::format::{format_countdown, ZERO_LABEL};
use crate::scheduler::{TickHandle, TickScheduler};

/// Refresh period used unless configured otherwise.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Expired,
}

/// Outcome of a single tick while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(Duration),
    /// Reported exactly once; ticking has already been cancelled.
    Expired,
}

/// Core countdown engine.
///
/// Owns its single scheduled tick handle. The handle exists exactly while
/// the engine is `Running`.
#[derive(Debug)]
pub struct CountdownEngine<C, S> {
    clock: C,
    scheduler: S,
    tick_period: Duration,
    state: CountdownState,
    end_instant: Option<DateTime<Utc>>,
    tick_handle: Option<TickHandle>,
}

impl<C: Clock, S: TickScheduler> CountdownEngine<C, S> {
    pub fn new(clock: C, scheduler: S, tick_period: Duration) -> Self {
        Self {
            clock,
            scheduler,
            tick_period,
            state: CountdownState::Idle,
            end_instant: None,
            tick_handle: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end_instant
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.tick_handle
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Time left, recomputed from now. `None` unless running.
    pub fn remaining(&self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.end_instant
            .map(|end| remaining_until(end, self.clock.now()))
    }

    /// Label for the current state: counting, or the fixed zero literal.
    pub fn label(&self) -> String {
        match self.remaining() {
            Some(r) => format_countdown(r),
            None => ZERO_LABEL.to_string(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Target `now + duration` and begin ticking.
    ///
    /// Re-enterable from any state. Any previous tick is cancelled before
    /// the new one is scheduled.
    pub fn start(&mut self, duration: Duration) -> Event {
        let now = self.clock.now();
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let end = now
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.cancel_tick();
        self.end_instant = Some(end);
        self.state = CountdownState::Running;
        self.tick_handle = Some(self.scheduler.schedule_repeating(self.tick_period));

        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(duration_ms, ends_at = %end, "countdown started");
        Event::TimerStarted {
            duration_ms,
            ends_at: end,
            at: now,
        }
    }

    /// Call on every scheduled tick.
    ///
    /// Returns `None` when not running, so a late tick after expiry or stop
    /// is harmless.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.is_running() {
            return None;
        }
        let end = self.end_instant?;
        let now = self.clock.now();
        if now >= end {
            self.cancel_tick();
            self.state = CountdownState::Expired;
            tracing::info!(ended_at = %end, observed_at = %now, "countdown expired");
            return Some(Tick::Expired);
        }
        Some(Tick::Remaining(remaining_until(end, now)))
    }

    /// Cancel ticking and forget the target. Safe to call repeatedly.
    pub fn stop(&mut self) -> Option<Event> {
        let had_tick = self.cancel_tick();
        self.end_instant = None;
        if self.state == CountdownState::Running {
            self.state = CountdownState::Idle;
        }
        if had_tick {
            tracing::debug!("countdown stopped");
            Some(Event::TimerStopped {
                at: self.clock.now(),
            })
        } else {
            None
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cancel_tick(&mut self) -> bool {
        match self.tick_handle.take() {
            Some(handle) => {
                self.scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::ManualScheduler;

    fn engine() -> (
        CountdownEngine<ManualClock, ManualScheduler>,
        ManualClock,
        ManualScheduler,
    ) {
        let clock = ManualClock::default();
        let sched = ManualScheduler::new();
        let engine = CountdownEngine::new(clock.clone(), sched.clone(), DEFAULT_TICK_PERIOD);
        (engine, clock, sched)
    }

    #[test]
    fn starts_idle_without_ticking() {
        let (mut engine, _, sched) = engine();
        assert_eq!(engine.state(), CountdownState::Idle);
        assert_eq!(engine.remaining(), None);
        assert_eq!(engine.tick(), None);
        assert_eq!(sched.live_count(), 0);
        assert_eq!(engine.label(), "0:00");
    }

    #[test]
    fn start_sets_absolute_end_and_schedules_tick() {
        let (mut engine, clock, sched) = engine();
        let ev = engine.start(Duration::from_secs(120));
        assert_eq!(engine.state(), CountdownState::Running);
        assert_eq!(
            engine.end_instant(),
            Some(clock.now() + TimeDelta::seconds(120))
        );
        assert_eq!(sched.live_count(), 1);
        assert_eq!(sched.log().scheduled[0].1, DEFAULT_TICK_PERIOD);
        assert!(matches!(ev, Event::TimerStarted { duration_ms: 120_000, .. }));
    }

    #[test]
    fn immediate_tick_reports_full_duration() {
        let (mut engine, _, _) = engine();
        engine.start(Duration::from_secs(60));
        assert_eq!(engine.tick(), Some(Tick::Remaining(Duration::from_secs(60))));
    }

    #[test]
    fn remaining_is_recomputed_across_skipped_ticks() {
        let (mut engine, clock, _) = engine();
        engine.start(Duration::from_secs(60));
        // Several periods pass with no tick at all.
        clock.advance(Duration::from_millis(7_300));
        assert_eq!(
            engine.tick(),
            Some(Tick::Remaining(Duration::from_millis(52_700)))
        );
        assert_eq!(engine.label(), "0:53");
    }

    #[test]
    fn expires_exactly_once() {
        let (mut engine, clock, sched) = engine();
        engine.start(Duration::from_secs(1));
        clock.advance(Duration::from_secs(1));
        assert_eq!(engine.tick(), Some(Tick::Expired));
        assert_eq!(engine.state(), CountdownState::Expired);
        assert_eq!(sched.live_count(), 0);

        clock.advance(Duration::from_secs(1));
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let (mut engine, _, _) = engine();
        engine.start(Duration::ZERO);
        assert_eq!(engine.tick(), Some(Tick::Expired));
    }

    #[test]
    fn restart_cancels_previous_tick_first() {
        let (mut engine, _, sched) = engine();
        engine.start(Duration::from_secs(60));
        let first = engine.tick_handle().unwrap();
        engine.start(Duration::from_secs(300));
        assert_eq!(sched.live_count(), 1);
        assert!(sched.log().cancelled.contains(&first));
        assert_ne!(engine.tick_handle(), Some(first));
    }

    #[test]
    fn restart_from_expired() {
        let (mut engine, clock, sched) = engine();
        engine.start(Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));
        engine.tick();
        engine.start(Duration::from_secs(5));
        assert_eq!(engine.state(), CountdownState::Running);
        assert_eq!(sched.live_count(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut engine, _, sched) = engine();
        assert!(engine.stop().is_none());
        engine.start(Duration::from_secs(60));
        assert!(engine.stop().is_some());
        assert!(engine.stop().is_none());
        assert_eq!(engine.state(), CountdownState::Idle);
        assert_eq!(sched.live_count(), 0);
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn stop_keeps_expired_state() {
        let (mut engine, clock, _) = engine();
        engine.start(Duration::from_secs(1));
        clock.advance(Duration::from_secs(1));
        engine.tick();
        engine.stop();
        assert_eq!(engine.state(), CountdownState::Expired);
    }
}
