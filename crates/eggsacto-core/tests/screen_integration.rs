//! Integration tests driving a whole timer screen on a manual clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use eggsacto_core::{
    Clock, CompletionCue, Config, CountdownState, Event, ManualClock, ManualScheduler, Preset,
    ScreenObserver, TimerScreen,
};

type Screen = TimerScreen<ManualClock, ManualScheduler, Cue>;

#[derive(Default)]
struct Display {
    label: String,
    offset: Option<f64>,
    offset_updates: usize,
    expired: usize,
    events: Vec<Event>,
}

impl ScreenObserver for Display {
    fn on_remaining_changed(&mut self, label: &str, offset_px: Option<f64>) {
        self.label = label.to_string();
        if let Some(o) = offset_px {
            self.offset = Some(o);
            self.offset_updates += 1;
        }
    }

    fn on_expired(&mut self) {
        self.expired += 1;
    }

    fn on_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

impl Display {
    fn last_remaining_ms(&self) -> Option<u64> {
        self.events.iter().rev().find_map(|e| match e {
            Event::RemainingChanged { remaining_ms, .. } => Some(*remaining_ms),
            _ => None,
        })
    }
}

#[derive(Clone, Default)]
struct Cue {
    plays: Rc<Cell<usize>>,
}

impl CompletionCue for Cue {
    fn play(&mut self) {
        self.plays.set(self.plays.get() + 1);
    }
}

fn setup() -> (Screen, ManualClock, ManualScheduler, Cue) {
    let clock = ManualClock::default();
    let sched = ManualScheduler::new();
    let cue = Cue::default();
    let screen = TimerScreen::new(
        clock.clone(),
        sched.clone(),
        cue.clone(),
        Config::default().screen_settings(),
    );
    (screen, clock, sched, cue)
}

/// Advance in tick-sized steps, ticking after each.
fn run_for(screen: &mut Screen, clock: &ManualClock, display: &mut Display, total: Duration) {
    let step = screen.engine().tick_period();
    let mut elapsed = Duration::ZERO;
    while elapsed + step <= total {
        clock.advance(step);
        elapsed += step;
        screen.tick(display);
    }
    if elapsed < total {
        clock.advance(total - elapsed);
        screen.tick(display);
    }
}

#[test]
fn two_minute_tap_counts_down_and_fires_once() {
    let (mut screen, clock, sched, cue) = setup();
    let mut display = Display::default();
    let t0 = clock.now();

    screen.tap(Preset::TwoMinutes, &mut display);
    assert_eq!(screen.engine().state(), CountdownState::Running);
    assert_eq!(
        screen.engine().end_instant(),
        Some(t0 + chrono::TimeDelta::seconds(120))
    );
    assert_eq!(display.label, "2:00");
    assert_eq!(display.offset, Some(80.0));

    run_for(&mut screen, &clock, &mut display, Duration::from_secs(119));
    assert_eq!(display.label, "0:01");

    run_for(&mut screen, &clock, &mut display, Duration::from_millis(800));
    // 0.2 s left: still counting, no fanfare yet.
    assert_eq!(screen.engine().state(), CountdownState::Running);
    assert_eq!(display.last_remaining_ms(), Some(200));
    assert_eq!(display.label, "0:01");
    assert_eq!(display.expired, 0);
    assert_eq!(cue.plays.get(), 0);
    assert!(!screen.fanfare().is_active());

    run_for(&mut screen, &clock, &mut display, Duration::from_millis(200));
    assert_eq!(display.label, "0:00");
    assert_eq!(display.expired, 1);
    assert_eq!(cue.plays.get(), 1);
    assert!(screen.fanfare().is_active());
    assert_eq!(sched.live_count(), 0);

    // Stray ticks after expiry change nothing.
    let events_before = display.events.len();
    run_for(&mut screen, &clock, &mut display, Duration::from_secs(5));
    assert_eq!(display.expired, 1);
    assert_eq!(cue.plays.get(), 1);
    assert_eq!(display.events.len(), events_before);
}

#[test]
fn oversized_duration_is_capped_at_ruler_maximum() {
    let (mut screen, clock, _, _) = setup();
    let mut display = Display::default();
    let t0 = clock.now();

    screen.set_duration(Duration::from_secs(u64::MAX), &mut display);
    assert_eq!(
        screen.engine().end_instant(),
        Some(t0 + chrono::TimeDelta::seconds(1200))
    );
    assert_eq!(display.label, "20:00");
    assert_eq!(display.last_remaining_ms(), Some(1_200_000));

    run_for(&mut screen, &clock, &mut display, Duration::from_millis(200));
    assert_eq!(display.label, "20:00");
    assert_eq!(display.last_remaining_ms(), Some(1_199_800));
}

#[test]
fn late_tick_still_expires_once() {
    let (mut screen, clock, _, cue) = setup();
    let mut display = Display::default();
    screen.tap(Preset::OneMinute, &mut display);

    // The host was suspended well past the end.
    clock.advance(Duration::from_secs(600));
    screen.tick(&mut display);
    screen.tick(&mut display);

    assert_eq!(display.label, "0:00");
    assert_eq!(display.expired, 1);
    assert_eq!(cue.plays.get(), 1);
}

#[test]
fn drag_retargets_and_suppresses_offset_until_release() {
    let (mut screen, clock, sched, _) = setup();
    let mut display = Display::default();
    screen.tap(Preset::TwelveMinutes, &mut display);
    let pushed = display.offset_updates;

    screen.drag_begin(&mut display);
    assert!(screen.drag_offset_changed(40.0, &mut display));
    assert_eq!(display.label, "1:00");
    assert!(!screen.drag_offset_changed(-30.0, &mut display));
    assert_eq!(display.label, "1:00");

    run_for(&mut screen, &clock, &mut display, Duration::from_secs(3));
    assert_eq!(display.offset_updates, pushed);
    assert_eq!(display.label, "0:57");

    // Flick: deceleration keeps going and keeps re-targeting.
    screen.drag_end(true, &mut display);
    assert!(screen.drag_offset_changed(2_000.0, &mut display));
    assert_eq!(display.label, "20:00");
    run_for(&mut screen, &clock, &mut display, Duration::from_secs(1));
    assert_eq!(display.offset_updates, pushed);

    screen.deceleration_end(&mut display);
    run_for(&mut screen, &clock, &mut display, Duration::from_secs(1));
    assert!(display.offset_updates > pushed);
    assert_eq!(display.label, "19:58");

    // Exactly one tick source survived all the restarts.
    assert_eq!(sched.live_count(), 1);
}

#[test]
fn retapping_during_fanfare_restarts_cleanly() {
    let (mut screen, clock, sched, cue) = setup();
    let mut display = Display::default();
    screen.tap(Preset::OneMinute, &mut display);
    run_for(&mut screen, &clock, &mut display, Duration::from_secs(60));
    assert_eq!(display.expired, 1);

    screen.tap(Preset::OneMinute, &mut display);
    assert!(!screen.fanfare().is_active());
    assert_eq!(sched.live_count(), 1);
    run_for(&mut screen, &clock, &mut display, Duration::from_secs(60));
    assert_eq!(display.expired, 2);
    assert_eq!(cue.plays.get(), 2);
}

#[test]
fn snapshot_reflects_screen_state() {
    let (mut screen, clock, _, _) = setup();
    let mut display = Display::default();
    screen.tap(Preset::FiveMinutes, &mut display);
    clock.advance(Duration::from_secs(10));
    screen.drag_begin(&mut display);

    match screen.snapshot() {
        Event::StateSnapshot {
            state,
            remaining_ms,
            label,
            dragging,
            pulsing,
            ..
        } => {
            assert_eq!(state, CountdownState::Running);
            assert_eq!(remaining_ms, Some(290_000));
            assert_eq!(label, "4:50");
            assert!(dragging);
            assert!(!pulsing);
        }
        other => panic!("Expected StateSnapshot, got {other:?}"),
    }
}
