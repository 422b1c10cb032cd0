//! Interactive timer screen on a single-threaded event loop.
//!
//! Stdin lines stand in for the screen's buttons and ruler gestures:
//!
//! ```text
//! 1 | 2 | 5 | 12      tap a preset
//! drag <px>           move the ruler (begins a drag if needed)
//! release [flick]     lift the finger; "flick" keeps the drag until `settle`
//! settle              deceleration finished
//! status              print a JSON snapshot
//! quit                tear down and exit
//! ```

use std::time::Duration;

use clap::Args;
use eggsacto_core::{
    parse_clock, Config, IntervalScheduler, Preset, SystemClock, TickHandle, TimerScreen,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};

use crate::cue::TerminalCue;
use crate::display::TerminalDisplay;

type Screen = TimerScreen<SystemClock, IntervalScheduler, TerminalCue>;

/// Label redraw rate while the fanfare pulses.
const PULSE_FRAME: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct RunArgs {
    /// Start immediately with a preset (1, 2, 5 or 12 minutes)
    #[arg(long, conflicts_with_all = ["duration", "seconds"])]
    pub preset: Option<Preset>,
    /// Start immediately with an m:ss duration
    #[arg(long, value_parser = parse_duration_arg, conflicts_with = "seconds")]
    pub duration: Option<Duration>,
    /// Start immediately with a duration in seconds
    #[arg(long)]
    pub seconds: Option<u64>,
    /// Emit events as JSON lines instead of drawing the screen
    #[arg(long)]
    pub json: bool,
    /// Exit once the countdown expires
    #[arg(long)]
    pub exit_on_expiry: bool,
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_clock(s).map_err(|e| e.to_string())
}

impl RunArgs {
    fn initial_duration(&self) -> Option<Duration> {
        self.preset
            .map(Preset::duration)
            .or(self.duration)
            .or(self.seconds.map(Duration::from_secs))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(args, config))
}

async fn event_loop(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.screen_settings();
    let mut screen: Screen = TimerScreen::new(
        SystemClock,
        IntervalScheduler::new(),
        TerminalCue::from_config(&config),
        settings,
    );
    let mut display = TerminalDisplay::new(args.json, screen.ruler().max_offset());

    if let Some(duration) = args.initial_duration() {
        screen.set_duration(duration, &mut display);
    } else if !args.json {
        display.message("tap 1, 2, 5 or 12 (minutes), or drag <px>; quit to exit");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker: Option<(TickHandle, Interval)> = None;
    let mut pulse = interval(PULSE_FRAME);
    pulse.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        sync_ticker(&screen, &mut ticker);

        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if handle_line(line.trim(), &mut screen, &mut display)? == Flow::Quit {
                        break;
                    }
                }
                None => stdin_open = false,
            },
            _ = next_tick(&mut ticker) => screen.tick(&mut display),
            _ = pulse.tick(), if screen.fanfare().is_active() && !display.is_json() => {
                display.render_pulse(screen.label_opacity());
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        if display.take_expired() && args.exit_on_expiry {
            break;
        }
        // Piped input ran out; let a running countdown finish first.
        if !stdin_open && !screen.engine().is_running() {
            break;
        }
    }

    screen.teardown();
    if !args.json {
        println!();
    }
    Ok(())
}

/// Keep the interval in step with the engine's single scheduled tick.
fn sync_ticker(screen: &Screen, ticker: &mut Option<(TickHandle, Interval)>) {
    let scheduler = screen.engine().scheduler();
    let wanted = scheduler.active_handle().zip(scheduler.active_period());
    match (wanted, ticker.as_ref()) {
        (Some((handle, _)), Some((current, _))) if handle == *current => {}
        (Some((handle, period)), _) => {
            let mut iv = interval_at(Instant::now() + period, period);
            iv.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *ticker = Some((handle, iv));
        }
        (None, _) => *ticker = None,
    }
}

async fn next_tick(ticker: &mut Option<(TickHandle, Interval)>) {
    match ticker {
        Some((_, iv)) => {
            iv.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn handle_line(
    line: &str,
    screen: &mut Screen,
    display: &mut TerminalDisplay,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };

    match command {
        "q" | "quit" | "exit" => return Ok(Flow::Quit),
        "drag" => {
            let Some(px) = words.next().and_then(|w| w.parse::<f64>().ok()) else {
                display.message("usage: drag <pixels>");
                return Ok(Flow::Continue);
            };
            if !screen.ruler().is_dragging() {
                screen.drag_begin(display);
            }
            screen.drag_offset_changed(px, display);
        }
        "release" => {
            let flick = words.next() == Some("flick");
            screen.drag_end(flick, display);
        }
        "settle" => screen.deceleration_end(display),
        "status" => {
            let snapshot = serde_json::to_string(&screen.snapshot())?;
            display.message(&snapshot);
        }
        other => match other.parse::<Preset>() {
            Ok(preset) => screen.tap(preset, display),
            Err(e) => display.message(&format!("{e}")),
        },
    }
    Ok(Flow::Continue)
}
