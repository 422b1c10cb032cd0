//! Terminal rendering of the timer screen.

use std::io::Write;

use eggsacto_core::{Event, ScreenObserver};

const RULER_WIDTH: usize = 40;

pub struct TerminalDisplay {
    json: bool,
    max_offset_px: f64,
    label: String,
    offset_px: f64,
    opacity: f64,
    expired: bool,
}

impl TerminalDisplay {
    pub fn new(json: bool, max_offset_px: f64) -> Self {
        Self {
            json,
            max_offset_px,
            label: String::new(),
            offset_px: 0.0,
            opacity: 1.0,
            expired: false,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Set once the countdown expires; cleared by [`TerminalDisplay::take_expired`].
    pub fn take_expired(&mut self) -> bool {
        std::mem::replace(&mut self.expired, false)
    }

    /// Redraw with a new label opacity while the fanfare pulses.
    pub fn render_pulse(&mut self, opacity: f64) {
        // Terminals only have normal and dim; quantise.
        let dim = opacity < 0.5;
        if dim != (self.opacity < 0.5) {
            self.opacity = opacity;
            self.redraw();
        }
    }

    pub fn reset_pulse(&mut self) {
        self.opacity = 1.0;
    }

    /// Print a line without clobbering the in-place status line.
    pub fn message(&self, text: &str) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("\r\x1b[2K{text}");
            self.redraw();
        }
    }

    fn ruler_bar(&self) -> String {
        let fraction = if self.max_offset_px > 0.0 {
            (self.offset_px / self.max_offset_px).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (fraction * RULER_WIDTH as f64).round() as usize;
        format!("[{}{}]", "=".repeat(filled), " ".repeat(RULER_WIDTH - filled))
    }

    fn redraw(&self) {
        if self.json || self.label.is_empty() {
            return;
        }
        let style = if self.opacity < 0.5 { "\x1b[2m" } else { "\x1b[1m" };
        print!(
            "\r\x1b[2K{style}{:>5}\x1b[0m  {} {:>6.1}px",
            self.label,
            self.ruler_bar(),
            self.offset_px
        );
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!(error = %e, "failed to flush terminal");
        }
    }
}

impl ScreenObserver for TerminalDisplay {
    fn on_remaining_changed(&mut self, label: &str, offset_px: Option<f64>) {
        let moved = match offset_px {
            Some(o) if (o - self.offset_px).abs() >= 0.05 => {
                self.offset_px = o;
                true
            }
            _ => false,
        };
        if label != self.label || moved {
            self.label = label.to_string();
            self.redraw();
        }
    }

    fn on_expired(&mut self) {
        self.expired = true;
    }

    fn on_event(&mut self, event: &Event) {
        if let Event::TimerStarted { .. } = event {
            self.reset_pulse();
        }
        if !self.json {
            return;
        }
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
    }
}
