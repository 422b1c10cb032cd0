//! One-shot conversions between seconds, labels and ruler offsets.

use eggsacto_core::{format_remaining, Config, ScrollSync};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct Conversion {
    seconds: f64,
    label: String,
    offset_px: f64,
}

fn ruler(config: &Config) -> ScrollSync {
    let settings = config.screen_settings();
    ScrollSync::new(settings.pixels_per_second, settings.max_duration)
}

fn print(conv: &Conversion, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(conv)?);
    } else {
        println!("{}\t{}\t{:.1}px", conv.label, conv.seconds, conv.offset_px);
    }
    Ok(())
}

/// `eggsacto format <seconds>`
pub fn format(seconds: f64) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_remaining(seconds));
    Ok(())
}

/// `eggsacto offset <seconds>`
pub fn offset(seconds: f64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !(seconds.is_finite() && seconds >= 0.0) {
        return Err(format!("seconds must be a non-negative number, got {seconds}").into());
    }
    let remaining = Duration::try_from_secs_f64(seconds)
        .map_err(|e| format!("seconds out of range, got {seconds}: {e}"))?;
    let ruler = ruler(&Config::load_or_default());
    let offset_px = ruler.offset_for_remaining(remaining);
    print(
        &Conversion {
            seconds,
            label: format_remaining(seconds),
            offset_px,
        },
        json,
    )
}

/// `eggsacto drag <pixels>`: what a drag to this offset would request.
/// Prints nothing for negative offsets, which a drag ignores.
pub fn drag(pixels: f64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut ruler = ruler(&Config::load_or_default());
    ruler.drag_begin();
    let Some(duration) = ruler.dragged(pixels) else {
        tracing::debug!(pixels, "negative offset ignored");
        return Ok(());
    };
    let seconds = duration.as_secs_f64();
    print(
        &Conversion {
            seconds,
            label: format_remaining(seconds),
            offset_px: ruler.offset_for_remaining(duration),
        },
        json,
    )
}
