//! Ruler scroll synchronisation.
//!
//! Maps time to a horizontal ruler offset and back under a fixed
//! pixels-per-second ratio. Coupling runs one way at a time: the countdown
//! pushes offsets while the ruler is idle, and a drag pushes durations while
//! the user holds it. Offset pushes are suppressed for the whole drag,
//! including any deceleration after release.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 40 points of ruler per minute.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 40.0 / 60.0;

/// Physical length of the ruler.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollSync {
    pixels_per_second: f64,
    max_duration: Duration,
    dragging: bool,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_SECOND, DEFAULT_MAX_DURATION)
    }
}

impl ScrollSync {
    /// `pixels_per_second` must be positive; config validation enforces it.
    pub fn new(pixels_per_second: f64, max_duration: Duration) -> Self {
        Self {
            pixels_per_second,
            max_duration,
            dragging: false,
        }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn max_offset(&self) -> f64 {
        self.offset_for_remaining(self.max_duration)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether countdown-driven offset updates may be applied right now.
    pub fn should_push_offset(&self) -> bool {
        !self.dragging
    }

    pub fn offset_for_remaining(&self, remaining: Duration) -> f64 {
        remaining.as_secs_f64() * self.pixels_per_second
    }

    /// Pure offset-to-duration conversion, clamped to `[0, max_duration]`.
    pub fn duration_for_offset(&self, offset_px: f64) -> Duration {
        if offset_px.is_nan() || offset_px <= 0.0 {
            return Duration::ZERO;
        }
        let secs = offset_px / self.pixels_per_second;
        if secs >= self.max_duration.as_secs_f64() {
            self.max_duration
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    // ── Drag lifecycle ───────────────────────────────────────────────

    pub fn drag_begin(&mut self) {
        self.dragging = true;
    }

    /// Duration requested by a drag to `offset_px`.
    ///
    /// `None` for negative offsets (overscroll rubber-banding) and when no
    /// drag is in progress.
    pub fn dragged(&mut self, offset_px: f64) -> Option<Duration> {
        if !self.dragging || offset_px.is_nan() || offset_px < 0.0 {
            return None;
        }
        Some(self.duration_for_offset(offset_px))
    }

    /// Finger lifted. Returns true if the drag state was cleared now; a
    /// flick keeps it until [`ScrollSync::deceleration_end`].
    pub fn drag_end(&mut self, will_decelerate: bool) -> bool {
        if will_decelerate || !self.dragging {
            return false;
        }
        self.dragging = false;
        true
    }

    /// Returns true if this cleared an active drag.
    pub fn deceleration_end(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn offset_uses_forty_points_per_minute() {
        let sync = ScrollSync::default();
        assert!((sync.offset_for_remaining(Duration::from_secs(60)) - 40.0).abs() < 1e-9);
        assert!((sync.max_offset() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn drag_beyond_ruler_clamps_to_max() {
        let mut sync = ScrollSync::default();
        sync.drag_begin();
        assert_eq!(sync.dragged(5_000.0), Some(Duration::from_secs(1200)));
        assert_eq!(sync.dragged(800.0), Some(Duration::from_secs(1200)));
    }

    #[test]
    fn negative_offset_is_ignored() {
        let mut sync = ScrollSync::default();
        sync.drag_begin();
        assert_eq!(sync.dragged(-0.5), None);
        assert_eq!(sync.dragged(f64::NAN), None);
        assert_eq!(sync.dragged(0.0), Some(Duration::ZERO));
    }

    #[test]
    fn offset_outside_drag_is_ignored() {
        let mut sync = ScrollSync::default();
        assert_eq!(sync.dragged(40.0), None);
    }

    #[test]
    fn slow_release_clears_immediately() {
        let mut sync = ScrollSync::default();
        sync.drag_begin();
        assert!(!sync.should_push_offset());
        assert!(sync.drag_end(false));
        assert!(sync.should_push_offset());
        assert!(!sync.deceleration_end());
    }

    #[test]
    fn flick_clears_after_deceleration() {
        let mut sync = ScrollSync::default();
        sync.drag_begin();
        assert!(!sync.drag_end(true));
        assert!(sync.is_dragging());
        // Deceleration still moves the ruler and still re-targets.
        assert_eq!(sync.dragged(80.0), Some(Duration::from_secs(120)));
        assert!(sync.deceleration_end());
        assert!(!sync.is_dragging());
    }

    proptest! {
        #[test]
        fn offset_and_drag_are_inverse(ms in 0u64..=1_200_000) {
            let mut sync = ScrollSync::default();
            let d = Duration::from_millis(ms);
            let offset = sync.offset_for_remaining(d);
            prop_assert!((offset / sync.pixels_per_second() - d.as_secs_f64()).abs() < 1e-6);

            sync.drag_begin();
            let back = sync.dragged(offset).unwrap();
            prop_assert!((back.as_secs_f64() - d.as_secs_f64()).abs() < 1e-6);
        }
    }
}
