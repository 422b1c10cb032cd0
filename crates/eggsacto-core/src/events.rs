use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::CountdownState;

/// Every state change on the timer screen produces an Event.
/// The CLI prints them as JSON lines; observers may log them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_ms: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    RemainingChanged {
        label: String,
        remaining_ms: u64,
        /// `None` while the user is dragging the ruler.
        offset_px: Option<f64>,
        at: DateTime<Utc>,
    },
    TimerExpired {
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    DragStarted {
        at: DateTime<Utc>,
    },
    /// Drag-driven state cleared, either on release or after deceleration.
    DragEnded {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: CountdownState,
        remaining_ms: Option<u64>,
        label: String,
        dragging: bool,
        pulsing: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::RemainingChanged { at, .. }
            | Event::TimerExpired { at }
            | Event::TimerStopped { at }
            | Event::DragStarted { at }
            | Event::DragEnded { at }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
