//! Repeating-tick scheduling capability.
//!
//! The engine never sleeps or spawns. It asks a [`TickScheduler`] for a
//! repeating tick and holds the returned [`TickHandle`]; whoever drives the
//! event loop reads the scheduler to know whether, and how often, to call
//! `tick()`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque id of one scheduled repeating tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait TickScheduler {
    /// Start a repeating tick with the given period.
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle;

    /// Cancel a previously scheduled tick. Unknown or stale handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler backing a real event loop.
///
/// Holds at most one active tick; the loop polls [`IntervalScheduler::active_period`]
/// and drives an interval timer from it.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    next_id: u64,
    active: Option<(TickHandle, Duration)>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_handle(&self) -> Option<TickHandle> {
        self.active.map(|(h, _)| h)
    }

    pub fn active_period(&self) -> Option<Duration> {
        self.active.map(|(_, p)| p)
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        if let Some((old, _)) = self.active.replace((handle, period)) {
            tracing::warn!(stale = old.id(), "tick scheduled while another was active");
        }
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.active_handle() == Some(handle) {
            self.active = None;
        }
    }
}

/// Bookkeeping shared by [`ManualScheduler`] clones.
#[derive(Debug, Default, Clone)]
pub struct ScheduleLog {
    pub scheduled: Vec<(TickHandle, Duration)>,
    pub cancelled: Vec<TickHandle>,
}

impl ScheduleLog {
    /// Handles scheduled and not yet cancelled.
    pub fn live(&self) -> Vec<TickHandle> {
        self.scheduled
            .iter()
            .map(|(h, _)| *h)
            .filter(|h| !self.cancelled.contains(h))
            .collect()
    }
}

/// Recording scheduler for tests. Never fires anything itself; tests call
/// `tick()` on the engine directly.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    log: Rc<RefCell<ScheduleLog>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ScheduleLog {
        self.log.borrow().clone()
    }

    pub fn live_count(&self) -> usize {
        self.log.borrow().live().len()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        let mut log = self.log.borrow_mut();
        let handle = TickHandle(log.scheduled.len() as u64 + 1);
        log.scheduled.push((handle, period));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        let mut log = self.log.borrow_mut();
        if !log.cancelled.contains(&handle) {
            log.cancelled.push(handle);
        }
    }
}
