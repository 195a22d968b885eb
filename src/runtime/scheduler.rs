use std::time::{Duration, Instant};

/// Lifecycle state of the render scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Rendering,
    /// The last render or handler failed and the error display is shown.
    Error,
}

/// Counts re-render requests raised by renderable code and resets the
/// count once per window.
#[derive(Debug, Clone)]
pub struct StormGuard {
    quota: u32,
    window: Duration,
    window_start: Instant,
    requested: u32,
}

impl StormGuard {
    pub fn new(quota: u32, window: Duration, now: Instant) -> Self {
        Self {
            quota,
            window,
            window_start: now,
            requested: 0,
        }
    }

    /// Resets the counter if at least one full window has passed. Window
    /// boundaries stay aligned to the first window however late the tick is.
    pub fn tick(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if self.window.is_zero() || elapsed < self.window {
            return;
        }
        let into_window = elapsed.as_nanos() % self.window.as_nanos();
        self.window_start = now
            .checked_sub(Duration::from_nanos(into_window as u64))
            .unwrap_or(now);
        self.requested = 0;
    }

    pub fn record(&mut self) -> u32 {
        self.requested = self.requested.saturating_add(1);
        self.requested
    }

    pub fn exceeded(&self) -> bool {
        self.requested > self.quota
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }
}

/// Pending-render bookkeeping. At most one render deadline is armed at a
/// time, so any number of requests before it fires coalesce into one render.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub(crate) state: SchedulerState,
    pub(crate) pending: bool,
    pub(crate) deadline: Option<Instant>,
    pub(crate) storm: StormGuard,
    pub(crate) renders: u64,
}

impl Scheduler {
    pub fn new(storm: StormGuard) -> Self {
        Self {
            state: SchedulerState::Idle,
            pending: false,
            deadline: None,
            storm,
            renders: 0,
        }
    }

    /// Arms the render deadline unless one is already armed.
    pub(crate) fn arm(&mut self, at: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(at);
        }
    }

    /// Disarms the deadline if it is due and reports whether it was.
    pub(crate) fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn storm(&self) -> &StormGuard {
        &self.storm
    }
}
