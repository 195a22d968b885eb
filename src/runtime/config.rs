use std::time::Duration;

/// Re-render requests from renderable code allowed per quota window.
pub const DEFAULT_STORM_QUOTA: u32 = 5;
/// Length of the window after which the re-render counter resets.
pub const DEFAULT_QUOTA_WINDOW: Duration = Duration::from_secs(1);
/// Delay between a deferred re-render request and the render it triggers.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Tunables of a [`Runtime`](crate::runtime::Runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub storm_quota: u32,
    pub quota_window: Duration,
    pub settle_delay: Duration,
    /// Disables diagnostic logging and the re-render storm guard.
    pub unsafe_mode: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            storm_quota: DEFAULT_STORM_QUOTA,
            quota_window: DEFAULT_QUOTA_WINDOW,
            settle_delay: DEFAULT_SETTLE_DELAY,
            unsafe_mode: false,
        }
    }
}

impl RuntimeConfig {
    pub fn with_unsafe_mode(mut self, enabled: bool) -> Self {
        self.unsafe_mode = enabled;
        self
    }

    pub fn with_storm_quota(mut self, quota: u32) -> Self {
        self.storm_quota = quota;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
