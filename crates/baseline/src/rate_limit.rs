//! Fixed-window rate limiting for repository scans
//!
//! Each client key gets `max_requests` calls per window. A window opens on
//! the first call after the previous one expired; there is no sliding.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Calls allowed per window
pub const DEFAULT_MAX_REQUESTS: u32 = 5;

/// Length of one window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The process clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        /// Calls left in the current window
        remaining: u32,
    },
    Denied {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Per-key fixed-window counter
#[derive(Debug)]
pub struct FixedWindowLimiter<C: Clock = SystemClock> {
    max_requests: u32,
    window: Duration,
    clock: C,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter<SystemClock> {
    /// 5 calls per 60 seconds on the system clock
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW, SystemClock)
    }
}

impl Default for FixedWindowLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    pub fn with_clock(max_requests: u32, window: Duration, clock: C) -> Self {
        Self {
            max_requests,
            window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count one call for `key` and decide whether it may proceed
    pub fn check(&self, key: &str) -> Decision {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        match windows.get_mut(key) {
            Some(window) if now <= window.reset_at => {
                if window.count < self.max_requests {
                    window.count += 1;
                    Decision::Allowed {
                        remaining: self.max_requests - window.count,
                    }
                } else {
                    let retry_after = window.reset_at.saturating_duration_since(now);
                    debug!(key, ?retry_after, "Rate limit exceeded");
                    Decision::Denied { retry_after }
                }
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Decision::Allowed {
                    remaining: self.max_requests.saturating_sub(1),
                }
            }
        }
    }

    /// Count one call for `key`; true if it may proceed
    pub fn allow(&self, key: &str) -> bool {
        self.check(key).is_allowed()
    }

    /// Drop expired windows. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, window| now <= window.reset_at);
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Swept rate limit windows");
        }
        removed
    }

    /// Number of tracked keys
    pub fn tracked(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
