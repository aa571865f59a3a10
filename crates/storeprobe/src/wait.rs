//! Wait mechanisms.
//!
//! Every scenario step blocks until its precondition holds or the bound
//! elapses. Timeout is the only cancellation mechanism; a timed-out wait is
//! reported, never retried with a different strategy.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default timeout for element waits (15 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 15_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Waiter for synchronization operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `condition` until it returns `Ok(true)`.
    ///
    /// The condition is always checked at least once, even with a zero
    /// timeout. An `Err` from the condition aborts the wait immediately.
    pub fn wait_for<F>(&self, description: &str, mut condition: F) -> ProbeResult<WaitResult>
    where
        F: FnMut() -> ProbeResult<bool>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut polls = 0u32;

        loop {
            polls = polls.saturating_add(1);
            if condition()? {
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    polls,
                    waited_for: description.to_string(),
                });
            }
            if start.elapsed() >= timeout {
                return Err(ProbeError::Timeout {
                    waited_for: description.to_string(),
                    ms: self.options.timeout_ms,
                });
            }
            std::thread::sleep(self.options.poll_interval());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_builders_and_durations() {
            let opts = WaitOptions::new().with_timeout(250).with_poll_interval(5);
            assert_eq!(opts.timeout(), Duration::from_millis(250));
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let waiter = Waiter::new(WaitOptions::new().with_timeout(0));
            let result = waiter.wait_for("ready", || Ok(true)).unwrap();
            assert_eq!(result.polls, 1);
            assert_eq!(result.waited_for, "ready");
        }

        #[test]
        fn test_succeeds_after_a_few_polls() {
            let waiter = Waiter::new(WaitOptions::new().with_timeout(1000).with_poll_interval(1));
            let count = Cell::new(0);
            let result = waiter
                .wait_for("third poll", || {
                    count.set(count.get() + 1);
                    Ok(count.get() >= 3)
                })
                .unwrap();
            assert_eq!(result.polls, 3);
        }

        #[test]
        fn test_times_out() {
            let waiter = Waiter::new(WaitOptions::new().with_timeout(20).with_poll_interval(5));
            let err = waiter.wait_for("never", || Ok(false)).unwrap_err();
            match err {
                ProbeError::Timeout { waited_for, ms } => {
                    assert_eq!(waited_for, "never");
                    assert_eq!(ms, 20);
                }
                other => panic!("expected timeout, got {other}"),
            }
        }

        #[test]
        fn test_condition_error_aborts() {
            let waiter = Waiter::new(WaitOptions::new().with_timeout(10_000));
            let count = Cell::new(0);
            let err = waiter
                .wait_for("broken", || {
                    count.set(count.get() + 1);
                    Err(ProbeError::driver("device disconnected"))
                })
                .unwrap_err();
            assert!(matches!(err, ProbeError::Driver { .. }));
            assert_eq!(count.get(), 1);
        }
    }
}
