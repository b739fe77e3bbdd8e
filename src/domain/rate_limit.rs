use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::RateLimitConfig;

/// Wall-clock abstraction so tests can drive window expiry without sleeping.
pub trait Clock: Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now_ms(&self) -> u64 {
        T::now_ms(self)
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Seconds until the window resets; set only on rejection.
    pub retry_after: Option<u64>,
}

/// Admission control in front of order creation.
///
/// Implementations must make the check-and-increment atomic per key: two
/// concurrent checks for the same key must never both pass the limit.
pub trait RequestGate: Send + Sync + 'static {
    fn check(&self, key: &str) -> RateDecision;
}

impl<G: RequestGate> RequestGate for Arc<G> {
    fn check(&self, key: &str) -> RateDecision {
        G::check(self, key)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    window_start: u64,
    count: u32,
}

/// Fixed-window request counter keyed by an opaque identity string.
///
/// This is a fixed window, not a sliding one: a burst straddling a window
/// boundary can admit up to twice `max_requests` in a short span. Callers
/// rely on the exact boundary behavior; do not swap in a sliding window or
/// token bucket without changing the documented contract.
///
/// State is process-local. A scaled-out deployment needs a shared counter
/// store behind the same [`RequestGate`] trait; a single instance does not
/// coordinate with its replicas.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Box<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: RateLimitConfig, clock: impl Clock) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Drops records idle for more than two full windows. Housekeeping only;
    /// correctness never depends on this running, it just bounds memory for
    /// one-off identities.
    pub fn sweep(&self) {
        let now = self.clock.now_ms();
        let ttl = 2 * self.window_ms();
        let mut windows = self.lock_windows();
        windows.retain(|_, w| now.saturating_sub(w.window_start) <= ttl);
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.lock_windows().len()
    }

    fn window_ms(&self) -> u64 {
        self.config.window.as_millis() as u64
    }

    fn lock_windows(&self) -> std::sync::MutexGuard<'_, HashMap<String, Window>> {
        // A poisoned lock only means another check panicked mid-update; the
        // map itself is still usable.
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RequestGate for RateLimiter {
    fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms();
        let max = self.config.max_requests;
        let mut windows = self.lock_windows();

        if let Some(w) = windows.get_mut(key) {
            if now.saturating_sub(w.window_start) <= window_ms {
                if w.count >= max {
                    let window_end = w.window_start + window_ms;
                    return RateDecision {
                        allowed: false,
                        remaining: 0,
                        retry_after: Some(window_end.saturating_sub(now).div_ceil(1000)),
                    };
                }
                w.count += 1;
                return RateDecision {
                    allowed: true,
                    remaining: max - w.count,
                    retry_after: None,
                };
            }
        }

        // First request from this key, or its window fully elapsed.
        windows.insert(
            key.to_string(),
            Window {
                window_start: now,
                count: 1,
            },
        );
        RateDecision {
            allowed: true,
            remaining: max.saturating_sub(1),
            retry_after: None,
        }
    }
}
