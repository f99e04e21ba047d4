//! Core fixed-window rate limiter implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Cleanup sweeps run at most once every this many windows.
const CLEANUP_INTERVAL_WINDOWS: u32 = 5;
/// Identities idle for more than this many windows are dropped by a sweep.
const STALE_AFTER_WINDOWS: u32 = 10;

/// The outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Time remaining until the identity's current window resets.
    ///
    /// For a denied request this is an exact retry hint; callers producing
    /// HTTP 429 responses can surface it as a `Retry-After` header.
    pub retry_after: Duration,
}

/// Per-identity counter state for the current window.
#[derive(Debug)]
struct CounterRecord {
    /// Requests counted against the current window, denied attempts included.
    count: u64,
    /// When the current window began.
    window_start: Instant,
    /// Last time this identity made contact, admitted or not.
    last_seen: Instant,
}

/// Mutable limiter state guarded by a single lock.
#[derive(Debug, Default)]
struct LimiterState {
    /// Counter records indexed by caller identity.
    records: HashMap<String, CounterRecord>,
    /// When the last cleanup sweep ran. `None` until the first decision.
    last_cleanup: Option<Instant>,
}

/// An in-memory fixed-window rate limiter keyed by caller identity.
///
/// This struct is thread-safe and can be shared across multiple tasks.
/// Every decision runs under one lock, so two concurrent requests for the
/// same identity are always counted against each other.
///
/// Windows are strict and fixed: the first request from an identity (or the
/// first after a window expires) starts a fresh window, and counting restarts
/// from that request. A caller that exhausts one window and immediately
/// exhausts the next can therefore see up to twice the limit across the
/// boundary. Denied attempts consume quota, so hammering a closed window
/// does not shorten the wait.
///
/// Memory is bounded by opportunistic cleanup: decisions occasionally sweep
/// out identities that have not been seen for a long time, so the limiter
/// needs no background task.
pub struct RateLimiter {
    /// Maximum requests allowed per window for one identity.
    limit: u64,
    /// Length of the fixed window.
    window: Duration,
    /// Counter records and the cleanup clock.
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Create a rate limiter admitting `limit` requests per `window` for
    /// each caller identity.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero or `window` is zero. A limiter that can
    /// never admit anything, or that resets constantly, is a configuration
    /// bug worth failing loudly over.
    pub fn new(limit: u64, window: Duration) -> Self {
        assert!(limit > 0, "rate limiter limit must be greater than zero");
        assert!(
            !window.is_zero(),
            "rate limiter window must be greater than zero"
        );
        Self {
            limit,
            window,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Decide whether a request from `identity` may proceed right now.
    pub fn allow(&self, identity: &str) -> bool {
        self.check(identity).allowed
    }

    /// Decide whether a request from `identity` may proceed as of `now`.
    ///
    /// Taking the clock as an argument keeps window arithmetic deterministic
    /// under test; production callers go through [`allow`](Self::allow) or
    /// [`check`](Self::check).
    pub fn allow_at(&self, identity: &str, now: Instant) -> bool {
        self.check_at(identity, now).allowed
    }

    /// Full admission decision for `identity` at the current time.
    pub fn check(&self, identity: &str) -> Decision {
        self.check_at(identity, Instant::now())
    }

    /// Full admission decision for `identity` as of `now`.
    ///
    /// The entire decision runs under the limiter's lock: an occasional
    /// cleanup sweep, window reset if the identity's window has expired,
    /// then increment and compare against the limit.
    pub fn check_at(&self, identity: &str, now: Instant) -> Decision {
        trace!(identity, "Checking rate limit");

        let mut state = self.state.lock().unwrap();

        let cleanup_due = match state.last_cleanup {
            None => true,
            Some(last) => {
                now.saturating_duration_since(last)
                    > self.window.saturating_mul(CLEANUP_INTERVAL_WINDOWS)
            }
        };
        if cleanup_due {
            let stale_after = self.window.saturating_mul(STALE_AFTER_WINDOWS);
            let before = state.records.len();
            state
                .records
                .retain(|_, record| now.saturating_duration_since(record.last_seen) <= stale_after);
            let evicted = before - state.records.len();
            if evicted > 0 {
                debug!(evicted, "Evicted stale rate limit records");
            }
            state.last_cleanup = Some(now);
        }

        let record = state.records.entry(identity.to_string()).or_insert_with(|| {
            debug!(identity, "Creating new rate limit record");
            CounterRecord {
                count: 0,
                window_start: now,
                last_seen: now,
            }
        });

        record.last_seen = now;

        if now.saturating_duration_since(record.window_start) >= self.window {
            record.count = 0;
            record.window_start = now;
        }

        record.count += 1;
        let allowed = record.count <= self.limit;

        let elapsed = now.saturating_duration_since(record.window_start);
        let retry_after = if elapsed >= self.window {
            Duration::ZERO
        } else {
            self.window - elapsed
        };

        if !allowed {
            debug!(identity, count = record.count, "Rate limit exceeded");
        }

        Decision {
            allowed,
            retry_after,
        }
    }

    /// Maximum requests allowed per window.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Length of the fixed window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Get the current counter value for an identity.
    ///
    /// Returns `None` if no record exists for the identity.
    pub fn current_count(&self, identity: &str) -> Option<u64> {
        let state = self.state.lock().unwrap();
        state.records.get(identity).map(|record| record.count)
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.records.len()
    }

    /// Clear all counter records.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.records.clear();
        state.last_cleanup = None;
    }
}
