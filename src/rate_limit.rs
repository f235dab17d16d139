use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use crate::clock::{Clock, SystemClock};

// Used when the configured limit is zero, negative or out of range
pub const DEFAULT_LIMIT: u32 = 200;

// Fixed one-minute windows
pub const WINDOW_SECS: i64 = 60;

// Buckets older than this many windows behind the current one get dropped
const RETENTION_WINDOWS: i64 = 2;

// Rate limit entry - tracks requests per IP/key within one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub window_start: i64, // unix seconds, truncated to the window
    pub count: u32,
}

// `retry_after` is only meaningful when `allowed` is false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: u64,
    pub tracked: usize, // keys in the store once this decision is applied
}

// Per-key fixed window limiter
pub struct RateLimiter {
    limit: u32,
    clock: Arc<dyn Clock>,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(limit: i64, clock: Arc<dyn Clock>) -> Self {
        let limit = u32::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT);

        Self {
            limit,
            clock,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_clock(limit: i64) -> Self {
        Self::new(limit, Arc::new(SystemClock))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    // Number of keys currently holding a bucket
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // Admission check for `key` at the clock's current instant
    pub fn check(&self, key: &str) -> Admission {
        self.decide(key, self.clock.now())
    }

    // Cleanup, lookup and the counter update all happen under one lock
    pub fn decide(&self, key: &str, now: DateTime<Utc>) -> Admission {
        let window = window_start(now);

        // A panic elsewhere can't leave a half-written bucket behind, so a
        // poisoned map is still usable
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        let cutoff = window - RETENTION_WINDOWS * WINDOW_SECS;
        buckets.retain(|_, bucket| bucket.window_start >= cutoff);

        // window rolled over..? start fresh
        let mut bucket = match buckets.get(key) {
            Some(existing) if existing.window_start == window => *existing,
            _ => Bucket {
                window_start: window,
                count: 0,
            },
        };

        // over limit
        if bucket.count >= self.limit {
            return Admission {
                allowed: false,
                remaining: 0,
                retry_after: retry_after_secs(window, now),
                tracked: buckets.len(),
            };
        }

        bucket.count += 1;
        buckets.insert(key.to_string(), bucket);

        Admission {
            allowed: true,
            remaining: self.limit.saturating_sub(bucket.count),
            retry_after: 0,
            tracked: buckets.len(),
        }
    }
}

// Start of the window containing `now`, in unix seconds
fn window_start(now: DateTime<Utc>) -> i64 {
    let secs = now.timestamp();
    secs - secs.rem_euclid(WINDOW_SECS)
}

// Whole seconds until the window ends, rounded up, at least 1
fn retry_after_secs(window: i64, now: DateTime<Utc>) -> u64 {
    let window_end_ms = (window + WINDOW_SECS) * 1000;
    let left_ms = window_end_ms - now.timestamp_millis();
    let secs = (left_ms + 999).div_euclid(1000);
    u64::try_from(secs.max(1)).unwrap_or(1)
}
