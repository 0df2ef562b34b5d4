use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
pub const RATE_LIMIT_MAX: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request counter keyed by client IP.
///
/// State is process-local: counters reset on restart and are not shared
/// between instances, so this is abuse mitigation rather than a security
/// boundary.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// True when the caller may proceed. Denied calls do not consume budget,
    /// and the window start is only moved when a fresh window begins.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        if now.duration_since(bucket.window_start) > self.window {
            bucket.count = 1;
            bucket.window_start = now;
            return true;
        }
        if bucket.count >= self.max_requests {
            return false;
        }
        bucket.count += 1;
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_WINDOW, RATE_LIMIT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_request_in_the_window_is_denied() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for i in 0..10 {
            assert!(
                limiter.check_at("1.2.3.4", start + Duration::from_secs(i)),
                "request {} should be allowed",
                i + 1
            );
        }
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(30)));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at("1.2.3.4", start));
        }
        // exactly at the window edge the old window still applies
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(60)));
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(61)));
    }

    #[test]
    fn denied_requests_do_not_extend_the_window() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.check_at("9.9.9.9", start);
        }
        for i in 0..5 {
            assert!(!limiter.check_at("9.9.9.9", start + Duration::from_secs(10 + i)));
        }
        assert!(limiter.check_at("9.9.9.9", start + Duration::from_secs(61)));
    }

    #[test]
    fn buckets_are_per_key() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at("1.1.1.1", start));
        }
        assert!(!limiter.check_at("1.1.1.1", start));
        assert!(limiter.check_at("2.2.2.2", start));
    }
}
