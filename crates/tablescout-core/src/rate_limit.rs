//! Sliding-window call-rate limiter for the external API clients.
//!
//! Allows at most `max_calls` within any `period`. [`RateLimiter::acquire`]
//! blocks the caller (via `tokio::time::sleep`) until a slot frees; calls
//! are never dropped. The booking engine tolerates the resulting latency.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// # Panics
    ///
    /// Panics if `max_calls` is zero; a limiter that admits nothing would
    /// deadlock every caller.
    #[must_use]
    pub fn new(max_calls: usize, period: Duration) -> Self {
        assert!(max_calls > 0, "rate limiter must admit at least one call");
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Waits until a call slot is free, then claims it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock().expect("rate limiter lock poisoned");
                let now = Instant::now();
                while let Some(front) = calls.front() {
                    if now.duration_since(*front) >= self.period {
                        calls.pop_front();
                    } else {
                        break;
                    }
                }
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }
                // Window is full; sleep until the oldest call ages out.
                let front = *calls.front().expect("window is full but empty");
                self.period - now.duration_since(front)
            };
            tokio::time::sleep(wait).await;
        }
    }
}
