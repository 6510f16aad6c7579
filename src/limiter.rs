use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Caps outbound calls to `max_requests` per rolling `period`.
///
/// Each caller reserves a start instant under the lock and then sleeps until it
/// without holding the lock, so waiters are served in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    period: Duration,
    /// Start instants of the most recent `max_requests` reservations.
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, period: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            max_requests,
            period,
            window: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Reserve the next slot and return the instant at which it may be used.
    async fn reserve(&self) -> Instant {
        let mut window = self.window.lock().await;
        let now = Instant::now();

        let start = if window.len() < self.max_requests {
            now
        } else {
            let oldest = window.pop_front().unwrap_or(now);
            now.max(oldest + self.period)
        };
        window.push_back(start);
        start
    }

    /// Wait until a slot is available.
    pub async fn acquire(&self) {
        let start = self.reserve().await;
        if start > Instant::now() {
            sleep_until(start).await;
        }
    }
}
