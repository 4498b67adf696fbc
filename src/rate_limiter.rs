//! Per-provider request rate limiting with a sliding 60-second window
//!
//! One limiter instance per provider is shared by every concurrent task
//! targeting that provider; constructing a limiter per call would defeat the
//! quota entirely.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// Length of the rolling admission window
const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window admission gate for one provider
///
/// # Algorithm
///
/// The limiter keeps the ordered timestamps of prior admissions. On
/// [`acquire`](RateLimiter::acquire):
///
/// - timestamps older than 60 seconds are discarded;
/// - if fewer than `quota` remain, the call is admitted and `now` recorded;
/// - otherwise the task sleeps out the remainder of the oldest admission's
///   window (with the lock released) and re-evaluates.
///
/// Across the limiter's lifetime no rolling 60-second window ever contains
/// more than `quota` admissions.
///
/// # Implementation
///
/// The timestamp sequence lives behind a `tokio::sync::Mutex`, so admission
/// bookkeeping is mutually exclusive while the sleep itself happens with the
/// lock released. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct RateLimiter {
    /// Maximum admissions per rolling window
    quota: usize,
    /// Timestamps of admissions inside the current window, oldest first
    admissions: Arc<Mutex<VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter admitting `per_minute` calls per rolling 60-second
    /// window
    ///
    /// A zero quota is rejected: the wait-time arithmetic has no meaning
    /// when nothing can ever be admitted.
    pub fn new(per_minute: u32) -> Result<Self> {
        if per_minute == 0 {
            return Err(Error::Config {
                message: "rate limit quota must be positive".to_string(),
                key: Some("rate_limit".to_string()),
            });
        }
        Ok(Self {
            quota: per_minute as usize,
            admissions: Arc::new(Mutex::new(VecDeque::new())),
        })
    }

    /// Suspend until admitting the caller would not exceed the quota, then
    /// record the admission
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut admissions = self.admissions.lock().await;
                let now = Instant::now();

                while admissions
                    .front()
                    .is_some_and(|&oldest| now.duration_since(oldest) >= WINDOW)
                {
                    admissions.pop_front();
                }

                if admissions.len() < self.quota {
                    admissions.push_back(now);
                    return;
                }

                // Window is full; the slot opens when the oldest admission
                // ages out.
                match admissions.front() {
                    Some(&oldest) => WINDOW - now.duration_since(oldest),
                    None => Duration::ZERO,
                }
            };

            if wait > Duration::ZERO {
                tracing::debug!(wait_secs = wait.as_secs_f64(), "rate limit reached, waiting");
                tokio::time::sleep(wait).await;
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_quota_rejected() {
        assert!(RateLimiter::new(0).is_err());
        assert!(RateLimiter::new(1).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_under_quota_admits_immediately() {
        let limiter = RateLimiter::new(5).unwrap();

        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_never_exceeds_quota() {
        let limiter = RateLimiter::new(3).unwrap();

        let mut admissions = Vec::new();
        for _ in 0..10 {
            limiter.acquire().await;
            admissions.push(Instant::now());
        }

        // Every rolling 60-second window contains at most 3 admissions
        for (i, &t) in admissions.iter().enumerate() {
            let in_window = admissions[i..]
                .iter()
                .take_while(|&&u| u.duration_since(t) < WINDOW)
                .count();
            assert!(
                in_window <= 3,
                "window starting at admission {i} contains {in_window} admissions"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_out_window_remainder() {
        let limiter = RateLimiter::new(2).unwrap();

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        // Third admission must wait for the first to age out of the window
        limiter.acquire().await;
        assert_eq!(start.elapsed(), WINDOW);

        // Fourth waits for the second, which was admitted at t=0 as well
        limiter.acquire().await;
        assert_eq!(start.elapsed(), WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_across_concurrent_tasks() {
        let limiter = RateLimiter::new(4).unwrap();
        let start = Instant::now();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            tasks.spawn(async move {
                limiter.acquire().await;
                Instant::now()
            });
        }

        let mut admissions = Vec::new();
        while let Some(res) = tasks.join_next().await {
            admissions.push(res.unwrap());
        }

        // First four go through immediately, the rest in the next window
        let immediate = admissions
            .iter()
            .filter(|&&t| t.duration_since(start) < WINDOW)
            .count();
        assert_eq!(immediate, 4);
        assert!(admissions.iter().all(|&t| {
            let d = t.duration_since(start);
            d == Duration::ZERO || d >= WINDOW
        }));
    }
}
