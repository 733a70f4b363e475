//! Rate limiting of outbound resolver calls.
//!
//! The lookup controller awaits [`Throttle::acquire`] immediately before
//! each network query; an absent throttle is the identity. The default
//! implementation is a fixed-window counter: up to `max_calls` per
//! `interval`, later callers sleeping until the window rolls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Future returned by [`Throttle::acquire`].
pub type Acquiring<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Trait for gating outbound resolver calls.
pub trait Throttle: Send + Sync {
    /// Resolves once the caller may proceed. Callers are served in the
    /// order they arrive at the internal queue.
    fn acquire(&self) -> Acquiring<'_>;
}

struct Window {
    started_at: Instant,
    used: u32,
}

/// Fixed-window rate limiter.
pub struct IntervalThrottle {
    max_calls: u32,
    interval: Duration,
    window: Mutex<Window>,
}

impl IntervalThrottle {
    /// Allow up to `max_calls` (at least 1) per `interval`.
    pub fn new(max_calls: u32, interval: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            interval,
            window: Mutex::new(Window {
                started_at: Instant::now(),
                used: 0,
            }),
        }
    }
}

impl Throttle for IntervalThrottle {
    fn acquire(&self) -> Acquiring<'_> {
        Box::pin(async move {
            loop {
                // The tokio mutex queues waiters fairly, which preserves
                // arrival order across window rolls.
                let mut window = self.window.lock().await;
                let now = Instant::now();

                if now.duration_since(window.started_at) >= self.interval {
                    window.started_at = now;
                    window.used = 0;
                }
                if window.used < self.max_calls {
                    window.used += 1;
                    return;
                }

                let reopens_at = window.started_at + self.interval;
                drop(window);
                tokio::time::sleep_until(reopens_at).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_cap_pass_immediately() {
        let throttle = IntervalThrottle::new(3, Duration::from_secs(1));
        let before = Instant::now();
        for _ in 0..3 {
            throttle.acquire().await;
        }
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_excess_call_waits_for_window_roll() {
        let throttle = IntervalThrottle::new(1, Duration::from_secs(1));
        let before = Instant::now();

        throttle.acquire().await;
        throttle.acquire().await;

        assert!(Instant::now().duration_since(before) >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_idle_interval() {
        let throttle = IntervalThrottle::new(1, Duration::from_secs(1));
        throttle.acquire().await;

        tokio::time::advance(Duration::from_secs(2)).await;
        let before = Instant::now();
        throttle.acquire().await;
        assert_eq!(Instant::now(), before);
    }
}
