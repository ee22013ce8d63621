//! Fixed-window admission control for outbound lookups.

use crate::config::RateLimitConfig;
use std::time::Duration;
use tokio::time::Instant;

/// Counts admissions since the last reset; the counter zeroes once more than
/// one window has elapsed.
#[derive(Debug, Clone)]
pub struct RateLimitWindow {
    max_requests: u32,
    window: Duration,
    count: u32,
    last_reset: Instant,
}

impl RateLimitWindow {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            count: 0,
            last_reset: Instant::now(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    /// Admit one request if the window has room, recording it.
    pub fn try_acquire(&mut self) -> bool {
        self.roll_window();

        if self.count >= self.max_requests {
            return false;
        }

        self.count += 1;
        true
    }

    /// Admissions left in the current window.
    pub fn remaining(&mut self) -> u32 {
        self.roll_window();
        self.max_requests.saturating_sub(self.count)
    }

    /// Start a fresh window now.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_reset = Instant::now();
    }

    fn roll_window(&mut self) {
        if self.last_reset.elapsed() > self.window {
            self.reset();
        }
    }
}

impl Default for RateLimitWindow {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_max() {
        let mut window = RateLimitWindow::new(3, Duration::from_secs(60));

        assert!(window.try_acquire());
        assert!(window.try_acquire());
        assert!(window.try_acquire());
        assert!(!window.try_acquire());
        assert_eq!(window.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_elapsed() {
        let mut window = RateLimitWindow::new(1, Duration::from_millis(60_000));
        assert!(window.try_acquire());
        assert!(!window.try_acquire());

        // Exactly one window is not enough; the reset needs strictly more.
        tokio::time::advance(Duration::from_millis(60_000)).await;
        assert!(!window.try_acquire());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(window.try_acquire());
        assert_eq!(window.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_capacity_rejects_everything() {
        let mut window = RateLimitWindow::new(0, Duration::from_secs(1));
        assert!(!window.try_acquire());
    }

    #[test]
    fn test_default_matches_config() {
        let mut window = RateLimitWindow::default();
        assert_eq!(window.remaining(), 50);
    }
}
