//! Fixed inter-request delay.
//!
//! Coinbase Pro limits public endpoints per IP and private endpoints per key.
//! Rather than tracking a budget, every outbound call waits a fixed delay first.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use coinbase_pro_client::rate_limit::RequestThrottle;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let throttle = RequestThrottle::new(Duration::from_millis(5));
//! throttle.wait().await;
//! # }
//! ```

use std::time::Duration;

use crate::rate_limit::DEFAULT_REQUEST_DELAY;

/// Sleeps a fixed delay before each outbound request.
///
/// The delay is unconditional: it does not depend on how long ago the previous
/// request was sent. Each client owns its own throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestThrottle {
    delay: Duration,
}

impl RequestThrottle {
    /// Create a throttle with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::trace!(delay_ms = self.delay.as_millis() as u64, "throttling request");
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_full_delay() {
        let throttle = RequestThrottle::new(Duration::from_millis(275));
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(275));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_waits_accumulate() {
        let throttle = RequestThrottle::new(Duration::from_millis(100));
        let start = Instant::now();
        throttle.wait().await;
        let first = start.elapsed();
        throttle.wait().await;
        assert!(start.elapsed() - first >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_throttle_does_not_wait() {
        let throttle = RequestThrottle::disabled();
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(RequestThrottle::default().delay(), Duration::from_millis(275));
    }
}
