//! Request timestamps for Coinbase Pro authentication.
//!
//! The server rejects signatures whose timestamp is more than about 30 seconds
//! away from its own clock, so the timestamp is read at send time.

use time::OffsetDateTime;

/// Trait for providing the `CB-ACCESS-TIMESTAMP` value.
///
/// The value is decimal seconds since the UNIX epoch, as a string.
pub trait TimestampProvider: Send + Sync {
    /// Produce the timestamp for a request about to be sent.
    fn timestamp(&self) -> String;
}

/// Reads the wall clock on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new wall-clock provider.
    pub fn new() -> Self {
        Self
    }
}

impl TimestampProvider for SystemClock {
    fn timestamp(&self) -> String {
        format_timestamp(OffsetDateTime::now_utc())
    }
}

/// Always returns the same timestamp. Useful for reproducible signatures in tests.
#[derive(Debug, Clone)]
pub struct FixedTimestamp(String);

impl FixedTimestamp {
    /// Create a provider that always yields `timestamp`.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl TimestampProvider for FixedTimestamp {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}

/// Format an instant as `seconds.micros`.
fn format_timestamp(now: OffsetDateTime) -> String {
    format!("{}.{:06}", now.unix_timestamp(), now.microsecond())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_timestamp() {
        let instant = datetime!(2021-03-29 12:00:00.250 UTC);
        assert_eq!(format_timestamp(instant), "1617019200.250000");
    }

    #[test]
    fn test_system_clock_is_decimal_seconds() {
        let ts = SystemClock::new().timestamp();
        let (secs, frac) = ts.split_once('.').unwrap();
        assert!(secs.parse::<i64>().unwrap() > 1_600_000_000);
        assert_eq!(frac.len(), 6);
    }

    #[test]
    fn test_system_clock_reads_at_call_time() {
        let clock = SystemClock::new();
        let first: f64 = clock.timestamp().parse().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second: f64 = clock.timestamp().parse().unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_fixed_timestamp() {
        let provider = FixedTimestamp::new("1600000000.000000");
        assert_eq!(provider.timestamp(), "1600000000.000000");
        assert_eq!(provider.timestamp(), "1600000000.000000");
    }
}
