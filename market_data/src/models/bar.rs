//! Canonical in-memory representation of a daily bar (OHLCV).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One trading day of price history.
///
/// Series of bars are kept in chronological order; providers sort before
/// returning them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    /// Start of the bar as Unix milliseconds (UTC).
    pub timestamp_ms: i64,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the session.
    pub volume: f64,

    /// Volume-weighted average price. Not all providers supply this.
    pub vwap: Option<f64>,
}

impl HistoricalBar {
    /// The bar's start as a UTC datetime, if the timestamp is in range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// `true` when the session closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_converts_from_millis() {
        let bar = HistoricalBar {
            timestamp_ms: 1_704_171_600_000,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 0.9,
            volume: 10.0,
            vwap: None,
        };
        assert_eq!(
            bar.timestamp().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap()
        );
        assert!(!bar.is_up());
    }
}
