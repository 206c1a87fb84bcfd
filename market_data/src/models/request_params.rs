use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::providers::{ProviderError, ValidationSnafu};

/// Default page size for options chain requests.
pub const DEFAULT_CHAIN_LIMIT: u32 = 100;

/// Parameters for a daily bar history request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBarsParams {
    /// Ticker to request (e.g., "AAPL").
    pub symbol: String,

    /// First session of the range (inclusive).
    pub from: NaiveDate,

    /// Last session of the range (inclusive).
    pub to: NaiveDate,
}

impl DailyBarsParams {
    /// Builds a request covering the `days` calendar days up to and including `to`.
    pub fn trailing(symbol: impl Into<String>, to: NaiveDate, days: u32) -> Self {
        let from = to
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            symbol: symbol.into(),
            from,
            to,
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        normalize_symbol(&self.symbol)?;
        if self.from > self.to {
            return ValidationSnafu {
                message: format!("range start {} is after range end {}", self.from, self.to),
            }
            .fail();
        }
        Ok(())
    }
}

/// Parameters for an options chain request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsChainParams {
    /// Underlying ticker.
    pub underlying: String,

    /// Only contracts expiring strictly after this date are returned.
    pub expiration_after: NaiveDate,

    /// Page size requested from the provider.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Upper bound on the number of pages followed.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_limit() -> u32 {
    DEFAULT_CHAIN_LIMIT
}

fn default_max_pages() -> u32 {
    1
}

impl OptionsChainParams {
    pub fn new(underlying: impl Into<String>, expiration_after: NaiveDate) -> Self {
        Self {
            underlying: underlying.into(),
            expiration_after,
            limit: DEFAULT_CHAIN_LIMIT,
            max_pages: default_max_pages(),
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        normalize_symbol(&self.underlying)?;
        if self.limit == 0 || self.max_pages == 0 {
            return ValidationSnafu {
                message: "limit and max_pages must be at least 1".to_string(),
            }
            .fail();
        }
        Ok(())
    }
}

/// Trims and upper-cases a ticker, rejecting anything that could not be a
/// US equity symbol (letters, digits, `.` and `-`).
pub fn normalize_symbol(symbol: &str) -> Result<String, ProviderError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let valid = symbol.starts_with(|c: char| c.is_ascii_alphanumeric())
        && symbol.len() <= 10
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return ValidationSnafu {
            message: format!("invalid symbol {symbol:?}"),
        }
        .fail();
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_normalized() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("AA PL").is_err());
        assert!(normalize_symbol("../v3").is_err());
    }

    #[test]
    fn trailing_range_is_inclusive_of_end() {
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let params = DailyBarsParams::trailing("AAPL", to, 30);
        assert_eq!(params.from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(params.to, to);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = DailyBarsParams {
            symbol: "AAPL".into(),
            from: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
