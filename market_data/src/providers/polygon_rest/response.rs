//! Wire types for Polygon REST responses and their conversion into models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::{
    models::{
        bar::HistoricalBar,
        option_contract::{ContractType, OptionContract},
        quote::{Quote, SessionSummary},
    },
    providers::{DecodeSnafu, ProviderError},
};

#[derive(Deserialize, Debug, Default)]
pub struct PolygonSession {
    #[serde(rename = "o", default)]
    pub open: f64,
    #[serde(rename = "h", default)]
    pub high: f64,
    #[serde(rename = "l", default)]
    pub low: f64,
    #[serde(rename = "c", default)]
    pub close: f64,
    #[serde(rename = "v", default)]
    pub volume: f64,
    #[serde(rename = "vw", default)]
    pub vwap: Option<f64>,
}

impl From<PolygonSession> for SessionSummary {
    fn from(s: PolygonSession) -> Self {
        SessionSummary {
            open: s.open,
            high: s.high,
            low: s.low,
            close: s.close,
            volume: s.volume,
            vwap: s.vwap,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct PolygonLastTrade {
    #[serde(rename = "p")]
    pub price: f64,
    #[serde(rename = "s", default)]
    pub size: Option<f64>,
    /// Nanoseconds since the epoch.
    #[serde(rename = "t", default)]
    pub timestamp_ns: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTicker {
    pub ticker: String,
    #[serde(default)]
    pub todays_change: f64,
    #[serde(default)]
    pub todays_change_perc: f64,
    /// Nanoseconds since the epoch.
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub day: PolygonSession,
    #[serde(default)]
    pub last_trade: Option<PolygonLastTrade>,
    #[serde(default)]
    pub prev_day: PolygonSession,
}

#[derive(Deserialize, Debug)]
pub struct SnapshotResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ticker: Option<SnapshotTicker>,
}

impl SnapshotTicker {
    /// Converts the snapshot into a [`Quote`].
    ///
    /// The last trade is missing outside market hours on some plans; the
    /// current session close and then the previous close stand in for it.
    pub fn into_quote(self) -> Result<Quote, ProviderError> {
        let last_price = self
            .last_trade
            .as_ref()
            .map(|t| t.price)
            .into_iter()
            .chain([self.day.close, self.prev_day.close])
            .find(|p| p.is_finite() && *p > 0.0);

        let Some(last_price) = last_price else {
            return DecodeSnafu {
                message: format!("snapshot for {} carries no usable price", self.ticker),
            }
            .fail();
        };

        Ok(Quote {
            symbol: self.ticker,
            last_price,
            todays_change: self.todays_change,
            todays_change_pct: self.todays_change_perc,
            updated: self.updated.map(DateTime::<Utc>::from_timestamp_nanos),
            day: self.day.into(),
            prev_day: self.prev_day.into(),
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct PolygonAgg {
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
    #[serde(rename = "vw", default)]
    pub vwap: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct AggsResponse {
    #[serde(default)]
    pub results: Vec<PolygonAgg>,
}

impl AggsResponse {
    /// Bars in chronological order.
    pub fn into_bars(self) -> Vec<HistoricalBar> {
        let mut bars: Vec<HistoricalBar> = self
            .results
            .into_iter()
            .map(|a| HistoricalBar {
                timestamp_ms: a.timestamp_ms,
                open: a.open,
                high: a.high,
                low: a.low,
                close: a.close,
                volume: a.volume,
                vwap: a.vwap,
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp_ms);
        bars
    }
}

#[derive(Deserialize, Debug)]
pub struct PolygonContract {
    pub ticker: String,
    pub underlying_ticker: String,
    pub contract_type: String,
    pub strike_price: f64,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub premium: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<u64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
}

impl PolygonContract {
    /// `None` for contract types other than put and call.
    pub fn into_contract(self) -> Option<OptionContract> {
        let contract_type = match self.contract_type.parse::<ContractType>() {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    ticker = %self.ticker,
                    contract_type = %self.contract_type,
                    "skipping contract with unsupported type"
                );
                return None;
            }
        };
        Some(OptionContract {
            ticker: self.ticker,
            underlying_ticker: self.underlying_ticker,
            contract_type,
            strike_price: self.strike_price,
            expiration_date: self.expiration_date,
            premium: self.premium,
            delta: self.delta,
            open_interest: self.open_interest,
            implied_volatility: self.implied_volatility,
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct ContractsResponse {
    #[serde(default)]
    pub results: Vec<PolygonContract>,
    #[serde(default)]
    pub next_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_into_quote() {
        let body = r#"{
            "status": "OK",
            "request_id": "abc",
            "ticker": {
                "ticker": "AAPL",
                "todaysChange": 1.5,
                "todaysChangePerc": 1.01,
                "updated": 1700000000000000000,
                "day": {"o": 149.0, "h": 151.0, "l": 148.5, "c": 150.2, "v": 51000000, "vw": 150.0},
                "lastTrade": {"c": [14, 41], "i": "1", "p": 150.25, "s": 100, "t": 1700000000000000000, "x": 4},
                "min": {"o": 150.0, "h": 150.3, "l": 150.0, "c": 150.2, "v": 1000, "vw": 150.1},
                "prevDay": {"o": 147.0, "h": 149.0, "l": 146.0, "c": 148.7, "v": 48000000, "vw": 148.0}
            }
        }"#;
        let response: SnapshotResponse = serde_json::from_str(body).unwrap();
        let quote = response.ticker.unwrap().into_quote().unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.last_price, 150.25);
        assert_eq!(quote.prev_day.close, 148.7);
        assert_eq!(quote.day.volume, 51_000_000.0);
        assert_eq!(quote.updated.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn quote_falls_back_to_closes_without_last_trade() {
        let body = r#"{"ticker": "MSFT", "day": {"c": 0}, "prevDay": {"c": 410.5}}"#;
        let ticker: SnapshotTicker = serde_json::from_str(body).unwrap();
        assert_eq!(ticker.into_quote().unwrap().last_price, 410.5);

        let empty: SnapshotTicker = serde_json::from_str(r#"{"ticker": "NONE"}"#).unwrap();
        assert!(matches!(
            empty.into_quote().unwrap_err(),
            ProviderError::Decode { .. }
        ));
    }

    #[test]
    fn aggregates_are_sorted_and_missing_results_are_empty() {
        let body = r#"{
            "ticker": "AAPL",
            "results": [
                {"v": 2, "vw": 10.5, "o": 10, "c": 11, "h": 12, "l": 9, "t": 1700086400000, "n": 5},
                {"v": 1, "o": 9, "c": 10, "h": 10, "l": 8, "t": 1700000000000}
            ]
        }"#;
        let bars = serde_json::from_str::<AggsResponse>(body).unwrap().into_bars();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp_ms < bars[1].timestamp_ms);
        assert_eq!(bars[0].vwap, None);
        assert_eq!(bars[1].vwap, Some(10.5));

        let none = serde_json::from_str::<AggsResponse>(r#"{"status": "OK", "resultsCount": 0}"#)
            .unwrap()
            .into_bars();
        assert!(none.is_empty());
    }

    #[test]
    fn contract_decodes_without_market_fields() {
        let body = r#"{
            "results": [
                {
                    "cfi": "OPASPS",
                    "contract_type": "put",
                    "exercise_style": "american",
                    "expiration_date": "2025-10-24",
                    "primary_exchange": "BATO",
                    "shares_per_contract": 100,
                    "strike_price": 142.5,
                    "ticker": "O:AAPL251024P00142500",
                    "underlying_ticker": "AAPL"
                },
                {
                    "contract_type": "other",
                    "expiration_date": "2025-10-24",
                    "strike_price": 100,
                    "ticker": "O:AAPL251024X00100000",
                    "underlying_ticker": "AAPL"
                }
            ],
            "status": "OK",
            "next_url": "https://api.polygon.io/v3/reference/options/contracts?cursor=YXA9"
        }"#;
        let response: ContractsResponse = serde_json::from_str(body).unwrap();
        assert!(response.next_url.is_some());

        let contracts: Vec<OptionContract> = response
            .results
            .into_iter()
            .filter_map(PolygonContract::into_contract)
            .collect();
        assert_eq!(contracts.len(), 1);

        insta::assert_json_snapshot!(contracts[0], @r#"
        {
          "ticker": "O:AAPL251024P00142500",
          "underlying_ticker": "AAPL",
          "contract_type": "put",
          "strike_price": 142.5,
          "expiration_date": "2025-10-24"
        }
        "#);
    }
}
