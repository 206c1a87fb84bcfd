//! A fetched report and the figures derived from it.

use std::sync::Arc;

use chrono::NaiveDate;
use market_data::{
    models::{bar::HistoricalBar, option_contract::OptionContract, quote::Quote},
    providers::ProviderError,
};
use wheel_engine::{
    calculator::{WheelInput, WheelMetrics, compute_wheel_metrics},
    ladder::{ExpirationView, near_term},
    technicals::{QuoteSummary, SMA_WINDOW, SmaPoint, simple_moving_average},
};

use crate::config::ReportSection;

/// Everything fetched for one symbol.
///
/// Each source keeps its own result; a failed chain still leaves the quote
/// and history usable.
#[derive(Debug)]
pub struct Report {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub quote: Result<Arc<Quote>, ProviderError>,
    pub history: Result<Arc<Vec<HistoricalBar>>, ProviderError>,
    pub chain: Result<Arc<Vec<OptionContract>>, ProviderError>,
}

impl Report {
    /// Last traded price, when the quote was fetched.
    pub fn stock_price(&self) -> Option<f64> {
        self.quote.as_ref().ok().map(|q| q.last_price)
    }

    pub fn summary(&self) -> Option<QuoteSummary> {
        let quote = self.quote.as_ref().ok()?;
        let summary = QuoteSummary::from_quote(quote);
        Some(match &self.history {
            Ok(bars) => summary.with_history(bars),
            Err(_) => summary,
        })
    }

    pub fn moving_average(&self) -> Vec<SmaPoint> {
        match &self.history {
            Ok(bars) => simple_moving_average(bars, SMA_WINDOW),
            Err(_) => Vec::new(),
        }
    }

    /// Contracts inside the near-term horizon.
    pub fn near_term_chain(&self, settings: &ReportSection) -> Option<Vec<OptionContract>> {
        let chain = self.chain.as_ref().ok()?;
        Some(near_term(chain, self.as_of, settings.near_term_days))
    }

    /// Ladders over the near-term chain; needs both a price and a chain.
    pub fn expiration_view(&self, settings: &ReportSection) -> Option<ExpirationView> {
        let price = self.stock_price()?;
        let chain = self.near_term_chain(settings)?;
        Some(ExpirationView::new(chain, price, settings.ladder_size))
    }

    /// Calculator seeded from the current price.
    pub fn calculator(&self) -> Option<(WheelInput, WheelMetrics)> {
        let input = WheelInput::from_stock_price(self.stock_price()?);
        Some((input, compute_wheel_metrics(&input)))
    }

    /// Sources that failed, by name.
    pub fn failures(&self) -> Vec<(&'static str, &ProviderError)> {
        let mut failed = Vec::new();
        if let Err(e) = &self.quote {
            failed.push(("quote", e));
        }
        if let Err(e) = &self.history {
            failed.push(("history", e));
        }
        if let Err(e) = &self.chain {
            failed.push(("options chain", e));
        }
        failed
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use market_data::{
        models::{option_contract::ContractType, quote::SessionSummary},
        providers::ApiSnafu,
    };

    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.into(),
            last_price: price,
            todays_change: 1.5,
            todays_change_pct: 1.01,
            updated: None,
            day: SessionSummary {
                volume: 51_000_000.0,
                ..Default::default()
            },
            prev_day: SessionSummary {
                volume: 48_500_000.0,
                ..Default::default()
            },
        }
    }

    pub fn contract(side: ContractType, strike: f64, expiration: NaiveDate) -> OptionContract {
        OptionContract {
            ticker: format!("O:AAPL{}{side}{strike}", expiration.format("%y%m%d")),
            underlying_ticker: "AAPL".into(),
            contract_type: side,
            strike_price: strike,
            expiration_date: expiration,
            premium: None,
            delta: None,
            open_interest: None,
            implied_volatility: None,
        }
    }

    pub fn chain() -> Vec<OptionContract> {
        let near = date(2025, 10, 24);
        let later = date(2025, 10, 31);
        let far = date(2026, 1, 16);
        let mut chain = Vec::new();
        for strike in [135.0, 140.0, 142.5, 145.0, 150.0, 160.0] {
            chain.push(contract(ContractType::Put, strike, near));
            chain.push(contract(ContractType::Call, strike, near));
        }
        chain.push(contract(ContractType::Put, 145.0, later));
        chain.push(contract(ContractType::Put, 100.0, far));
        chain
    }

    pub fn bars(n: usize) -> Vec<HistoricalBar> {
        (0..n)
            .map(|i| HistoricalBar {
                timestamp_ms: 1_700_000_000_000 + i as i64 * 86_400_000,
                open: 150.0,
                high: 152.0,
                low: 148.0,
                close: 150.0,
                volume: 1_000_000.0,
                vwap: None,
            })
            .collect()
    }

    pub fn api_error() -> ProviderError {
        ApiSnafu {
            status: 500u16,
            message: "upstream down",
        }
        .build()
    }

    pub fn report() -> Report {
        Report {
            symbol: "AAPL".into(),
            as_of: date(2025, 10, 19),
            quote: Ok(Arc::new(quote("AAPL", 150.0))),
            history: Ok(Arc::new(bars(25))),
            chain: Ok(Arc::new(chain())),
        }
    }
}
