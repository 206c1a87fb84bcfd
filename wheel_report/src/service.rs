//! Fetch orchestration: caching, concurrent sources, last request wins.

use std::sync::Arc;

use chrono::NaiveDate;
use market_data::{
    cache::{CHAIN_TTL, FreshnessCache, HISTORY_TTL, QUOTE_TTL},
    latest::{LatestSlot, Published},
    models::{
        bar::HistoricalBar,
        option_contract::OptionContract,
        quote::Quote,
        request_params::{DailyBarsParams, OptionsChainParams, normalize_symbol},
    },
    providers::{MarketDataProvider, ProviderError, polygon_rest::PolygonProvider},
};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ReportSection};
use crate::report::Report;

/// Serves reports for one provider.
///
/// Fetched data is reused while fresh (quote 60 s, chain 5 min, history
/// 1 h).
///
/// The service backs a single report view, so [`ReportService::report`]
/// keys its "last request wins" slot by the view rather than by symbol:
/// every call supersedes the calls still in flight, for the same symbol or
/// another one. Cached quotes, history and chains stay keyed per symbol.
pub struct ReportService<P> {
    provider: P,
    settings: ReportSection,
    quotes: FreshnessCache<Quote>,
    history: FreshnessCache<Vec<HistoricalBar>>,
    chains: FreshnessCache<Vec<OptionContract>>,
    latest: LatestSlot<Report>,
}

impl ReportService<PolygonProvider> {
    /// Builds a Polygon-backed service. Reads `POLYGON_API_KEY`.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, market_data::Error> {
        let provider_cfg = cfg
            .polygon
            .to_provider_config()
            .map_err(|e| market_data::Error::Config(e.to_string()))?;
        let provider = PolygonProvider::with_config(provider_cfg)?;
        Ok(Self::new(provider, cfg.report.clone()))
    }
}

impl<P: MarketDataProvider> ReportService<P> {
    pub fn new(provider: P, settings: ReportSection) -> Self {
        Self {
            provider,
            settings,
            quotes: FreshnessCache::new(QUOTE_TTL),
            history: FreshnessCache::new(HISTORY_TTL),
            chains: FreshnessCache::new(CHAIN_TTL),
            latest: LatestSlot::new(),
        }
    }

    pub fn settings(&self) -> &ReportSection {
        &self.settings
    }

    /// Current quote for `symbol`.
    pub async fn quote(&self, symbol: &str) -> Result<Arc<Quote>, ProviderError> {
        let symbol = normalize_symbol(symbol)?;
        if let Some(hit) = self.quotes.get_fresh(&symbol) {
            return Ok(hit);
        }
        let quote = self.provider.fetch_quote(&symbol).await?;
        Ok(self.quotes.insert(symbol, quote))
    }

    /// Daily bars for the configured number of days up to `as_of`.
    pub async fn daily_history(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<Arc<Vec<HistoricalBar>>, ProviderError> {
        let symbol = normalize_symbol(symbol)?;
        let params = DailyBarsParams::trailing(&symbol, as_of, self.settings.history_days);
        let key = format!("{symbol}:{}:{}", params.from, params.to);
        if let Some(hit) = self.history.get_fresh(&key) {
            return Ok(hit);
        }
        let bars = self.provider.fetch_daily_bars(params).await?;
        Ok(self.history.insert(key, bars))
    }

    /// Contracts on `symbol` expiring after `as_of`.
    pub async fn options_chain(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<Arc<Vec<OptionContract>>, ProviderError> {
        let symbol = normalize_symbol(symbol)?;
        let key = format!("{symbol}:{as_of}");
        if let Some(hit) = self.chains.get_fresh(&key) {
            return Ok(hit);
        }
        let chain = self
            .provider
            .fetch_options_chain(OptionsChainParams::new(&symbol, as_of))
            .await?;
        Ok(self.chains.insert(key, chain))
    }

    /// Fetches quote, history and chain concurrently and publishes the report.
    ///
    /// Returns `None` when a report for another request was started while
    /// this one was in flight; the newer one wins.
    pub async fn report(&self, symbol: &str, as_of: NaiveDate) -> Option<Arc<Published<Report>>> {
        let ticket = self.latest.begin();
        let display_symbol =
            normalize_symbol(symbol).unwrap_or_else(|_| symbol.trim().to_string());
        info!(symbol = %display_symbol, %as_of, ticket = ticket.generation(), "building report");

        let (quote, history, chain) = tokio::join!(
            self.quote(symbol),
            self.daily_history(symbol, as_of),
            self.options_chain(symbol, as_of),
        );

        let report = Report {
            symbol: display_symbol,
            as_of,
            quote,
            history,
            chain,
        };
        for (source, err) in report.failures() {
            warn!(symbol = %report.symbol, source, error = %err, "report source failed");
        }

        if !self.latest.publish(ticket, report) {
            return None;
        }
        self.latest.latest().filter(|p| p.ticket == ticket)
    }

    /// The most recently published report.
    pub fn latest_report(&self) -> Option<Arc<Published<Report>>> {
        self.latest.latest()
    }

    /// Forgets cached data so the next calls refetch.
    pub fn invalidate(&self) {
        debug!("clearing report caches");
        self.quotes.clear();
        self.history.clear();
        self.chains.clear();
    }
}
