use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    models::{
        bar::HistoricalBar,
        option_contract::OptionContract,
        quote::Quote,
        request_params::{DailyBarsParams, OptionsChainParams, normalize_symbol},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DecodeSnafu, InvalidBaseUrlSnafu, MarketDataProvider,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        polygon_rest::{
            params::{
                API_KEY_PARAM, OPTIONS_CONTRACTS_PATH, daily_bars_path, daily_bars_query,
                options_chain_query, snapshot_path,
            },
            response::{AggsResponse, ContractsResponse, PolygonContract, SnapshotResponse},
        },
    },
    retry::{DEFAULT_RETRY_DELAY, RateLimitRetry},
};

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Environment variable holding the Polygon API key.
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

/// Request allowance of Polygon's free plan.
pub const FREE_TIER_REQUESTS_PER_MINUTE: NonZeroU32 = nonzero!(5u32);

/// Per-request timeout applied by the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`PolygonProvider`].
#[derive(Debug, Clone)]
pub struct PolygonConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry_delay: Duration,
    /// Client-side throttle. `None` disables it.
    pub requests_per_minute: Option<NonZeroU32>,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            requests_per_minute: None,
        }
    }
}

pub struct PolygonProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    retry: RateLimitRetry,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl PolygonProvider {
    /// Creates a provider with default settings.
    ///
    /// Reads the API key from the `POLYGON_API_KEY` environment variable.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_config(PolygonConfig::default())
    }

    /// Creates a provider with explicit settings, reading the key from the environment.
    pub fn with_config(config: PolygonConfig) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?.into());
        Self::with_api_key(api_key, config)
    }

    pub fn with_api_key(
        api_key: SecretString,
        config: PolygonConfig,
    ) -> Result<Self, ProviderInitError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return InvalidBaseUrlSnafu { url: base_url }.fail();
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        let limiter = config
            .requests_per_minute
            .map(|rpm| RateLimiter::direct(Quota::per_minute(rpm)));

        info!(
            %base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            throttle_rpm = config.requests_per_minute.map(NonZeroU32::get),
            "polygon provider ready"
        );

        Ok(Self {
            client,
            base_url,
            api_key,
            retry: RateLimitRetry::once_after(config.retry_delay),
            limiter,
        })
    }

    /// GET `url` with the rate-limit retry applied and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ProviderError> {
        self.retry
            .run(move |attempt| self.send_once(url, query, attempt))
            .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        attempt: u32,
    ) -> Result<T, ProviderError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        debug!(url, attempt, "polygon request");

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[(API_KEY_PARAM, self.api_key.expose_secret())])
            .send()
            .await
            // The request URL carries the key; keep it out of error messages.
            .map_err(reqwest::Error::without_url)
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context(ReqwestSnafu)?;
        serde_json::from_str(&body).map_err(|e| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let symbol = normalize_symbol(symbol)?;
        let response: SnapshotResponse = self.get_json(&self.url(&snapshot_path(&symbol)), &[]).await?;

        match response.ticker {
            Some(ticker) => ticker.into_quote(),
            None => DecodeSnafu {
                message: format!(
                    "snapshot for {symbol} has no ticker (status {})",
                    response.status.as_deref().unwrap_or("unknown")
                ),
            }
            .fail(),
        }
    }

    async fn fetch_daily_bars(
        &self,
        params: DailyBarsParams,
    ) -> Result<Vec<HistoricalBar>, ProviderError> {
        params.validate()?;
        let symbol = normalize_symbol(&params.symbol)?;

        let url = self.url(&daily_bars_path(&symbol, params.from, params.to));
        let response: AggsResponse = self.get_json(&url, &daily_bars_query()).await?;
        let bars = response.into_bars();

        debug!(%symbol, count = bars.len(), "daily bars fetched");
        Ok(bars)
    }

    async fn fetch_options_chain(
        &self,
        params: OptionsChainParams,
    ) -> Result<Vec<OptionContract>, ProviderError> {
        params.validate()?;
        let underlying = normalize_symbol(&params.underlying)?;
        let params = OptionsChainParams {
            underlying,
            ..params
        };

        let mut contracts: Vec<PolygonContract> = Vec::new();
        let mut page: ContractsResponse = self
            .get_json(&self.url(OPTIONS_CONTRACTS_PATH), &options_chain_query(&params))
            .await?;
        let mut pages = 1;

        loop {
            contracts.append(&mut page.results);
            match page.next_url.take() {
                // `next_url` already encodes the cursor and filters.
                Some(next) if pages < params.max_pages => {
                    page = self.get_json(&next, &[]).await?;
                    pages += 1;
                }
                _ => break,
            }
        }

        let chain: Vec<OptionContract> = contracts
            .into_iter()
            .filter_map(PolygonContract::into_contract)
            .collect();

        debug!(
            underlying = %params.underlying,
            pages,
            count = chain.len(),
            "options chain fetched"
        );
        Ok(chain)
    }
}
