//! HTTP Market Client
//!
//! Talks to the market.csgo.com v2 price endpoint through a token-bucket
//! limiter.
//!
//! ```text
//!   fetch_prices ──► limiter.until_ready (≤ acquire_timeout)
//!                       │
//!                       ▼
//!                GET {base}/prices/{currency}.json?key=…&v=2  (≤ request timeout)
//!                       │
//!                       ▼
//!                  PriceSnapshot
//! ```

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use super::{MarketClient, PriceSnapshot};
use crate::error::{AdvisorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://market.csgo.com/api/v2";

/// Market client configuration
#[derive(Clone, Debug)]
pub struct MarketClientConfig {
    pub api_key: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Price list currency code
    pub currency: String,

    /// Sustained request rate; burst is always 1
    pub requests_per_second: u32,

    /// Whole-request timeout
    pub timeout: Duration,

    /// Longest wait for a limiter token before the cycle is abandoned
    pub acquire_timeout: Duration,
}

impl Default for MarketClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            currency: "RUB".into(),
            requests_per_second: 4,
            timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl MarketClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = std::env::var("MARKET_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            api_key: std::env::var("MARKET_API_KEY").unwrap_or_default(),
            base_url: std::env::var("MARKET_API_URL").unwrap_or(defaults.base_url),
            currency: std::env::var("MARKET_CURRENCY").unwrap_or(defaults.currency),
            requests_per_second: std::env::var("MARKET_RATE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.requests_per_second),
            timeout,
            acquire_timeout: timeout,
        }
    }
}

/// Rate-limited client for the market price API
pub struct MarketApiClient {
    http: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
    config: MarketClientConfig,
}

impl MarketApiClient {
    pub fn new(config: MarketClientConfig) -> Result<Self> {
        let rate = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| AdvisorError::Config("market rate limit must be positive".into()))?;
        let limiter = RateLimiter::direct(Quota::per_second(rate).allow_burst(NonZeroU32::MIN));
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, limiter, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(MarketClientConfig::from_env())
    }

    pub const fn config(&self) -> &MarketClientConfig {
        &self.config
    }

    pub fn prices_url(&self) -> String {
        format!(
            "{}/prices/{}.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.currency
        )
    }

    /// Wait for a limiter token, bounded by `acquire_timeout`
    async fn throttle(&self) -> Result<()> {
        tokio::time::timeout(self.config.acquire_timeout, self.limiter.until_ready())
            .await
            .map_err(|_| AdvisorError::RateLimitTimeout(self.config.acquire_timeout))
    }
}

#[async_trait]
impl MarketClient for MarketApiClient {
    async fn fetch_prices(&self) -> Result<PriceSnapshot> {
        self.throttle().await?;

        let url = self.prices_url();
        tracing::debug!(%url, "fetching price list");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str()), ("v", "2")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::MarketStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let snapshot: PriceSnapshot = serde_json::from_str(&body)?;

        tracing::debug!(items = snapshot.items.len(), success = snapshot.success, "price list received");
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "market.csgo.com"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_is_rejected() {
        let config = MarketClientConfig {
            requests_per_second: 0,
            ..Default::default()
        };
        assert!(matches!(MarketApiClient::new(config), Err(AdvisorError::Config(_))));
    }

    #[test]
    fn test_prices_url() {
        let client = MarketApiClient::new(MarketClientConfig {
            base_url: "https://example.test/api/v2/".into(),
            currency: "USD".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.prices_url(), "https://example.test/api/v2/prices/USD.json");
    }

    #[tokio::test]
    async fn test_limiter_wait_is_time_boxed() {
        let client = MarketApiClient::new(MarketClientConfig {
            requests_per_second: 1,
            acquire_timeout: Duration::from_millis(20),
            ..Default::default()
        })
        .unwrap();

        // burst of one: the first token is free, the second is a second away
        client.throttle().await.unwrap();
        let second = client.throttle().await;

        assert!(matches!(second, Err(AdvisorError::RateLimitTimeout(_))));
    }
}
