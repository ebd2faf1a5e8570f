//! Market Integration
//!
//! Abstraction over the upstream price list plus the HTTP and mock clients.

mod http;
mod mock;

pub use http::{MarketApiClient, MarketClientConfig};
pub use mock::MockMarketClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Upstream price source
///
/// One implementation per marketplace; tests use [`MockMarketClient`].
#[async_trait]
pub trait MarketClient: Send + Sync {
    /// Fetch the full current price list
    async fn fetch_prices(&self) -> Result<PriceSnapshot>;

    /// Source name recorded in logs
    fn name(&self) -> &str;
}

/// Price list as returned by `/prices/{currency}.json`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub success: bool,
    /// Unix seconds
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub items: Vec<PriceItem>,
}

/// One listing; the API sends price and volume as strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceItem {
    pub market_hash_name: String,
    #[serde(default)]
    pub volume: Option<String>,
    pub price: String,
}

impl PriceItem {
    pub fn new(market_hash_name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            market_hash_name: market_hash_name.into(),
            volume: None,
            price: price.into(),
        }
    }
}
