//! Mock Market Client
//!
//! For testing and demo purposes. Serves a fixed catalog whose prices drift
//! by a fixed percentage on every fetch, so repeated collection builds up a
//! history with visible trends.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{MarketClient, PriceItem, PriceSnapshot};
use crate::error::{AdvisorError, Result};

/// (hash name, base price, drift % per fetch)
const DEMO_CATALOG: &[(&str, Decimal, Decimal)] = &[
    ("★ Karambit | Doppler (Factory New)", dec!(98500), dec!(2.5)),
    ("★ Butterfly Knife | Fade (Factory New)", dec!(142000), dec!(1.2)),
    ("★ Sport Gloves | Vice (Minimal Wear)", dec!(61000), dec!(1.8)),
    ("AK-47 | Redline (Field-Tested)", dec!(1450), dec!(0.4)),
    ("AWP | Asiimov (Field-Tested)", dec!(7800), dec!(-1.5)),
    ("M4A1-S | Printstream (Minimal Wear)", dec!(12400), dec!(3.0)),
    ("Revolution Case", dec!(87), dec!(4.0)),
    ("Revolution Case Key", dec!(215), dec!(0.0)),
    ("Paris 2023 Legends Sticker Capsule", dec!(32), dec!(-2.0)),
    ("Sticker | Natus Vincere (Holo) | Paris 2023", dec!(390), dec!(1.0)),
    ("Charm | Baby Karat", dec!(640), dec!(0.8)),
];

enum Feed {
    Drifting(Vec<(String, Decimal, Decimal)>),
    Fixed(Vec<PriceItem>),
    Rejected,
    Status(u16),
}

/// Mock market client with deterministic prices
pub struct MockMarketClient {
    feed: Feed,
    fetches: AtomicU32,
}

impl Default for MockMarketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketClient {
    /// Demo catalog with per-fetch drift
    pub fn new() -> Self {
        let listings = DEMO_CATALOG
            .iter()
            .map(|&(name, base, drift)| (name.to_string(), base, drift))
            .collect();
        Self::with_feed(Feed::Drifting(listings))
    }

    /// Serve exactly these entries on every fetch
    pub fn with_items(items: Vec<PriceItem>) -> Self {
        Self::with_feed(Feed::Fixed(items))
    }

    /// Respond with `success = false`
    pub fn rejecting() -> Self {
        Self::with_feed(Feed::Rejected)
    }

    /// Fail every fetch with an HTTP status
    pub fn failing_with_status(status: u16) -> Self {
        Self::with_feed(Feed::Status(status))
    }

    const fn with_feed(feed: Feed) -> Self {
        Self {
            feed,
            fetches: AtomicU32::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::Relaxed)
    }
}

fn drifted(base: Decimal, drift_percent: Decimal, step: u32) -> Decimal {
    let factor = Decimal::ONE + drift_percent / Decimal::ONE_HUNDRED * Decimal::from(step);
    (base * factor).max(dec!(0.01)).round_dp(2)
}

#[async_trait]
impl MarketClient for MockMarketClient {
    async fn fetch_prices(&self) -> Result<PriceSnapshot> {
        let step = self.fetches.fetch_add(1, Ordering::Relaxed);

        let items = match &self.feed {
            Feed::Drifting(listings) => listings
                .iter()
                .map(|(name, base, drift)| PriceItem::new(name.clone(), drifted(*base, *drift, step).to_string()))
                .collect(),
            Feed::Fixed(items) => items.clone(),
            Feed::Rejected => {
                return Ok(PriceSnapshot {
                    success: false,
                    ..PriceSnapshot::default()
                });
            }
            Feed::Status(status) => return Err(AdvisorError::MarketStatus(*status)),
        };

        Ok(PriceSnapshot {
            success: true,
            time: Utc::now().timestamp(),
            currency: "RUB".into(),
            items,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prices_drift_per_fetch() {
        let client = MockMarketClient::new();

        let first = client.fetch_prices().await.unwrap();
        let second = client.fetch_prices().await.unwrap();

        assert_eq!(client.fetch_count(), 2);
        assert_eq!(first.items[0].price, "98500.00");
        // 2.5% of 98500
        assert_eq!(second.items[0].price, "100962.50");
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let rejected = MockMarketClient::rejecting().fetch_prices().await.unwrap();
        assert!(!rejected.success);

        let failed = MockMarketClient::failing_with_status(503).fetch_prices().await;
        assert!(matches!(failed, Err(AdvisorError::MarketStatus(503))));
    }
}
