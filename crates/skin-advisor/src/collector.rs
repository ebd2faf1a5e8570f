//! Price Collector
//!
//! One collection cycle: pull the upstream price list, classify each entry,
//! upsert it into the catalog and append its price to the history.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::{CategoryClassifier, KeywordClassifier};
use crate::error::{AdvisorError, Result};
use crate::market::{MarketClient, PriceItem};
use crate::model::{NewItem, PriceObservation};
use crate::store::{ItemCatalog, PriceStore};

/// Outcome of one collection cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    /// Entries in the upstream response
    pub received: usize,
    pub stored: usize,
    /// Unparsable or non-positive prices, nameless entries and store failures
    pub rejected: usize,
}

pub struct Collector {
    client: Arc<dyn MarketClient>,
    catalog: Arc<dyn ItemCatalog>,
    prices: Arc<dyn PriceStore>,
    classifier: Arc<dyn CategoryClassifier>,
}

impl Collector {
    pub fn new(
        client: Arc<dyn MarketClient>,
        catalog: Arc<dyn ItemCatalog>,
        prices: Arc<dyn PriceStore>,
    ) -> Self {
        Self {
            client,
            catalog,
            prices,
            classifier: Arc::new(KeywordClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn CategoryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run one cycle. Upstream failures abort the cycle; bad entries are counted.
    pub async fn collect_once(&self) -> Result<CollectionReport> {
        tracing::info!(source = self.client.name(), "collecting prices");

        let snapshot = self.client.fetch_prices().await?;
        if !snapshot.success {
            return Err(AdvisorError::MarketApi("price list response reported failure".into()));
        }

        let now = Utc::now();
        let mut report = CollectionReport {
            received: snapshot.items.len(),
            ..CollectionReport::default()
        };

        for entry in &snapshot.items {
            match self.store_entry(entry, now) {
                Ok(()) => report.stored += 1,
                Err(e @ (AdvisorError::InvalidPrice(_) | AdvisorError::MarketApi(_))) => {
                    report.rejected += 1;
                    tracing::trace!(item = %entry.market_hash_name, error = %e, "entry rejected");
                }
                Err(e) => {
                    report.rejected += 1;
                    tracing::warn!(item = %entry.market_hash_name, error = %e, "failed to store price");
                }
            }
        }

        tracing::info!(
            received = report.received,
            stored = report.stored,
            rejected = report.rejected,
            "collection complete"
        );

        Ok(report)
    }

    fn store_entry(&self, entry: &PriceItem, at: DateTime<Utc>) -> Result<()> {
        let name = entry.market_hash_name.trim();
        if name.is_empty() {
            return Err(AdvisorError::MarketApi("entry without market_hash_name".into()));
        }

        let price = Decimal::from_str(entry.price.trim())
            .map_err(|_| AdvisorError::InvalidPrice(entry.price.clone()))?;
        let observation = PriceObservation::new(price, at)?;

        let category = self.classifier.classify(name);
        let item_id = self.catalog.upsert_item(&NewItem::new(name, category))?;
        self.prices.record(item_id, observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketClient;
    use crate::model::Category;
    use crate::store::MemoryMarketStore;
    use rust_decimal_macros::dec;

    fn collector(client: MockMarketClient, store: &Arc<MemoryMarketStore>) -> Collector {
        Collector::new(Arc::new(client), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_bad_prices_are_skipped() {
        let store = Arc::new(MemoryMarketStore::new());
        let client = MockMarketClient::with_items(vec![
            PriceItem::new("AK-47 | Redline (Field-Tested)", "1450.50"),
            PriceItem::new("P250 | Sand Dune", "0"),
            PriceItem::new("Glock-18 | Fade", "-12"),
            PriceItem::new("MP9 | Starlight", "n/a"),
            PriceItem::new("", "10"),
        ]);

        let report = collector(client, &store).collect_once().await.unwrap();

        assert_eq!(report, CollectionReport { received: 5, stored: 1, rejected: 4 });
        assert_eq!(store.item_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_items_are_classified_and_priced() {
        let store = Arc::new(MemoryMarketStore::new());
        let client = MockMarketClient::with_items(vec![
            PriceItem::new("★ Karambit | Doppler (Factory New)", "98500"),
            PriceItem::new("Revolution Case", "87.10"),
        ]);

        collector(client, &store).collect_once().await.unwrap();

        let items = store.items_with_history().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, Category::Knives);
        assert_eq!(items[1].category, Category::Containers);
        assert_eq!(store.latest_price(items[1].id).unwrap(), Some(dec!(87.10)));
    }

    #[tokio::test]
    async fn test_repeated_cycles_append_history() {
        let store = Arc::new(MemoryMarketStore::new());
        let collector = collector(MockMarketClient::new(), &store);

        collector.collect_once().await.unwrap();
        collector.collect_once().await.unwrap();

        let items = store.items_with_history().unwrap();
        assert!(!items.is_empty());
        for item in items {
            assert_eq!(store.observation_count(item.id).unwrap(), 2);
        }
    }

    #[tokio::test]
    async fn test_unsuccessful_response_is_an_error() {
        let store = Arc::new(MemoryMarketStore::new());

        let result = collector(MockMarketClient::rejecting(), &store).collect_once().await;

        assert!(matches!(result, Err(AdvisorError::MarketApi(_))));
        assert_eq!(store.item_count().unwrap(), 0);
    }
}
