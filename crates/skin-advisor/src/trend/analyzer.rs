//! Trend Analyzer
//!
//! Runs the calculator over every catalogued item and persists the results.
//!
//! ```text
//!   ItemCatalog ──items_with_history──┐
//!                                     ▼
//!   PriceStore ──series(since)──► TrendCalculator ──► TrendRepository
//!                                     │
//!                                     └── AnalysisReport {analyzed, skipped, failed}
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::calculator::TrendCalculator;
use crate::error::{AdvisorError, Result};
use crate::model::{Item, ItemTrend, TrendRecord};
use crate::store::{ItemCatalog, PriceStore, TrendRepository};

/// Default look-back window
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Outcome of one analysis sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analyzed: usize,
    /// Items with no price inside the window
    pub skipped: usize,
    pub failed: usize,
}

impl AnalysisReport {
    pub const fn total(&self) -> usize {
        self.analyzed + self.skipped + self.failed
    }
}

pub struct TrendAnalyzer {
    catalog: Arc<dyn ItemCatalog>,
    prices: Arc<dyn PriceStore>,
    trends: Arc<dyn TrendRepository>,
    calculator: TrendCalculator,
    window: chrono::Duration,
}

impl TrendAnalyzer {
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        prices: Arc<dyn PriceStore>,
        trends: Arc<dyn TrendRepository>,
    ) -> Self {
        Self {
            catalog,
            prices,
            trends,
            calculator: TrendCalculator::new(),
            window: chrono::Duration::days(DEFAULT_WINDOW_DAYS),
        }
    }

    pub const fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = window;
        self
    }

    pub const fn window(&self) -> chrono::Duration {
        self.window
    }

    /// Analyze one item and upsert its trend row
    pub fn analyze_item(&self, item: &Item) -> Result<ItemTrend> {
        let now = Utc::now();
        let series = self.prices.series(item.id, now - self.window())?;
        let stats = self.calculator.analyze(&series)?;

        self.trends
            .upsert(&TrendRecord::from_stats(item.id, &stats, now))?;

        Ok(ItemTrend {
            item_id: item.id,
            hash_name: item.hash_name.clone(),
            market_name: item.market_name.clone(),
            category: item.category,
            image_url: item.image_url.clone(),
            current_price: stats.current_price,
            growth_rate: stats.growth_rate,
            growth_source: stats.growth_source,
            volatility: stats.volatility,
            trend_score: stats.trend_score,
            recommendation: stats.recommendation,
            predicted_growth: stats.predicted_growth,
            expected_roi: None,
            data_points: stats.data_points,
            analyzed_at: now,
        })
    }

    /// Analyze every item with history. Per-item failures are counted, not returned.
    pub fn analyze_all(&self) -> Result<AnalysisReport> {
        let items = self.catalog.items_with_history()?;
        let mut report = AnalysisReport::default();

        tracing::info!(
            items = items.len(),
            window_days = self.window().num_days(),
            "starting trend analysis"
        );

        for item in &items {
            match self.analyze_item(item) {
                Ok(trend) => {
                    report.analyzed += 1;
                    tracing::trace!(
                        item_id = item.id,
                        score = trend.trend_score,
                        recommendation = %trend.recommendation,
                        "item analyzed"
                    );
                }
                Err(e) if e.is_skip() => {
                    report.skipped += 1;
                    tracing::debug!(item_id = item.id, "no prices in window, skipping");
                }
                Err(e @ AdvisorError::Computation(_)) => {
                    report.failed += 1;
                    tracing::debug!(item_id = item.id, error = %e, "degenerate series");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(item_id = item.id, error = %e, "failed to analyze item");
                }
            }
        }

        tracing::info!(
            analyzed = report.analyzed,
            skipped = report.skipped,
            failed = report.failed,
            "trend analysis complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ItemId, NewItem, PriceObservation, Recommendation};
    use crate::store::{MemoryMarketStore, TrendQuery};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn seed(store: &MemoryMarketStore, name: &str, prices: &[Decimal]) -> ItemId {
        let id = store.upsert_item(&NewItem::new(name, Category::Weapons)).unwrap();
        let start = Utc::now() - chrono::Duration::hours(1);
        for (i, &price) in (0i64..).zip(prices) {
            let at = start + chrono::Duration::minutes(i);
            store.record(id, PriceObservation::new(price, at).unwrap()).unwrap();
        }
        id
    }

    fn analyzer(store: &Arc<MemoryMarketStore>) -> TrendAnalyzer {
        TrendAnalyzer::new(store.clone(), store.clone(), store.clone())
    }

    /// Delegates to a memory store but refuses to persist one item
    struct FlakyTrends {
        inner: Arc<MemoryMarketStore>,
        reject: ItemId,
    }

    impl TrendRepository for FlakyTrends {
        fn upsert(&self, record: &TrendRecord) -> Result<()> {
            if record.item_id == self.reject {
                return Err(AdvisorError::Storage("disk full".into()));
            }
            self.inner.upsert(record)
        }

        fn trend(&self, item_id: ItemId) -> Result<Option<ItemTrend>> {
            self.inner.trend(item_id)
        }

        fn top(&self, query: &TrendQuery) -> Result<Vec<ItemTrend>> {
            self.inner.top(query)
        }
    }

    #[test]
    fn test_analyze_item_persists_trend() {
        let store = Arc::new(MemoryMarketStore::new());
        let id = seed(&store, "AK-47 | Redline", &[dec!(100), dec!(110), dec!(125)]);
        let item = store.item(id).unwrap().unwrap();

        let trend = analyzer(&store).analyze_item(&item).unwrap();

        assert_eq!(trend.current_price, dec!(125));
        assert!((trend.growth_rate - 25.0).abs() < 1e-9);
        assert_eq!(trend.data_points, 3);

        let stored = store.trend(id).unwrap().unwrap();
        assert_eq!(stored.trend_score, trend.trend_score);
        assert_eq!(stored.recommendation, trend.recommendation);
    }

    #[test]
    fn test_observations_outside_window_are_ignored() {
        let store = Arc::new(MemoryMarketStore::new());
        let id = store.upsert_item(&NewItem::new("AWP | Asiimov", Category::Weapons)).unwrap();
        let old = Utc::now() - chrono::Duration::days(45);
        store.record(id, PriceObservation::new(dec!(10), old).unwrap()).unwrap();
        let item = store.item(id).unwrap().unwrap();

        let result = analyzer(&store).analyze_item(&item);

        assert!(matches!(result, Err(AdvisorError::InsufficientData)));
        assert!(store.trend(id).unwrap().is_none());
    }

    #[test]
    fn test_custom_window_narrows_series() {
        let store = Arc::new(MemoryMarketStore::new());
        // observations start one hour ago
        seed(&store, "MP9 | Starlight Protector", &[dec!(40), dec!(44)]);

        let narrow = analyzer(&store).with_window(chrono::Duration::minutes(30));
        assert_eq!(narrow.window(), chrono::Duration::minutes(30));
        assert_eq!(narrow.analyze_all().unwrap(), AnalysisReport { analyzed: 0, skipped: 1, failed: 0 });

        let default = analyzer(&store);
        assert_eq!(default.window(), chrono::Duration::days(DEFAULT_WINDOW_DAYS));
        assert_eq!(default.analyze_all().unwrap().analyzed, 1);
    }

    #[test]
    fn test_sweep_counts_skips() {
        let store = Arc::new(MemoryMarketStore::new());
        seed(&store, "Glock-18 | Fade", &[dec!(200), dec!(260)]);
        let stale = store.upsert_item(&NewItem::new("P250 | Sand Dune", Category::Weapons)).unwrap();
        store
            .record(
                stale,
                PriceObservation::new(dec!(1), Utc::now() - chrono::Duration::days(60)).unwrap(),
            )
            .unwrap();

        let report = analyzer(&store).analyze_all().unwrap();

        assert_eq!(report, AnalysisReport { analyzed: 1, skipped: 1, failed: 0 });
    }

    #[test]
    fn test_sweep_continues_past_failing_item() {
        let store = Arc::new(MemoryMarketStore::new());
        let a = seed(&store, "USP-S | Kill Confirmed", &[dec!(300), dec!(330)]);
        let b = seed(&store, "Desert Eagle | Blaze", &[dec!(500), dec!(450)]);
        let c = seed(&store, "M4A1-S | Hot Rod", &[dec!(800), dec!(1000)]);

        let trends = Arc::new(FlakyTrends { inner: store.clone(), reject: b });
        let report = TrendAnalyzer::new(store.clone(), store.clone(), trends)
            .analyze_all()
            .unwrap();

        assert_eq!(report, AnalysisReport { analyzed: 2, skipped: 0, failed: 1 });
        assert_eq!(report.total(), 3);
        assert!(store.trend(a).unwrap().is_some());
        assert!(store.trend(b).unwrap().is_none());
        assert!(store.trend(c).unwrap().is_some());
    }

    #[test]
    fn test_rerun_overwrites_trend() {
        let store = Arc::new(MemoryMarketStore::new());
        let steady: Vec<Decimal> = (100..=130).map(Decimal::from).collect();
        let id = seed(&store, "★ Karambit | Fade", &steady);
        let analyzer = analyzer(&store);
        analyzer.analyze_all().unwrap();
        let first = store.trend(id).unwrap().unwrap();

        store
            .record(id, PriceObservation::new(dec!(50), Utc::now()).unwrap())
            .unwrap();
        analyzer.analyze_all().unwrap();
        let second = store.trend(id).unwrap().unwrap();

        assert_eq!(first.recommendation, Recommendation::Buy);
        assert_eq!(first.data_points, 31);
        assert_eq!(second.recommendation, Recommendation::Sell);
        assert_eq!(second.data_points, 32);
        assert_eq!(second.current_price, dec!(50));
    }
}
