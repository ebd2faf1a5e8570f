//! Budget Advisor
//!
//! Fetches ranked investment candidates and runs the allocator over them.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::allocation::{AllocationPlan, PortfolioAllocator};
use crate::error::Result;
use crate::store::{TrendQuery, TrendRepository};

/// Default ROI floor for candidates: 2.1x, i.e. at least 110% on top of the stake
pub const DEFAULT_MIN_EXPECTED_ROI: Decimal = dec!(2.1);

/// Candidates pulled from the repository per plan
pub const CANDIDATE_LIMIT: usize = 50;

pub struct BudgetAdvisor {
    trends: Arc<dyn TrendRepository>,
    allocator: PortfolioAllocator,
    min_expected_roi: Decimal,
}

impl BudgetAdvisor {
    pub fn new(trends: Arc<dyn TrendRepository>) -> Self {
        Self {
            trends,
            allocator: PortfolioAllocator::default(),
            min_expected_roi: DEFAULT_MIN_EXPECTED_ROI,
        }
    }

    pub fn with_allocator(mut self, allocator: PortfolioAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub const fn with_min_expected_roi(mut self, min_expected_roi: Decimal) -> Self {
        self.min_expected_roi = min_expected_roi;
        self
    }

    pub const fn min_expected_roi(&self) -> Decimal {
        self.min_expected_roi
    }

    /// Plan purchases for `budget`.
    ///
    /// A repository failure is returned as `Err`; no matching candidates gives
    /// `Ok` with an empty plan.
    pub fn plan(&self, budget: Decimal) -> Result<AllocationPlan> {
        let query = TrendQuery::investment(CANDIDATE_LIMIT, self.min_expected_roi);
        let candidates = self.trends.top(&query)?;

        tracing::debug!(
            %budget,
            candidates = candidates.len(),
            min_roi = %self.min_expected_roi,
            "planning budget"
        );

        self.allocator.allocate(budget, &candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use crate::model::{
        Category, GrowthSource, ItemId, ItemTrend, NewItem, PriceObservation, Recommendation,
        TrendRecord,
    };
    use crate::store::{ItemCatalog, MemoryMarketStore, PriceStore};
    use chrono::Utc;

    struct BrokenRepository;

    impl TrendRepository for BrokenRepository {
        fn upsert(&self, _record: &TrendRecord) -> Result<()> {
            Err(AdvisorError::Storage("down".into()))
        }

        fn trend(&self, _item_id: ItemId) -> Result<Option<ItemTrend>> {
            Err(AdvisorError::Storage("down".into()))
        }

        fn top(&self, _query: &TrendQuery) -> Result<Vec<ItemTrend>> {
            Err(AdvisorError::Storage("down".into()))
        }
    }

    fn seed(store: &MemoryMarketStore, name: &str, category: Category, price: Decimal, growth: f64, rec: Recommendation) {
        let id = store.upsert_item(&NewItem::new(name, category)).unwrap();
        store.record(id, PriceObservation::new(price, Utc::now()).unwrap()).unwrap();
        store
            .upsert(&TrendRecord {
                item_id: id,
                growth_rate: growth,
                growth_source: GrowthSource::Measured,
                volatility: 4.0,
                trend_score: 9,
                recommendation: rec,
                predicted_growth: 12.0,
                data_points: 25,
                analyzed_at: Utc::now(),
            })
            .unwrap();
    }

    #[test]
    fn test_fetch_failure_is_not_masked() {
        let advisor = BudgetAdvisor::new(Arc::new(BrokenRepository));
        assert!(matches!(advisor.plan(dec!(10000)), Err(AdvisorError::Storage(_))));
    }

    #[test]
    fn test_no_candidates_is_empty_plan() {
        let advisor = BudgetAdvisor::new(Arc::new(MemoryMarketStore::new()));
        let plan = advisor.plan(dec!(10000)).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_uses_investment_candidates_only() {
        let store = Arc::new(MemoryMarketStore::new());
        seed(&store, "★ Karambit | Fade", Category::Knives, dec!(1000), 180.0, Recommendation::Buy);
        seed(&store, "AK-47 | Redline", Category::Weapons, dec!(50), 40.0, Recommendation::Buy);
        seed(&store, "M4A4 | Howl", Category::Weapons, dec!(60), 300.0, Recommendation::Hold);

        let plan = BudgetAdvisor::new(store).plan(dec!(10000)).unwrap();

        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].market_name, "★ Karambit | Fade");
        assert_eq!(plan.lines[0].quantity, 3);
        assert_eq!(plan.lines[0].expected_roi, dec!(2.8));
    }
}
