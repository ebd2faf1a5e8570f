//! Storage Surfaces
//!
//! Query interfaces for the price history, the item catalog and the trend
//! repository. The analyzer and the bot only see these traits; the in-memory
//! store is the development backend.

mod memory;

pub use memory::MemoryMarketStore;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Category, Item, ItemId, ItemTrend, NewItem, PriceObservation, PriceSeries, Recommendation,
    TrendRecord,
};

/// Item identity storage
pub trait ItemCatalog: Send + Sync {
    /// Insert or refresh an item keyed by hash name, returning its id
    fn upsert_item(&self, item: &NewItem) -> Result<ItemId>;

    /// Get item by id
    fn item(&self, id: ItemId) -> Result<Option<Item>>;

    /// Items that have at least one recorded price, ordered by id
    fn items_with_history(&self) -> Result<Vec<Item>>;

    /// Number of catalogued items
    fn item_count(&self) -> Result<usize>;
}

/// Timestamped price observations per item
pub trait PriceStore: Send + Sync {
    /// Append an observation
    fn record(&self, item_id: ItemId, observation: PriceObservation) -> Result<()>;

    /// Observations recorded at or after `since`, ascending
    fn series(&self, item_id: ItemId, since: DateTime<Utc>) -> Result<PriceSeries>;

    /// Most recent price, if any
    fn latest_price(&self, item_id: ItemId) -> Result<Option<Decimal>>;

    /// Total observations for an item
    fn observation_count(&self, item_id: ItemId) -> Result<usize>;
}

/// Latest computed trend per item
pub trait TrendRepository: Send + Sync {
    /// Insert or overwrite the trend row for `record.item_id`
    fn upsert(&self, record: &TrendRecord) -> Result<()>;

    /// Latest trend for one item
    fn trend(&self, item_id: ItemId) -> Result<Option<ItemTrend>>;

    /// Ranked trends: score desc, then growth desc, then item id asc
    fn top(&self, query: &TrendQuery) -> Result<Vec<ItemTrend>>;
}

/// Filters for ranked trend retrieval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendQuery {
    pub limit: usize,
    pub min_score: u8,
    pub category: Option<Category>,
    pub recommendation: Option<Recommendation>,
    /// Minimum `1 + growth_rate/100`; also attaches `expected_roi` to results
    pub min_expected_roi: Option<Decimal>,
}

/// Default score floor for ranked listings
pub const DEFAULT_MIN_SCORE: u8 = 6;

impl TrendQuery {
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            min_score: DEFAULT_MIN_SCORE,
            category: None,
            recommendation: None,
            min_expected_roi: None,
        }
    }

    /// BUY-rated items whose implied ROI reaches `min_roi`
    pub const fn investment(limit: usize, min_roi: Decimal) -> Self {
        Self {
            limit,
            min_score: DEFAULT_MIN_SCORE,
            category: None,
            recommendation: Some(Recommendation::Buy),
            min_expected_roi: Some(min_roi),
        }
    }

    pub const fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub const fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score;
        self
    }
}
