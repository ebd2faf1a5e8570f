//! In-memory market store (for development and tests)

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ItemCatalog, PriceStore, TrendQuery, TrendRepository};
use crate::error::{AdvisorError, Result};
use crate::model::{
    Item, ItemId, ItemTrend, NewItem, PriceObservation, PriceSeries, TrendRecord, implied_roi,
};

#[derive(Default)]
struct Tables {
    items: BTreeMap<ItemId, Item>,
    by_hash_name: HashMap<String, ItemId>,
    prices: HashMap<ItemId, Vec<PriceObservation>>,
    trends: HashMap<ItemId, TrendRecord>,
    next_id: ItemId,
}

impl Tables {
    fn join(&self, record: &TrendRecord) -> Option<ItemTrend> {
        let item = self.items.get(&record.item_id)?;
        let current_price = self
            .prices
            .get(&record.item_id)
            .and_then(|p| p.last())
            .map_or(Decimal::ZERO, |o| o.price);

        Some(ItemTrend {
            item_id: item.id,
            hash_name: item.hash_name.clone(),
            market_name: item.market_name.clone(),
            category: item.category,
            image_url: item.image_url.clone(),
            current_price,
            growth_rate: record.growth_rate,
            growth_source: record.growth_source,
            volatility: record.volatility,
            trend_score: record.trend_score,
            recommendation: record.recommendation,
            predicted_growth: record.predicted_growth,
            expected_roi: None,
            data_points: record.data_points,
            analyzed_at: record.analyzed_at,
        })
    }
}

/// Catalog, price history and trend rows behind a single lock
pub struct MemoryMarketStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMarketStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_id: 1,
                ..Tables::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AdvisorError::Storage("market store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AdvisorError::Storage("market store lock poisoned".into()))
    }
}

impl ItemCatalog for MemoryMarketStore {
    fn upsert_item(&self, item: &NewItem) -> Result<ItemId> {
        let mut tables = self.write()?;
        let now = Utc::now();

        if let Some(&id) = tables.by_hash_name.get(&item.hash_name) {
            if let Some(existing) = tables.items.get_mut(&id) {
                existing.market_name.clone_from(&item.market_name);
                existing.category = item.category;
                existing.image_url.clone_from(&item.image_url);
                existing.updated_at = now;
            }
            return Ok(id);
        }

        let id = tables.next_id;
        tables.next_id += 1;
        tables.by_hash_name.insert(item.hash_name.clone(), id);
        tables.items.insert(
            id,
            Item {
                id,
                hash_name: item.hash_name.clone(),
                market_name: item.market_name.clone(),
                category: item.category,
                image_url: item.image_url.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    fn items_with_history(&self) -> Result<Vec<Item>> {
        let tables = self.read()?;
        Ok(tables
            .items
            .values()
            .filter(|item| tables.prices.get(&item.id).is_some_and(|p| !p.is_empty()))
            .cloned()
            .collect())
    }

    fn item_count(&self) -> Result<usize> {
        Ok(self.read()?.items.len())
    }
}

impl PriceStore for MemoryMarketStore {
    fn record(&self, item_id: ItemId, observation: PriceObservation) -> Result<()> {
        let mut tables = self.write()?;
        if !tables.items.contains_key(&item_id) {
            return Err(AdvisorError::ItemNotFound(item_id));
        }

        let history = tables.prices.entry(item_id).or_default();
        let at = history.partition_point(|o| o.recorded_at <= observation.recorded_at);
        history.insert(at, observation);
        Ok(())
    }

    fn series(&self, item_id: ItemId, since: DateTime<Utc>) -> Result<PriceSeries> {
        let tables = self.read()?;
        let observations = tables
            .prices
            .get(&item_id)
            .map(|history| {
                let start = history.partition_point(|o| o.recorded_at < since);
                history[start..].to_vec()
            })
            .unwrap_or_default();
        Ok(PriceSeries::new(observations))
    }

    fn latest_price(&self, item_id: ItemId) -> Result<Option<Decimal>> {
        Ok(self
            .read()?
            .prices
            .get(&item_id)
            .and_then(|p| p.last())
            .map(|o| o.price))
    }

    fn observation_count(&self, item_id: ItemId) -> Result<usize> {
        Ok(self.read()?.prices.get(&item_id).map_or(0, Vec::len))
    }
}

impl TrendRepository for MemoryMarketStore {
    fn upsert(&self, record: &TrendRecord) -> Result<()> {
        let mut tables = self.write()?;
        if !tables.items.contains_key(&record.item_id) {
            return Err(AdvisorError::ItemNotFound(record.item_id));
        }
        tables.trends.insert(record.item_id, record.clone());
        Ok(())
    }

    fn trend(&self, item_id: ItemId) -> Result<Option<ItemTrend>> {
        let tables = self.read()?;
        Ok(tables.trends.get(&item_id).and_then(|r| tables.join(r)))
    }

    fn top(&self, query: &TrendQuery) -> Result<Vec<ItemTrend>> {
        let tables = self.read()?;

        let mut ranked: Vec<ItemTrend> = tables
            .trends
            .values()
            .filter(|r| r.trend_score >= query.min_score)
            .filter(|r| query.recommendation.is_none_or(|rec| r.recommendation == rec))
            .filter(|r| query.min_expected_roi.is_none_or(|min| implied_roi(r.growth_rate) >= min))
            .filter_map(|r| tables.join(r))
            .filter(|t| query.category.is_none_or(|c| t.category == c))
            .collect();

        ranked.sort_by(|a, b| {
            b.trend_score
                .cmp(&a.trend_score)
                .then_with(|| b.growth_rate.total_cmp(&a.growth_rate))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        ranked.truncate(query.limit);

        if query.min_expected_roi.is_some() {
            for trend in &mut ranked {
                trend.expected_roi = Some(trend.implied_roi());
            }
        }

        Ok(ranked)
    }
}
