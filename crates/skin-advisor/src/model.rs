//! Domain Models
//!
//! Core data types for skin market tracking.
//! Uses `rust_decimal` for all monetary values - statistics are computed in `f64`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Item identifier assigned by the catalog
pub type ItemId = i64;

/// Closed set of item categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Knives,
    Weapons,
    Containers,
    Keys,
    Packages,
    Charms,
    Stickers,
    Gloves,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Knives,
        Self::Weapons,
        Self::Containers,
        Self::Gloves,
        Self::Keys,
        Self::Packages,
        Self::Stickers,
        Self::Charms,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Knives => "knives",
            Self::Weapons => "weapons",
            Self::Containers => "containers",
            Self::Keys => "keys",
            Self::Packages => "packages",
            Self::Charms => "charms",
            Self::Stickers => "stickers",
            Self::Gloves => "gloves",
        }
    }

    /// Parse a lowercase category slug
    pub fn parse(s: &str) -> Option<Self> {
        let slug = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == slug)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation label derived from score and growth
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a growth rate came from.
///
/// A single observation carries no growth signal; the calculator then falls
/// back to a price-tier default which must never be presented as measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSource {
    #[default]
    Measured,
    PriceTierHeuristic,
}

/// A single recorded price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Create an observation; prices must be strictly positive
    pub fn new(price: Decimal, recorded_at: DateTime<Utc>) -> Result<Self> {
        if price <= Decimal::ZERO {
            return Err(AdvisorError::InvalidPrice(price.to_string()));
        }
        Ok(Self { price, recorded_at })
    }
}

/// Price history for one item, ascending by `recorded_at`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Build a series, sorting by time. Equal timestamps keep insertion order.
    pub fn new(mut observations: Vec<PriceObservation>) -> Self {
        observations.sort_by_key(|o| o.recorded_at);
        Self { observations }
    }

    /// Series of prices stamped one minute apart, oldest first
    pub fn from_prices(prices: &[Decimal], start: DateTime<Utc>) -> Result<Self> {
        let observations = prices
            .iter()
            .zip(0i64..)
            .map(|(&price, i)| PriceObservation::new(price, start + chrono::Duration::minutes(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    /// Prices as `f64` for statistics
    pub fn prices_f64(&self) -> Result<Vec<f64>> {
        self.observations
            .iter()
            .map(|o| {
                o.price
                    .to_f64()
                    .filter(|p| p.is_finite())
                    .ok_or_else(|| AdvisorError::Computation(format!("price {} not representable", o.price)))
            })
            .collect()
    }
}

/// A catalogued item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub hash_name: String,
    pub market_name: String,
    pub category: Category,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item as seen by ingestion, before the catalog assigns an id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub hash_name: String,
    pub market_name: String,
    pub category: Category,
    pub image_url: String,
}

/// Base URL for Steam economy images
pub const IMAGE_BASE_URL: &str = "https://steamcommunity-a.akamaihd.net/economy/image/";

impl NewItem {
    pub fn new(hash_name: impl Into<String>, category: Category) -> Self {
        let hash_name = hash_name.into();
        Self {
            market_name: hash_name.clone(),
            hash_name,
            category,
            image_url: format!("{IMAGE_BASE_URL}placeholder"),
        }
    }
}

/// Computed trend statistics for one series
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    pub current_price: Decimal,
    pub growth_rate: f64,
    pub growth_source: GrowthSource,
    pub volatility: f64,
    pub trend_score: u8,
    pub recommendation: Recommendation,
    pub predicted_growth: f64,
    pub data_points: usize,
}

/// Row written to the trend repository (one per item, upserted)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub item_id: ItemId,
    pub growth_rate: f64,
    pub growth_source: GrowthSource,
    pub volatility: f64,
    pub trend_score: u8,
    pub recommendation: Recommendation,
    pub predicted_growth: f64,
    pub data_points: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl TrendRecord {
    pub fn from_stats(item_id: ItemId, stats: &TrendStats, analyzed_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            growth_rate: stats.growth_rate,
            growth_source: stats.growth_source,
            volatility: stats.volatility,
            trend_score: stats.trend_score,
            recommendation: stats.recommendation,
            predicted_growth: stats.predicted_growth,
            data_points: stats.data_points,
            analyzed_at,
        }
    }
}

/// Latest trend of an item, joined with its identity and current price
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTrend {
    pub item_id: ItemId,
    pub hash_name: String,
    pub market_name: String,
    pub category: Category,
    pub image_url: String,

    /// Latest observed price (zero when no price is stored)
    pub current_price: Decimal,

    /// Growth over the analysis window (%)
    pub growth_rate: f64,
    pub growth_source: GrowthSource,

    /// Coefficient of variation (%)
    pub volatility: f64,

    /// 1-10
    pub trend_score: u8,
    pub recommendation: Recommendation,

    /// Forecast growth over the next 7 periods (%)
    pub predicted_growth: f64,

    /// Only populated by investment-ranking queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_roi: Option<Decimal>,

    pub data_points: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl ItemTrend {
    /// `1 + growth_rate / 100` as a multiplier
    pub fn implied_roi(&self) -> Decimal {
        implied_roi(self.growth_rate)
    }

    /// ROI attached by the ranking query, or the implied one
    pub fn roi(&self) -> Decimal {
        self.expected_roi.unwrap_or_else(|| self.implied_roi())
    }
}

/// Expected ROI multiplier for a growth percentage.
///
/// Growth is converted to decimal first so `180.0` gives exactly `2.8`.
/// Non-representable growth counts as zero.
pub fn implied_roi(growth_rate: f64) -> Decimal {
    let growth = Decimal::from_f64(growth_rate).unwrap_or(Decimal::ZERO);
    Decimal::ONE + growth / Decimal::ONE_HUNDRED
}
