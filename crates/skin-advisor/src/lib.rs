//! # skin-advisor
//!
//! Trend analysis and budget allocation for a skin marketplace.
//!
//! Prices are collected periodically from the upstream market, each item's
//! recent history is scored, and a budget is spread over the best BUY-rated
//! items with fixed per-category weights.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   every 10m   ┌───────────┐   ┌──────────────┐
//! │ MarketClient │ ────────────► │ Collector │ ─►│  PriceStore  │
//! └──────────────┘               └───────────┘   │  ItemCatalog │
//!                                                └──────┬───────┘
//!                                       every 30m       │ 30-day series
//!                                                ┌──────▼────────┐
//!                                                │ TrendAnalyzer │
//!                                                └──────┬────────┘
//!                                                       │ upsert
//!                                                ┌──────▼──────────┐
//!                                                │ TrendRepository │
//!                                                └──────┬──────────┘
//!                                                       │ top(BUY, roi ≥ 2.1)
//!                                                ┌──────▼──────────┐
//!                                                │ BudgetAdvisor   │
//!                                                └─────────────────┘
//! ```
//!
//! ## Example: 10 000 budget
//!
//! ```text
//! │  knives     ████████████████████  4000 (40%)
//! │  weapons    ███████████████       3000 (30%)
//! │  containers ███████               1500 (15%)
//! │  gloves     █████                 1000 (10%)
//! │  stickers   ██                     500  (5%)
//! ```

pub mod classifier;
pub mod collector;
pub mod error;
pub mod market;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod strategy;
pub mod trend;

pub use classifier::{CategoryClassifier, KeywordClassifier};
pub use collector::{CollectionReport, Collector};
pub use error::{AdvisorError, Result};
pub use model::{
    Category, GrowthSource, Item, ItemId, ItemTrend, PriceObservation, PriceSeries,
    Recommendation, TrendRecord, TrendStats,
};
pub use scheduler::ScheduleConfig;
pub use store::{ItemCatalog, MemoryMarketStore, PriceStore, TrendQuery, TrendRepository};
pub use strategy::{AllocationPlan, BudgetAdvisor, BudgetAllocation, PortfolioAllocator};
pub use trend::{AnalysisReport, TrendAnalyzer, TrendCalculator};
