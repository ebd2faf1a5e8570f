//! Application State

use std::sync::Arc;

use skin_advisor::{BudgetAdvisor, ItemCatalog, MemoryMarketStore, TrendAnalyzer, TrendRepository};
use skin_bot::BotService;

use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Item identities, for counts
    pub catalog: Arc<dyn ItemCatalog>,

    /// Ranked trend rows
    pub trends: Arc<dyn TrendRepository>,

    /// Sweep runner shared with the analysis loop
    pub analyzer: Arc<TrendAnalyzer>,

    /// Chat command layer (owns the budget advisor)
    pub bot: Arc<BotService>,

    /// Name of the upstream price source
    pub market_source: String,
}

impl AppState {
    pub fn new(store: &Arc<MemoryMarketStore>, config: &AppConfig, market_source: impl Into<String>) -> Self {
        let analyzer = Arc::new(
            TrendAnalyzer::new(store.clone(), store.clone(), store.clone())
                .with_window(chrono::Duration::days(config.analysis_window_days)),
        );
        let advisor = BudgetAdvisor::new(store.clone()).with_min_expected_roi(config.min_expected_roi);
        let bot = BotService::new(
            store.clone(),
            store.clone(),
            analyzer.clone(),
            advisor,
            config.bot.clone(),
        );

        Self {
            catalog: store.clone(),
            trends: store.clone(),
            analyzer,
            bot: Arc::new(bot),
            market_source: market_source.into(),
        }
    }
}
