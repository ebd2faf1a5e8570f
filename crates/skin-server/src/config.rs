//! Server Configuration
//!
//! Everything comes from the environment (after `.env` is loaded).

use anyhow::Context;
use rust_decimal::Decimal;
use skin_advisor::ScheduleConfig;
use skin_advisor::market::MarketClientConfig;
use skin_advisor::strategy::DEFAULT_MIN_EXPECTED_ROI;
use skin_advisor::trend::DEFAULT_WINDOW_DAYS;
use skin_bot::BotConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,

    /// Serve the built-in demo catalog instead of calling the market API
    pub use_mock_market: bool,

    pub market: MarketClientConfig,
    pub schedule: ScheduleConfig,
    pub analysis_window_days: i64,
    pub min_expected_roi: Decimal,
    pub bot: BotConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            use_mock_market: true,
            market: MarketClientConfig::default(),
            schedule: ScheduleConfig::default(),
            analysis_window_days: DEFAULT_WINDOW_DAYS,
            min_expected_roi: DEFAULT_MIN_EXPECTED_ROI,
            bot: BotConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let market = MarketClientConfig::from_env();

        // no key means there is nothing real to talk to
        let use_mock_market = std::env::var("USE_MOCK_MARKET")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(market.api_key.is_empty());

        let analysis_window_days = match std::env::var("ANALYSIS_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .with_context(|| format!("ANALYSIS_WINDOW_DAYS must be a positive integer, got {raw}"))?,
            Err(_) => defaults.analysis_window_days,
        };

        let min_expected_roi = match std::env::var("MIN_EXPECTED_ROI") {
            Ok(raw) => raw
                .trim()
                .parse::<Decimal>()
                .with_context(|| format!("MIN_EXPECTED_ROI is not a number: {raw}"))?,
            Err(_) => defaults.min_expected_roi,
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            use_mock_market,
            market,
            schedule: ScheduleConfig::from_env(),
            analysis_window_days,
            min_expected_roi,
            bot: BotConfig::from_env().context("invalid bot configuration")?,
        })
    }
}
