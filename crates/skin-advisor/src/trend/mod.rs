//! Trend Analysis
//!
//! Pure statistics over a price series plus the orchestrating sweep that
//! persists results.

mod analyzer;
mod calculator;

pub use analyzer::{AnalysisReport, DEFAULT_WINDOW_DAYS, TrendAnalyzer};
pub use calculator::{
    TrendCalculator, growth_rate, predicted_growth, recommendation, trend_score, volatility,
};
