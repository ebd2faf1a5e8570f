//! Error Types

use rust_decimal::Decimal;
use skin_advisor::{AdvisorError, ItemId};
use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug)]
pub enum BotError {
    /// Failure inside analysis, storage or allocation
    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    #[error("Budget {0} is below the minimum")]
    BudgetTooLow(Decimal),

    #[error("Budget {0} is above the maximum")]
    BudgetTooHigh(Decimal),

    /// Item exists but has no trend row yet (or does not exist)
    #[error("No analysis for item {0}")]
    NotAnalyzed(ItemId),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Advisor(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Convert to a chat-friendly message. Budget limits are filled in by the caller.
    pub fn user_message(&self) -> String {
        match self {
            Self::Advisor(e) => format!("❌ {}", e.user_message()),
            Self::NotAnalyzed(_) => "❌ No analysis for this item yet. Try /analyze.".into(),
            Self::BudgetTooLow(_) | Self::BudgetTooHigh(_) => "❌ Budget out of range.".into(),
            Self::Config(_) => "❌ The bot is misconfigured.".into(),
        }
    }
}
