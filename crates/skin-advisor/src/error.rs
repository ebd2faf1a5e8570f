//! Error Types for Skin Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Empty price series; the item is skipped for this pass
    #[error("Insufficient price data")]
    InsufficientData,

    /// Degenerate statistics (zero mean, zero base price, non-finite input)
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Market API error: {0}")]
    MarketApi(String),

    #[error("Market API returned status {0}")]
    MarketStatus(u16),

    #[error("Rate limiter wait exceeded {0:?}")]
    RateLimitTimeout(std::time::Duration),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Errors that mean "skip this item", not "something is broken"
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }

    /// Check if error is retryable on the next cycle
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::MarketStatus(_)
                | Self::RateLimitTimeout(_)
                | Self::Storage(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientData => "Not enough price history yet.".into(),
            Self::ItemNotFound(id) => format!("Item {id} has not been analyzed yet."),
            Self::InvalidAllocation(msg) => format!("Cannot build a plan: {msg}"),
            Self::Storage(_) => "Market data is temporarily unavailable. Please try later.".into(),
            Self::Network(_) | Self::MarketApi(_) | Self::MarketStatus(_) | Self::RateLimitTimeout(_) => {
                "The market API is not responding right now.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
