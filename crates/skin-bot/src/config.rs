//! Bot Configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use skin_advisor::store::DEFAULT_MIN_SCORE;

use crate::error::{BotError, Result};

/// Limits for listings and budget input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotConfig {
    pub min_budget: Decimal,
    pub max_budget: Decimal,

    /// Items per page in ranked lists
    pub page_size: usize,

    /// Items fetched for a ranked list (all pages together)
    pub list_limit: usize,

    pub min_score: u8,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            min_budget: dec!(1000),
            max_budget: dec!(10000000),
            page_size: 5,
            list_limit: 50,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl BotConfig {
    /// Reads `MIN_BUDGET` and `MAX_BUDGET`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let amount = |key: &str, fallback: Decimal| -> Result<Decimal> {
            match std::env::var(key) {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| BotError::Config(format!("{key} is not a number: {raw}"))),
                Err(_) => Ok(fallback),
            }
        };

        Self {
            min_budget: amount("MIN_BUDGET", defaults.min_budget)?,
            max_budget: amount("MAX_BUDGET", defaults.max_budget)?,
            ..defaults
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self> {
        if self.min_budget <= Decimal::ZERO || self.min_budget > self.max_budget {
            return Err(BotError::Config(format!(
                "budget bounds {}..={} are invalid",
                self.min_budget, self.max_budget
            )));
        }
        if self.page_size == 0 {
            return Err(BotError::Config("page size must be positive".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BotConfig::default().validated().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = BotConfig {
            min_budget: dec!(5000),
            max_budget: dec!(100),
            ..BotConfig::default()
        };
        assert!(matches!(config.validated(), Err(BotError::Config(_))));
    }
}
