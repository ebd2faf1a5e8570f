//! Category-Weighted Allocation
//!
//! Splits a budget across item categories by a fixed weight table and buys
//! greedily, in rank order, within each category's share.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Budget 10 000                                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  knives      ████████████████  4 000 (40%)               │
//! │  weapons     ████████████      3 000 (30%)               │
//! │  containers  ██████            1 500 (15%)               │
//! │  gloves      ████              1 000 (10%)               │
//! │  stickers    ██                  500 (5%)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a heuristic, not an optimizer: no knapsack, no LP. Each line is
//! capped at 3 units and a plan holds at most 8 lines.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::model::{Category, ItemId, ItemTrend, Recommendation};

/// Units of one item a single plan line may buy
pub const MAX_UNITS_PER_LINE: u32 = 3;

/// Lines per plan, across all categories
pub const MAX_PLAN_LINES: usize = 8;

/// Budget share per category, in iteration order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWeights(Vec<(Category, Decimal)>);

impl Default for CategoryWeights {
    fn default() -> Self {
        Self(vec![
            (Category::Knives, dec!(0.40)),
            (Category::Weapons, dec!(0.30)),
            (Category::Containers, dec!(0.15)),
            (Category::Gloves, dec!(0.10)),
            (Category::Stickers, dec!(0.05)),
        ])
    }
}

impl CategoryWeights {
    /// Custom table. Weights must be positive, unique per category and sum to at most 1.
    pub fn new(weights: Vec<(Category, Decimal)>) -> Result<Self> {
        let mut total = Decimal::ZERO;
        for (i, (category, weight)) in weights.iter().enumerate() {
            if *weight <= Decimal::ZERO {
                return Err(AdvisorError::InvalidAllocation(format!(
                    "weight for {category} must be positive"
                )));
            }
            if weights[..i].iter().any(|(c, _)| c == category) {
                return Err(AdvisorError::InvalidAllocation(format!(
                    "{category} listed twice"
                )));
            }
            total += weight;
        }
        if total > Decimal::ONE {
            return Err(AdvisorError::InvalidAllocation(format!(
                "weights sum to {total}, above 1"
            )));
        }
        Ok(Self(weights))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        self.0.iter().copied()
    }

    pub fn weight(&self, category: Category) -> Option<Decimal> {
        self.iter().find(|(c, _)| *c == category).map(|(_, w)| w)
    }
}

/// One purchase line of a plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub item_id: ItemId,
    pub market_name: String,
    pub category: Category,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub total_cost: Decimal,
    pub expected_roi: Decimal,
    pub expected_profit: Decimal,
    pub trend_score: u8,
    pub recommendation: Recommendation,
}

/// A budget-constrained purchase plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub budget: Decimal,
    pub lines: Vec<BudgetAllocation>,
    pub total_cost: Decimal,
    pub expected_profit: Decimal,
}

impl AllocationPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Unspent budget
    pub fn remaining(&self) -> Decimal {
        self.budget - self.total_cost
    }

    /// Return on the invested amount as a percentage (`(cost + profit) / cost * 100`).
    /// `None` for an empty plan or when the percentage is not representable.
    pub fn overall_roi(&self) -> Option<Decimal> {
        self.total_cost
            .checked_add(self.expected_profit)?
            .checked_div(self.total_cost)?
            .checked_mul(dec!(100))
    }
}

impl BudgetAllocation {
    /// `expected_roi` as a percentage, `None` when not representable
    pub fn roi_percent(&self) -> Option<Decimal> {
        self.expected_roi.checked_mul(Decimal::ONE_HUNDRED)
    }
}

fn profit_overflow(item_id: ItemId, roi: Decimal) -> AdvisorError {
    AdvisorError::Computation(format!("expected profit of item {item_id} overflows at roi {roi}"))
}

/// Greedy category-weighted allocator
#[derive(Clone, Debug)]
pub struct PortfolioAllocator {
    weights: CategoryWeights,
    max_units_per_line: u32,
    max_lines: usize,
}

impl Default for PortfolioAllocator {
    fn default() -> Self {
        Self::new(CategoryWeights::default())
    }
}

impl PortfolioAllocator {
    pub const fn new(weights: CategoryWeights) -> Self {
        Self {
            weights,
            max_units_per_line: MAX_UNITS_PER_LINE,
            max_lines: MAX_PLAN_LINES,
        }
    }

    pub const fn with_limits(mut self, max_units_per_line: u32, max_lines: usize) -> Self {
        self.max_units_per_line = max_units_per_line;
        self.max_lines = max_lines;
        self
    }

    /// Build a plan from candidates already ranked and filtered upstream.
    ///
    /// Categories are visited in weight-table order and candidates in the
    /// given order, so identical inputs always give identical plans. An empty
    /// plan is a valid outcome.
    pub fn allocate(&self, budget: Decimal, candidates: &[ItemTrend]) -> Result<AllocationPlan> {
        if budget <= Decimal::ZERO {
            return Err(AdvisorError::InvalidAllocation(format!(
                "budget must be positive, got {budget}"
            )));
        }

        let mut remaining = budget;
        let mut lines = Vec::new();
        let mut total_cost = Decimal::ZERO;
        let mut expected_profit = Decimal::ZERO;

        'categories: for (category, weight) in self.weights.iter() {
            if lines.len() >= self.max_lines {
                break;
            }
            let mut category_budget = budget * weight;

            for item in candidates.iter().filter(|c| c.category == category) {
                let price = item.current_price;
                if price <= Decimal::ZERO || price > remaining || price > category_budget {
                    continue;
                }

                let Some(affordable) = category_budget.checked_div(price) else {
                    continue;
                };
                let quantity = affordable
                    .floor()
                    .to_u32()
                    .unwrap_or(u32::MAX)
                    .min(self.max_units_per_line);
                if quantity == 0 {
                    continue;
                }

                let line_cost = price * Decimal::from(quantity);
                let roi = item.roi();
                let line_profit = (roi - Decimal::ONE)
                    .checked_mul(line_cost)
                    .ok_or_else(|| profit_overflow(item.item_id, roi))?;

                remaining -= line_cost;
                category_budget -= line_cost;
                total_cost += line_cost;
                expected_profit = expected_profit
                    .checked_add(line_profit)
                    .ok_or_else(|| profit_overflow(item.item_id, roi))?;

                lines.push(BudgetAllocation {
                    item_id: item.item_id,
                    market_name: item.market_name.clone(),
                    category,
                    unit_price: price,
                    quantity,
                    total_cost: line_cost,
                    expected_roi: roi,
                    expected_profit: line_profit,
                    trend_score: item.trend_score,
                    recommendation: item.recommendation,
                });

                if lines.len() >= self.max_lines {
                    break 'categories;
                }
            }
        }

        tracing::debug!(
            %budget,
            lines = lines.len(),
            %total_cost,
            %expected_profit,
            "allocation complete"
        );

        Ok(AllocationPlan {
            budget,
            lines,
            total_cost,
            expected_profit,
        })
    }
}
