//! Investment Strategies
//!
//! Budget allocation over ranked trend candidates.

mod allocation;
mod budget;

pub use allocation::{
    AllocationPlan, BudgetAllocation, CategoryWeights, MAX_PLAN_LINES, MAX_UNITS_PER_LINE,
    PortfolioAllocator,
};
pub use budget::{BudgetAdvisor, CANDIDATE_LIMIT, DEFAULT_MIN_EXPECTED_ROI};
