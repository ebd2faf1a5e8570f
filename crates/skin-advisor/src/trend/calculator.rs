//! Trend Calculator
//!
//! Turns a price series into growth, volatility, a 1-10 score, a
//! BUY/HOLD/SELL label and a 7-period growth forecast. No I/O.
//!
//! ```text
//! score = 5.0
//!       + min(growth/10, 3)    (growth >= 0)
//!       + max(growth/20, -3)   (growth < 0)
//!       + 1   if volatility < 10
//!       - 1   if volatility > 30
//!       + 0.5 if more than 20 points
//! clamp [1, 10], round half away from zero
//! ```

#![allow(clippy::cast_precision_loss)]

use statrs::statistics::Statistics;

use crate::error::{AdvisorError, Result};
use crate::model::{GrowthSource, PriceSeries, Recommendation, TrendStats};

/// Index steps the linear forecast projects beyond the last point
pub const FORECAST_HORIZON: f64 = 7.0;

/// Series longer than this earn the reliability bonus
pub const RELIABLE_DATA_POINTS: usize = 20;

/// Stateless trend calculator
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendCalculator;

impl TrendCalculator {
    pub const fn new() -> Self {
        Self
    }

    /// Compute all trend statistics for a series
    pub fn analyze(&self, series: &PriceSeries) -> Result<TrendStats> {
        let latest = series.latest().ok_or(AdvisorError::InsufficientData)?;
        let prices = series.prices_f64()?;

        let (growth, growth_source) = growth_rate(&prices)?;
        let volatility = volatility(&prices)?;
        let trend_score = trend_score(growth, volatility, prices.len());

        Ok(TrendStats {
            current_price: latest.price,
            growth_rate: growth,
            growth_source,
            volatility,
            trend_score,
            recommendation: recommendation(trend_score, growth),
            predicted_growth: predicted_growth(&prices),
            data_points: prices.len(),
        })
    }
}

/// Growth from first to last price (%).
///
/// A single observation has no measurable growth. Instead a fixed price-tier
/// default is returned (cheaper items are assumed to have more room to grow):
/// above 100 → 5%, above 10 → 10%, otherwise 15%. This is a heuristic, not an
/// estimate, and is tagged [`GrowthSource::PriceTierHeuristic`].
pub fn growth_rate(prices: &[f64]) -> Result<(f64, GrowthSource)> {
    match prices {
        [] => Err(AdvisorError::InsufficientData),
        [only] => {
            let growth = if *only > 100.0 {
                5.0
            } else if *only > 10.0 {
                10.0
            } else {
                15.0
            };
            Ok((growth, GrowthSource::PriceTierHeuristic))
        }
        [first, .., last] => {
            if *first == 0.0 {
                return Err(AdvisorError::Computation("first price is zero".into()));
            }
            let growth = (last - first) / first * 100.0;
            if !growth.is_finite() {
                return Err(AdvisorError::Computation(format!("growth is {growth}")));
            }
            Ok((growth, GrowthSource::Measured))
        }
    }
}

/// Coefficient of variation (population std dev / mean, %). Zero below two points.
pub fn volatility(prices: &[f64]) -> Result<f64> {
    if prices.len() < 2 {
        return Ok(0.0);
    }

    let mean = prices.iter().mean();
    if mean == 0.0 || !mean.is_finite() {
        return Err(AdvisorError::Computation(format!("mean price is {mean}")));
    }

    let cv = prices.iter().population_std_dev() / mean * 100.0;
    if !cv.is_finite() {
        return Err(AdvisorError::Computation(format!("volatility is {cv}")));
    }
    Ok(cv)
}

/// Score from 1 to 10.
///
/// Ties at .5 round away from zero (`f64::round`): a raw 6.5 scores 7 and a
/// raw 4.5 scores 5. Inputs must be finite; [`growth_rate`] and
/// [`volatility`] return `Computation` errors instead of non-finite values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn trend_score(growth_rate: f64, volatility: f64, data_points: usize) -> u8 {
    debug_assert!(
        growth_rate.is_finite() && volatility.is_finite(),
        "non-finite trend inputs: growth {growth_rate}, volatility {volatility}"
    );

    let mut score = 5.0;

    if growth_rate >= 0.0 {
        score += (growth_rate / 10.0).min(3.0);
    } else {
        score += (growth_rate / 20.0).max(-3.0);
    }

    if volatility < 10.0 {
        score += 1.0;
    } else if volatility > 30.0 {
        score -= 1.0;
    }

    if data_points > RELIABLE_DATA_POINTS {
        score += 0.5;
    }

    score.clamp(1.0, 10.0).round() as u8
}

/// BUY needs both a high score and real growth; otherwise the score decides.
pub fn recommendation(trend_score: u8, growth_rate: f64) -> Recommendation {
    if trend_score >= 8 && growth_rate > 5.0 {
        Recommendation::Buy
    } else if trend_score >= 6 {
        Recommendation::Hold
    } else {
        Recommendation::Sell
    }
}

/// Growth (%) over the next 7 periods from an ordinary least-squares line.
///
/// The regressor is the position index `0..n`, not elapsed time, so uneven
/// sampling is ignored. Needs at least 3 points, otherwise 0.
pub fn predicted_growth(prices: &[f64]) -> f64 {
    if prices.len() < 3 {
        return 0.0;
    }

    let n = prices.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &price) in prices.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += price;
        sum_xy += x * price;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;

    let current = prices[prices.len() - 1];
    if current <= 0.0 {
        return 0.0;
    }
    let future = slope.mul_add(FORECAST_HORIZON, current);

    (future - current) / current * 100.0
}
