//! Heuristic valuation estimator
//!
//! Blends three price anchors into an intrinsic-value figure: a
//! growth-projected value from the trailing one-year return, a
//! mean-reversion anchor from the 50/200-day moving averages, and the
//! all-history average price. The blend weight shifts toward growth when
//! momentum is strong. This is a screening heuristic, not a financial
//! model.

use serde::{Deserialize, Serialize};

use crate::indicators::sma;
use crate::{round_dp1, round_dp2};

/// Closes required before a valuation is attempted.
const MIN_CLOSES: usize = 50;

/// Annual discount rate reported in the detail breakdown, percent.
const DISCOUNT_RATE_PCT: f64 = 10.0;

/// Years of growth projection.
const PROJECTION_YEARS: u32 = 5;

// ============================================================
// OUTPUT TYPES
// ============================================================

/// Valuation verdict relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationStatus {
    #[serde(rename = "Undervalued")]
    Undervalued,
    #[serde(rename = "Slightly Undervalued")]
    SlightlyUndervalued,
    #[serde(rename = "Fair Value")]
    FairValue,
    #[serde(rename = "Slightly Overvalued")]
    SlightlyOvervalued,
    #[serde(rename = "Overvalued")]
    Overvalued,
}

/// Whether the estimator had enough history to produce numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationOutcome {
    Success,
    InsufficientData,
}

/// Component values and assumptions behind the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationDetails {
    pub growth_based_value: f64,
    pub ma_based_value: f64,
    pub historical_avg_value: f64,
    /// Half the trailing one-year return, as a percent.
    pub estimated_growth_rate: f64,
    pub discount_rate: f64,
    pub projection_years: u32,
}

/// Trailing returns at the standard lookback offsets, percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingReturns {
    pub one_month: f64,
    pub three_month: f64,
    pub six_month: f64,
    pub one_year: f64,
}

/// Price position relative to the long moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAverages {
    pub sma50: f64,
    pub sma200: f64,
    #[serde(rename = "priceVsSMA50")]
    pub price_vs_sma50: f64,
    #[serde(rename = "priceVsSMA200")]
    pub price_vs_sma200: f64,
    #[serde(rename = "aboveSMA50")]
    pub above_sma50: bool,
    #[serde(rename = "aboveSMA200")]
    pub above_sma200: bool,
    pub golden_cross: bool,
}

/// The complete valuation record. With fewer than 50 closes every numeric
/// field is `None` and `status` reads `insufficient_data`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub dcf_value: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub current_price: Option<f64>,
    pub valuation_status: Option<ValuationStatus>,
    pub status: ValuationOutcome,
    pub details: Option<ValuationDetails>,
    pub returns: Option<TrailingReturns>,
    pub moving_averages: Option<MovingAverages>,
}

impl Valuation {
    /// The explicit short-series result.
    pub fn insufficient_data() -> Self {
        Self {
            dcf_value: None,
            margin_of_safety: None,
            current_price: None,
            valuation_status: None,
            status: ValuationOutcome::InsufficientData,
            details: None,
            returns: None,
            moving_averages: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ValuationOutcome::Success
    }
}

// ============================================================
// ESTIMATOR
// ============================================================

/// Price `k` trading days back, clamped to the start of the series.
fn lookback_price(closes: &[f64], k: usize) -> f64 {
    closes[closes.len().saturating_sub(k)]
}

/// Estimate intrinsic value from a close series.
pub fn evaluate(closes: &[f64]) -> Valuation {
    if closes.len() < MIN_CLOSES {
        return Valuation::insufficient_data();
    }

    let current = closes[closes.len() - 1];

    // Trailing returns at 1/3/6/12 month offsets (21/63/126/252 days)
    let one_month_ago = lookback_price(closes, 21);
    let three_months_ago = lookback_price(closes, 63);
    let six_months_ago = lookback_price(closes, 126);
    let year_ago = lookback_price(closes, 252);

    let one_month_return = (current - one_month_ago) / one_month_ago;
    let three_month_return = (current - three_months_ago) / three_months_ago;
    let six_month_return = (current - six_months_ago) / six_months_ago;
    let yoy_return = (current - year_ago) / year_ago;

    let sma50 = sma(closes, 50);
    let sma200 = sma(closes, 200);

    // Three anchors: projected growth, moving-average reversion, and the
    // all-history average
    let estimated_growth_rate = yoy_return * 0.5;
    let growth_value =
        current * (1.0 + estimated_growth_rate.max(0.02)).powi(PROJECTION_YEARS as i32);
    let ma_value = (sma50 + sma200) / 2.0;
    let historical_avg = closes.iter().sum::<f64>() / closes.len() as f64;

    // Momentum shifts weight toward the growth anchor
    let growth_weight = if yoy_return > 0.15 { 0.5 } else { 0.3 };
    let ma_weight = 0.3;
    let historical_weight = 1.0 - growth_weight - ma_weight;

    let intrinsic =
        growth_value * growth_weight + ma_value * ma_weight + historical_avg * historical_weight;
    let margin_of_safety = (intrinsic - current) / current * 100.0;

    let valuation_status = if margin_of_safety > 20.0 {
        ValuationStatus::Undervalued
    } else if margin_of_safety > 10.0 {
        ValuationStatus::SlightlyUndervalued
    } else if margin_of_safety < -20.0 {
        ValuationStatus::Overvalued
    } else if margin_of_safety < -10.0 {
        ValuationStatus::SlightlyOvervalued
    } else {
        ValuationStatus::FairValue
    };

    Valuation {
        dcf_value: Some(round_dp2(intrinsic)),
        margin_of_safety: Some(round_dp1(margin_of_safety)),
        current_price: Some(round_dp2(current)),
        valuation_status: Some(valuation_status),
        status: ValuationOutcome::Success,
        details: Some(ValuationDetails {
            growth_based_value: round_dp2(growth_value),
            ma_based_value: round_dp2(ma_value),
            historical_avg_value: round_dp2(historical_avg),
            estimated_growth_rate: round_dp2(estimated_growth_rate * 100.0),
            discount_rate: DISCOUNT_RATE_PCT,
            projection_years: PROJECTION_YEARS,
        }),
        returns: Some(TrailingReturns {
            one_month: round_dp2(one_month_return * 100.0),
            three_month: round_dp2(three_month_return * 100.0),
            six_month: round_dp2(six_month_return * 100.0),
            one_year: round_dp2(yoy_return * 100.0),
        }),
        moving_averages: Some(MovingAverages {
            sma50: round_dp2(sma50),
            sma200: round_dp2(sma200),
            price_vs_sma50: round_dp1((current - sma50) / sma50 * 100.0),
            price_vs_sma200: round_dp1((current - sma200) / sma200 * 100.0),
            above_sma50: current > sma50,
            above_sma200: current > sma200,
            golden_cross: sma50 > sma200,
        }),
    }
}

// ============================================================
// TESTS
// ============================================================
