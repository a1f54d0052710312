//! Per-symbol scan reports
//!
//! Assembles detector matches, the breakout signal, and the valuation
//! into the flat JSON-serializable record consumers receive per symbol,
//! and orders bulk results by status priority then score.

use serde::{Deserialize, Serialize};

use crate::detectors::{AscendingTrianglePattern, BullFlagPattern, CupHandlePattern};
use crate::signal::{BreakoutCriteria, SignalReport, Status};
use crate::valuation::{
    MovingAverages, TrailingReturns, Valuation, ValuationDetails, ValuationStatus,
};

// ============================================================
// PATTERN SET
// ============================================================

/// All detector outcomes for one scan. Each detector fires independently;
/// any combination can be present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSet {
    pub cup_and_handle: Option<CupHandlePattern>,
    pub ascending_triangle: Option<AscendingTrianglePattern>,
    pub bull_flag: Option<BullFlagPattern>,
}

impl PatternSet {
    /// Number of patterns that fired.
    pub fn count(&self) -> usize {
        self.cup_and_handle.is_some() as usize
            + self.ascending_triangle.is_some() as usize
            + self.bull_flag.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

// ============================================================
// INDICATOR SUMMARY
// ============================================================

/// Rounded indicator readouts plus the trade levels, as surfaced in the
/// per-symbol record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSummary {
    pub rsi: f64,
    pub adx: f64,
    pub volume_ratio: f64,
    pub sma50: f64,
    pub sma200: f64,
    #[serde(rename = "aboveSMA50")]
    pub above_sma50: bool,
    #[serde(rename = "aboveSMA200")]
    pub above_sma200: bool,
    pub macd_bullish: bool,
    pub buy_point: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub rr_ratio: f64,
}

impl From<&SignalReport> for IndicatorSummary {
    fn from(signal: &SignalReport) -> Self {
        Self {
            rsi: signal.rsi,
            adx: signal.adx,
            volume_ratio: signal.volume_ratio,
            sma50: signal.sma50,
            sma200: signal.sma200,
            above_sma50: signal.criteria.above_sma50,
            above_sma200: signal.criteria.above_sma200,
            macd_bullish: signal.macd_bullish,
            buy_point: signal.buy_point,
            stop_loss: signal.stop_loss,
            target: signal.target,
            rr_ratio: signal.rr_ratio,
        }
    }
}

// ============================================================
// SYMBOL REPORT
// ============================================================

/// The complete per-symbol scan record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolReport {
    pub symbol: String,
    pub current_price: f64,
    pub status: Status,
    pub score: f64,
    pub patterns: PatternSet,
    pub pattern_count: usize,
    pub indicators: IndicatorSummary,
    pub criteria: BreakoutCriteria,
    pub signal_score: u32,
    pub dcf_value: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub valuation_status: Option<ValuationStatus>,
    pub details: Option<ValuationDetails>,
    pub returns: Option<TrailingReturns>,
    pub moving_averages: Option<MovingAverages>,
}

impl SymbolReport {
    /// Combine the stage outputs into one record.
    ///
    /// The cup-and-handle signal drives status and score when present;
    /// otherwise a triangle or flag downgrades the symbol to FORMING with
    /// the pattern's fixed score, and a patternless scan is a WATCH.
    pub fn assemble(
        symbol: &str,
        patterns: PatternSet,
        signal: SignalReport,
        valuation: Valuation,
    ) -> Self {
        let (status, score) = match (&patterns.cup_and_handle, &patterns.ascending_triangle,
            &patterns.bull_flag)
        {
            (Some(cup), _, _) => (signal.status, cup.score),
            (None, Some(triangle), _) => (Status::Forming, triangle.score),
            (None, None, Some(flag)) => (Status::Forming, flag.score),
            (None, None, None) => (Status::Watch, 0.0),
        };

        Self {
            symbol: symbol.to_string(),
            current_price: signal.current_price,
            status,
            score,
            pattern_count: patterns.count(),
            patterns,
            indicators: IndicatorSummary::from(&signal),
            criteria: signal.criteria,
            signal_score: signal.signal_score,
            dcf_value: valuation.dcf_value,
            margin_of_safety: valuation.margin_of_safety,
            valuation_status: valuation.valuation_status,
            details: valuation.details,
            returns: valuation.returns,
            moving_averages: valuation.moving_averages,
        }
    }
}

/// Order bulk-scan results: most actionable status first, then score
/// descending within each status.
pub fn sort_reports(reports: &mut [SymbolReport]) {
    reports.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| b.score.total_cmp(&a.score))
    });
}

// ============================================================
// TESTS
// ============================================================
