//! Ascending triangle pattern detector
//!
//! Looks for a flat resistance line: several recent swing highs printing
//! at nearly the same level while the lows rise into them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::helpers::{mean, slice_max, slice_min, strict_local_maxima};
use crate::{
    params::{get_percent, get_period, ParamMeta, ParameterizedDetector},
    PatternDetector, PatternId, Result, ScanError, SeriesColumns,
};

/// Swing highs averaged into the resistance estimate.
const RESISTANCE_PEAKS: usize = 5;

/// An ascending triangle match: the shared ceiling and a fixed confidence
/// score (the geometry either qualifies or it does not).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AscendingTrianglePattern {
    pub resistance: f64,
    pub score: f64,
}

/// Ascending triangle detector over the most recent `lookback` highs.
#[derive(Debug, Clone)]
pub struct AscendingTriangleDetector {
    /// Bars of history to scan.
    pub lookback: usize,
    /// Maximum spread of the last peaks as a percent of the resistance.
    pub max_spread_pct: f64,
    /// Minimum number of swing highs required.
    pub min_peaks: usize,
}

impl Default for AscendingTriangleDetector {
    fn default() -> Self {
        Self { lookback: 60, max_spread_pct: 3.0, min_peaks: 3 }
    }
}

impl_with_defaults!(AscendingTriangleDetector);

impl AscendingTriangleDetector {
    /// Scan the last `lookback` highs for a flat resistance line.
    pub fn detect_in(&self, closes: &[f64], highs: &[f64]) -> Option<AscendingTrianglePattern> {
        if closes.len() < self.lookback {
            return None;
        }

        let recent = &highs[highs.len() - self.lookback..];
        let peak_values: Vec<f64> =
            strict_local_maxima(recent, 2).into_iter().map(|i| recent[i]).collect();

        if peak_values.len() < self.min_peaks {
            return None;
        }

        let last = &peak_values[peak_values.len().saturating_sub(RESISTANCE_PEAKS)..];
        let resistance = mean(last);
        let spread_pct = (slice_max(last) - slice_min(last)) / resistance * 100.0;

        if spread_pct > self.max_spread_pct {
            return None;
        }

        Some(AscendingTrianglePattern { resistance, score: 70.0 })
    }
}

impl PatternDetector for AscendingTriangleDetector {
    type Match = AscendingTrianglePattern;

    fn id(&self) -> PatternId {
        PatternId("ASC_TRIANGLE")
    }

    fn min_bars(&self) -> usize {
        self.lookback
    }

    fn detect(&self, series: &SeriesColumns) -> Option<AscendingTrianglePattern> {
        self.detect_in(&series.closes, &series.highs)
    }

    fn validate_config(&self) -> Result<()> {
        if self.lookback < 10 {
            return Err(ScanError::InvalidValue("lookback must be >= 10"));
        }
        if self.max_spread_pct <= 0.0 {
            return Err(ScanError::InvalidValue("max_spread_pct must be > 0"));
        }
        if self.min_peaks < 2 {
            return Err(ScanError::InvalidValue("min_peaks must be >= 2"));
        }
        Ok(())
    }
}

static PARAMS: [ParamMeta; 3] = [
    ParamMeta::period("lookback", 60.0, (30.0, 120.0, 10.0), "Bars of history to scan"),
    ParamMeta::percent("max_spread_pct", 3.0, (1.0, 6.0, 0.5), "Maximum peak spread vs resistance"),
    ParamMeta::period("min_peaks", 3.0, (2.0, 6.0, 1.0), "Minimum number of swing highs"),
];

impl ParameterizedDetector for AscendingTriangleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            lookback: get_period(params, "lookback", 60)?,
            max_spread_pct: get_percent(params, "max_spread_pct", 3.0)?,
            min_peaks: get_period(params, "min_peaks", 3)?,
        };
        detector.validate_config()?;
        Ok(detector)
    }

    fn pattern_id_str() -> &'static str {
        "ASC_TRIANGLE"
    }
}

// ============================================================
// TESTS
// ============================================================
