//! Bull flag pattern detector
//!
//! Splits the most recent window into a "pole" (sharp advance) and a
//! "flag" (tight sideways drift). The measured-move target projects the
//! pole height above the flag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::helpers::{argmax, argmin, slice_max, slice_min};
use crate::{
    params::{get_percent, get_period, ParamMeta, ParameterizedDetector},
    PatternDetector, PatternId, Result, ScanError, SeriesColumns,
};

/// Minimum number of closes in the pole window.
const MIN_POLE_LEN: usize = 5;

/// A bull flag match with its measured-move price target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BullFlagPattern {
    pub pole_gain: f64,
    pub flag_high: f64,
    pub flag_low: f64,
    pub target: f64,
    pub score: f64,
}

/// Bull flag detector over the most recent `lookback` closes.
#[derive(Debug, Clone)]
pub struct BullFlagDetector {
    /// Bars of history to scan; the first half is the pole window.
    pub lookback: usize,
    /// Minimum advance from pole low to pole high, percent.
    pub min_pole_gain_pct: f64,
    /// Maximum flag height as a percent of the pole high.
    pub max_flag_range_pct: f64,
}

impl Default for BullFlagDetector {
    fn default() -> Self {
        Self { lookback: 40, min_pole_gain_pct: 10.0, max_flag_range_pct: 15.0 }
    }
}

impl_with_defaults!(BullFlagDetector);

impl BullFlagDetector {
    /// Scan the last `lookback` closes for a pole-and-flag geometry.
    pub fn detect_in(&self, closes: &[f64]) -> Option<BullFlagPattern> {
        if closes.len() < self.lookback {
            return None;
        }

        let window = &closes[closes.len() - self.lookback..];
        let pole = &window[..self.lookback / 2];
        let flag = &window[self.lookback / 2..];

        if pole.len() < MIN_POLE_LEN {
            return None;
        }

        // The thrust must sit early in the pole window: low before high,
        // both within its first half
        let search = &pole[..pole.len() / 2];
        let pole_low_idx = argmin(search)?;
        let pole_high_idx = argmax(search)?;
        if pole_low_idx >= pole_high_idx {
            return None;
        }

        let pole_low = search[pole_low_idx];
        let pole_high = search[pole_high_idx];
        let pole_gain = (pole_high - pole_low) / pole_low * 100.0;
        if pole_gain < self.min_pole_gain_pct {
            return None;
        }

        let flag_high = slice_max(flag);
        let flag_low = slice_min(flag);
        let flag_range = (flag_high - flag_low) / pole_high * 100.0;
        if flag_range > self.max_flag_range_pct {
            return None;
        }

        let target = flag_high + (pole_high - pole_low);

        Some(BullFlagPattern { pole_gain, flag_high, flag_low, target, score: 65.0 })
    }
}

impl PatternDetector for BullFlagDetector {
    type Match = BullFlagPattern;

    fn id(&self) -> PatternId {
        PatternId("BULL_FLAG")
    }

    fn min_bars(&self) -> usize {
        self.lookback
    }

    fn detect(&self, series: &SeriesColumns) -> Option<BullFlagPattern> {
        self.detect_in(&series.closes)
    }

    fn validate_config(&self) -> Result<()> {
        if self.lookback < MIN_POLE_LEN * 2 {
            return Err(ScanError::InvalidValue("lookback must be >= 10"));
        }
        if self.min_pole_gain_pct <= 0.0 {
            return Err(ScanError::InvalidValue("min_pole_gain_pct must be > 0"));
        }
        if self.max_flag_range_pct <= 0.0 {
            return Err(ScanError::InvalidValue("max_flag_range_pct must be > 0"));
        }
        Ok(())
    }
}

static PARAMS: [ParamMeta; 3] = [
    ParamMeta::period("lookback", 40.0, (20.0, 80.0, 10.0), "Bars of history to scan"),
    ParamMeta::percent("min_pole_gain_pct", 10.0, (5.0, 25.0, 2.5), "Minimum pole advance"),
    ParamMeta::percent("max_flag_range_pct", 15.0, (5.0, 25.0, 2.5), "Maximum flag height vs pole high"),
];

impl ParameterizedDetector for BullFlagDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            lookback: get_period(params, "lookback", 40)?,
            min_pole_gain_pct: get_percent(params, "min_pole_gain_pct", 10.0)?,
            max_flag_range_pct: get_percent(params, "max_flag_range_pct", 15.0)?,
        };
        detector.validate_config()?;
        Ok(detector)
    }

    fn pattern_id_str() -> &'static str {
        "BULL_FLAG"
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 20-bar pole thrusting 100 -> 120 inside its first half, then a
    /// 20-bar flag drifting between 118 and 120.
    fn pole_and_flag() -> Vec<f64> {
        let mut closes = Vec::new();
        for i in 0..10 {
            closes.push(100.0 + i as f64 * 20.0 / 9.0);
        }
        closes.extend(vec![119.0; 10]);
        for i in 0..20 {
            closes.push(if i % 2 == 0 { 118.0 } else { 120.0 });
        }
        closes
    }

    #[test]
    fn detects_pole_and_tight_flag() {
        let closes = pole_and_flag();
        let pattern = BullFlagDetector::with_defaults().detect_in(&closes).unwrap();

        assert!((pattern.pole_gain - 20.0).abs() < 1e-9);
        assert_eq!(pattern.flag_high, 120.0);
        assert_eq!(pattern.flag_low, 118.0);
        // flag high + (pole high - pole low)
        assert!((pattern.target - 140.0).abs() < 1e-9);
        assert_eq!(pattern.score, 65.0);
    }

    #[test]
    fn rejects_short_series() {
        assert!(BullFlagDetector::with_defaults().detect_in(&vec![100.0; 39]).is_none());
    }

    #[test]
    fn rejects_weak_pole() {
        // 5% advance is below the 10% minimum
        let mut closes = Vec::new();
        for i in 0..10 {
            closes.push(100.0 + i as f64 * 5.0 / 9.0);
        }
        closes.extend(vec![104.0; 30]);
        assert!(BullFlagDetector::with_defaults().detect_in(&closes).is_none());
    }

    #[test]
    fn rejects_loose_flag() {
        let mut closes = Vec::new();
        for i in 0..10 {
            closes.push(100.0 + i as f64 * 20.0 / 9.0);
        }
        closes.extend(vec![119.0; 10]);
        // Flag swinging 25 points: far above 15% of the pole high
        for i in 0..20 {
            closes.push(if i % 2 == 0 { 95.0 } else { 120.0 });
        }
        assert!(BullFlagDetector::with_defaults().detect_in(&closes).is_none());
    }

    #[test]
    fn rejects_declining_pole() {
        // High before low: the thrust points the wrong way
        let mut closes = Vec::new();
        for i in 0..10 {
            closes.push(120.0 - i as f64 * 20.0 / 9.0);
        }
        closes.extend(vec![101.0; 30]);
        assert!(BullFlagDetector::with_defaults().detect_in(&closes).is_none());
    }

    #[test]
    fn config_validation() {
        let mut detector = BullFlagDetector::with_defaults();
        assert!(detector.validate_config().is_ok());
        detector.lookback = 8;
        assert!(detector.validate_config().is_err());
    }
}
