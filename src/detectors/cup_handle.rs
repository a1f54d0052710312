//! Cup-and-handle pattern detector
//!
//! Scans a close series for a rounded base bounded by two rims of similar
//! height, followed by a shallow handle pullback. Detection runs in pure
//! stages: extrema extraction, rim-pair candidate filtering, per-candidate
//! scoring, and a final reduction to the best-scoring candidate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::helpers::{local_maxima, local_minima, slice_min};
use crate::{
    params::{get_percent, get_period, ParamMeta, ParameterizedDetector},
    PatternDetector, PatternId, Result, ScanError, SeriesColumns,
};

/// Minimum number of closes after the right rim for a valid handle.
const MIN_HANDLE_LEN: usize = 5;

// ============================================================
// PATTERN
// ============================================================

/// A scored cup-and-handle match. Indices reference positions in the
/// originating close series; `left_rim_idx < bottom_idx < right_rim_idx`
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupHandlePattern {
    pub left_rim_idx: usize,
    pub right_rim_idx: usize,
    pub bottom_idx: usize,
    pub left_rim_price: f64,
    pub right_rim_price: f64,
    pub bottom_price: f64,
    pub cup_depth_pct: f64,
    pub cup_length_days: usize,
    pub handle_low: f64,
    pub handle_decline_pct: f64,
    pub symmetry_pct: f64,
    pub score: f64,
}

// ============================================================
// DETECTOR
// ============================================================

/// Cup-and-handle detector with tunable geometry bounds.
#[derive(Debug, Clone)]
pub struct CupHandleDetector {
    /// Minimum rim-to-rim distance in bars.
    pub min_cup_days: usize,
    /// Maximum rim-to-rim distance in bars.
    pub max_cup_days: usize,
    /// Half-window for local extrema qualification.
    pub extrema_order: usize,
    /// Cup depth bounds as a percent of the average rim price.
    pub min_depth_pct: f64,
    pub max_depth_pct: f64,
    /// Maximum rim height mismatch as a percent of the average rim price.
    pub max_rim_diff_pct: f64,
    /// Handle pullback bounds as a percent of the right rim price.
    pub min_handle_decline_pct: f64,
    pub max_handle_decline_pct: f64,
}

impl Default for CupHandleDetector {
    fn default() -> Self {
        Self {
            min_cup_days: 20,
            max_cup_days: 130,
            extrema_order: 10,
            min_depth_pct: 12.0,
            max_depth_pct: 35.0,
            max_rim_diff_pct: 5.0,
            min_handle_decline_pct: 2.0,
            max_handle_decline_pct: 15.0,
        }
    }
}

impl_with_defaults!(CupHandleDetector);

impl CupHandleDetector {
    /// Scan a close series for the best-scoring cup-and-handle candidate.
    ///
    /// Returns `None` when the series is shorter than
    /// `max_cup_days + 30`, when no qualifying rim pair exists, or when
    /// every candidate scores at or below zero.
    pub fn detect_in(&self, closes: &[f64]) -> Option<CupHandlePattern> {
        if closes.len() < self.min_bars() {
            return None;
        }

        let maxima = local_maxima(closes, self.extrema_order);
        let minima = local_minima(closes, self.extrema_order);

        if maxima.len() < 2 || minima.is_empty() {
            return None;
        }

        // Only the most recent stretch can still break out
        let lookback = closes.len().min(self.max_cup_days + 50);
        let cutoff = closes.len() - lookback;
        let recent_max: Vec<usize> = maxima.into_iter().filter(|&i| i >= cutoff).collect();
        let recent_min: Vec<usize> = minima.into_iter().filter(|&i| i >= cutoff).collect();

        if recent_max.len() < 2 || recent_min.is_empty() {
            return None;
        }

        self.rim_pairs(&recent_max)
            .filter_map(|(left, right)| self.score_candidate(closes, left, right, &recent_min))
            .fold(None, keep_better)
    }

    /// Every ordered pair of candidate rims.
    fn rim_pairs<'a>(&self, maxima: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        maxima.iter().enumerate().flat_map(move |(i, &left)| {
            maxima[i + 1..].iter().map(move |&right| (left, right))
        })
    }

    /// Apply all geometry filters to one rim pair and score it.
    fn score_candidate(
        &self,
        closes: &[f64],
        left_rim_idx: usize,
        right_rim_idx: usize,
        minima: &[usize],
    ) -> Option<CupHandlePattern> {
        let cup_length = right_rim_idx - left_rim_idx;
        if cup_length < self.min_cup_days || cup_length > self.max_cup_days {
            return None;
        }

        // Deepest local minimum strictly between the rims
        let bottom_idx = minima
            .iter()
            .copied()
            .filter(|&m| left_rim_idx < m && m < right_rim_idx)
            .min_by(|&a, &b| closes[a].total_cmp(&closes[b]))?;

        let left_rim_price = closes[left_rim_idx];
        let right_rim_price = closes[right_rim_idx];
        let bottom_price = closes[bottom_idx];

        let avg_rim = (left_rim_price + right_rim_price) / 2.0;
        let cup_depth_pct = (avg_rim - bottom_price) / avg_rim * 100.0;
        if cup_depth_pct < self.min_depth_pct || cup_depth_pct > self.max_depth_pct {
            return None;
        }

        let rim_diff_pct = (left_rim_price - right_rim_price).abs() / avg_rim * 100.0;
        if rim_diff_pct > self.max_rim_diff_pct {
            return None;
        }

        let left_days = bottom_idx - left_rim_idx;
        let right_days = right_rim_idx - bottom_idx;
        let symmetry = 1.0 - left_days.abs_diff(right_days) as f64 / cup_length as f64;

        // Handle: everything from the right rim to the end of the series
        let handle = &closes[right_rim_idx..];
        if handle.len() < MIN_HANDLE_LEN {
            return None;
        }

        let handle_low = slice_min(handle);
        let handle_decline_pct = (right_rim_price - handle_low) / right_rim_price * 100.0;
        if handle_decline_pct < self.min_handle_decline_pct
            || handle_decline_pct > self.max_handle_decline_pct
        {
            return None;
        }

        let score = 100.0 - (cup_depth_pct - 25.0).abs() - rim_diff_pct
            - (handle_decline_pct - 8.0).abs()
            + symmetry * 20.0;

        Some(CupHandlePattern {
            left_rim_idx,
            right_rim_idx,
            bottom_idx,
            left_rim_price,
            right_rim_price,
            bottom_price,
            cup_depth_pct,
            cup_length_days: cup_length,
            handle_low,
            handle_decline_pct,
            symmetry_pct: symmetry * 100.0,
            score,
        })
    }
}

/// Keep the strictly better candidate; scores at or below zero never win.
fn keep_better(
    best: Option<CupHandlePattern>,
    candidate: CupHandlePattern,
) -> Option<CupHandlePattern> {
    match best {
        Some(b) if candidate.score <= b.score => Some(b),
        _ if candidate.score > 0.0 => Some(candidate),
        other => other,
    }
}

impl PatternDetector for CupHandleDetector {
    type Match = CupHandlePattern;

    fn id(&self) -> PatternId {
        PatternId("CUP_AND_HANDLE")
    }

    fn min_bars(&self) -> usize {
        self.max_cup_days + 30
    }

    fn detect(&self, series: &SeriesColumns) -> Option<CupHandlePattern> {
        self.detect_in(&series.closes)
    }

    fn validate_config(&self) -> Result<()> {
        if self.min_cup_days == 0 || self.min_cup_days >= self.max_cup_days {
            return Err(ScanError::InvalidConfig(format!(
                "cup day bounds invalid: min {} max {}",
                self.min_cup_days, self.max_cup_days
            )));
        }
        if self.extrema_order == 0 {
            return Err(ScanError::InvalidValue("extrema_order must be > 0"));
        }
        if self.min_depth_pct >= self.max_depth_pct {
            return Err(ScanError::InvalidConfig(format!(
                "depth bounds invalid: min {} max {}",
                self.min_depth_pct, self.max_depth_pct
            )));
        }
        if self.min_handle_decline_pct >= self.max_handle_decline_pct {
            return Err(ScanError::InvalidConfig(format!(
                "handle decline bounds invalid: min {} max {}",
                self.min_handle_decline_pct, self.max_handle_decline_pct
            )));
        }
        if self.max_rim_diff_pct <= 0.0 {
            return Err(ScanError::InvalidValue("max_rim_diff_pct must be > 0"));
        }
        Ok(())
    }
}

// ============================================================
// PARAMETERIZATION
// ============================================================

static PARAMS: [ParamMeta; 8] = [
    ParamMeta::period("min_cup_days", 20.0, (10.0, 40.0, 5.0), "Minimum rim-to-rim span in bars"),
    ParamMeta::period("max_cup_days", 130.0, (90.0, 180.0, 10.0), "Maximum rim-to-rim span in bars"),
    ParamMeta::period("extrema_order", 10.0, (5.0, 15.0, 1.0), "Half-window for extrema detection"),
    ParamMeta::percent("min_depth_pct", 12.0, (8.0, 20.0, 1.0), "Minimum cup depth vs average rim"),
    ParamMeta::percent("max_depth_pct", 35.0, (25.0, 50.0, 5.0), "Maximum cup depth vs average rim"),
    ParamMeta::percent("max_rim_diff_pct", 5.0, (2.0, 10.0, 1.0), "Maximum rim height mismatch"),
    ParamMeta::percent("min_handle_decline_pct", 2.0, (1.0, 5.0, 1.0), "Minimum handle pullback"),
    ParamMeta::percent("max_handle_decline_pct", 15.0, (8.0, 20.0, 1.0), "Maximum handle pullback"),
];

impl ParameterizedDetector for CupHandleDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let detector = Self {
            min_cup_days: get_period(params, "min_cup_days", 20)?,
            max_cup_days: get_period(params, "max_cup_days", 130)?,
            extrema_order: get_period(params, "extrema_order", 10)?,
            min_depth_pct: get_percent(params, "min_depth_pct", 12.0)?,
            max_depth_pct: get_percent(params, "max_depth_pct", 35.0)?,
            max_rim_diff_pct: get_percent(params, "max_rim_diff_pct", 5.0)?,
            min_handle_decline_pct: get_percent(params, "min_handle_decline_pct", 2.0)?,
            max_handle_decline_pct: get_percent(params, "max_handle_decline_pct", 15.0)?,
        };
        detector.validate_config()?;
        Ok(detector)
    }

    fn pattern_id_str() -> &'static str {
        "CUP_AND_HANDLE"
    }
}

// ============================================================
// TESTS
// ============================================================
