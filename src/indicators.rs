//! Technical indicator library
//!
//! Stateless functions over price/volume slices. Every function returns a
//! documented neutral default instead of erroring when the series is too
//! short: SMA/EMA fall back to the last element, RSI to 50, ATR/ADX to 0,
//! MACD to zeros, volume ratio to 1. Callers never need to pre-check length.
//!
//! The ADX here is a simplified directional-strength gauge, not textbook
//! Wilder ADX, and the MACD signal line is recomputed over every prefix of
//! the close series. Both are intentional and load-bearing: downstream
//! scoring thresholds are calibrated against these exact outputs.

use serde::{Deserialize, Serialize};

use crate::SeriesColumns;

/// Default lookback for RSI and ADX.
pub const DEFAULT_PERIOD: usize = 14;

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Simple moving average of the last `period` elements.
///
/// Shorter series fall back to the last element; empty input yields 0.
pub fn sma(data: &[f64], period: usize) -> f64 {
    if data.len() < period {
        return data.last().copied().unwrap_or(0.0);
    }
    data[data.len() - period..].iter().sum::<f64>() / period as f64
}

/// Exponential moving average with an SMA seed over the first `period`
/// elements and multiplier 2/(period+1). Same short-series fallback as
/// [`sma`].
pub fn ema(data: &[f64], period: usize) -> f64 {
    if data.len() < period {
        return data.last().copied().unwrap_or(0.0);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = data[..period].iter().sum::<f64>() / period as f64;

    for &value in &data[period..] {
        ema = (value - ema) * multiplier + ema;
    }

    ema
}

// ============================================================
// OSCILLATORS
// ============================================================

/// Relative Strength Index over a simple windowed mean of the last
/// `period` day-over-day changes (not Wilder-smoothed).
///
/// Edge cases: fewer than `period + 1` closes returns the neutral 50;
/// an all-gain window (avg loss of zero) returns a damped 70.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &changes[changes.len() - period..];

    let avg_gain = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
    let avg_loss = window.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return 70.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Average True Range: mean of the last `period` true-range values, where
/// TR = max(high-low, |high-prevClose|, |low-prevClose|).
///
/// Returns 0 with fewer than `period + 1` bars.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 0.0;
    }

    let tr: Vec<f64> = (1..closes.len())
        .map(|i| {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    tr[tr.len() - period..].iter().sum::<f64>() / period as f64
}

/// Simplified trend-strength gauge in [0, 100].
///
/// Sums the peak +DM and -DM over the last `period` bars, normalizes by
/// ATR and scales by 10. Returns 0 when ATR is 0 or the series is shorter
/// than `2 * period`.
pub fn adx(closes: &[f64], highs: &[f64], lows: &[f64], period: usize) -> f64 {
    if closes.len() < period * 2 {
        return 0.0;
    }

    let atr = atr(highs, lows, closes, period);
    if atr == 0.0 {
        return 0.0;
    }

    let mut plus_dm = Vec::with_capacity(closes.len() - 1);
    let mut minus_dm = Vec::with_capacity(closes.len() - 1);

    for i in 1..closes.len() {
        let high_diff = highs[i] - highs[i - 1];
        let low_diff = lows[i - 1] - lows[i];

        plus_dm.push(if high_diff > low_diff && high_diff > 0.0 { high_diff } else { 0.0 });
        minus_dm.push(if low_diff > high_diff && low_diff > 0.0 { low_diff } else { 0.0 });
    }

    let max_plus = plus_dm[plus_dm.len() - period..].iter().copied().fold(0.0, f64::max);
    let max_minus = minus_dm[minus_dm.len() - period..].iter().copied().fold(0.0, f64::max);

    let trend_strength = (max_plus + max_minus) / atr;
    (trend_strength * 10.0).clamp(0.0, 100.0)
}

// ============================================================
// MACD
// ============================================================

/// MACD line, signal line, histogram, and a bullish flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub bullish: bool,
}

/// MACD(12, 26, 9) over a close series.
///
/// The signal line is the 9-period EMA of the MACD history, where the
/// history is rebuilt by re-running EMA(12) and EMA(26) on every prefix
/// from index 26 onward. This is quadratic in series length; an
/// incremental recurrence would be cheaper but yields different values
/// because of the short-prefix EMA fallback.
///
/// Returns all zeros (bullish = false) with fewer than 26 closes.
pub fn macd(closes: &[f64]) -> Macd {
    if closes.len() < 26 {
        return Macd::default();
    }

    let macd_line = ema(closes, 12) - ema(closes, 26);

    let mut history = Vec::with_capacity(closes.len() - 25);
    for i in 26..=closes.len() {
        let prefix = &closes[..i];
        history.push(ema(prefix, 12) - ema(prefix, 26));
    }
    let signal = ema(&history, 9);
    let histogram = macd_line - signal;

    Macd { macd: macd_line, signal, histogram, bullish: histogram > 0.0 }
}

// ============================================================
// VOLUME
// ============================================================

/// Ratio of the 5-day average volume to the preceding 15-day average
/// (positions [-20, -5)). Returns 1 with fewer than 20 samples or a zero
/// denominator.
pub fn volume_ratio(volumes: &[f64]) -> f64 {
    if volumes.len() < 20 {
        return 1.0;
    }

    let n = volumes.len();
    let recent = volumes[n - 5..].iter().sum::<f64>() / 5.0;
    let older = volumes[n - 20..n - 5].iter().sum::<f64>() / 15.0;

    if older == 0.0 {
        return 1.0;
    }
    recent / older
}

// ============================================================
// INDICATOR SET
// ============================================================

/// The full indicator snapshot used by the signal evaluator. Derived
/// per call, never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub rsi: f64,
    pub adx: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub volume_ratio: f64,
    pub macd: Macd,
}

impl IndicatorSet {
    /// Compute all indicators over a column view of a series.
    pub fn compute(series: &SeriesColumns) -> Self {
        Self {
            rsi: rsi(&series.closes, DEFAULT_PERIOD),
            adx: adx(&series.closes, &series.highs, &series.lows, DEFAULT_PERIOD),
            sma50: sma(&series.closes, 50),
            sma200: sma(&series.closes, 200),
            volume_ratio: volume_ratio(&series.volumes),
            macd: macd(&series.closes),
        }
    }
}

// ============================================================
// TESTS
// ============================================================
