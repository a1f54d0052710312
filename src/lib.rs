//! # Cupscan - chart pattern detection and breakout signal scoring
//!
//! Deterministic, purely numeric scanning of daily OHLCV series: chart
//! pattern detection (cup and handle, ascending triangle, bull flag), a
//! technical indicator suite, a weighted breakout checklist with a 0-100
//! signal score and status label, and a heuristic valuation estimate.
//!
//! Everything is a pure function of the input series. Short series and
//! "no pattern" are ordinary `None`/neutral results, never errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use cupscan::prelude::*;
//!
//! // Define your OHLCV data
//! struct Bar { o: f64, h: f64, l: f64, c: f64, v: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//!     fn volume(&self) -> f64 { self.v }
//! }
//!
//! // Create a scanner with default detectors
//! let scanner = Scanner::builder().build().unwrap();
//!
//! // Scan your data; series under the minimum yield no report
//! let bars: Vec<Bar> = vec![];
//! assert!(scanner.evaluate("AAPL", &bars).unwrap().is_none());
//! ```

pub mod detectors;
pub mod indicators;
pub mod params;
pub mod report;
pub mod signal;
pub mod universe;
pub mod valuation;

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // Indicators
        indicators::{IndicatorSet, Macd},
        // Parameters
        params::{get_percent, get_period, ParamMeta, ParamType, ParameterizedDetector},
        // Reports
        report::{sort_reports, IndicatorSummary, PatternSet, SymbolReport},
        // Parallel
        scan_parallel,
        // Signal
        signal::{
            BreakoutCriteria, Sentiment, SentimentReport, SignalReport, Status, Tone,
            VolumeStrength,
        },
        // Valuation
        valuation::{
            MovingAverages, TrailingReturns, Valuation, ValuationDetails, ValuationOutcome,
            ValuationStatus,
        },
        // Core types
        PatternDetector,
        PatternId,
        Result,
        ScanError,
        Scanner,
        ScannerBuilder,
        ScannerConfig,
        SeriesColumns,
        SkippedScan,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors raised for invalid configuration or malformed input. Short
/// series and absent patterns are never errors; they surface as `None`
/// or documented neutral defaults.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// OHLCV TRAIT
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Validate one bar: high >= low, no NaN/infinite values, no negative
/// prices or volume.
fn validate_bar<T: OHLCV>(bar: &T, index: usize) -> Result<()> {
    let fields = [bar.open(), bar.high(), bar.low(), bar.close(), bar.volume()];
    if fields.iter().any(|v| v.is_nan()) {
        return Err(ScanError::InvalidOHLCV { index, reason: "NaN in OHLCV" });
    }
    if fields.iter().any(|v| v.is_infinite()) {
        return Err(ScanError::InvalidOHLCV { index, reason: "Infinite value in OHLCV" });
    }
    if fields.iter().any(|&v| v < 0.0) {
        return Err(ScanError::InvalidOHLCV { index, reason: "Negative value in OHLCV" });
    }
    if bar.high() < bar.low() {
        return Err(ScanError::InvalidOHLCV { index, reason: "high < low" });
    }
    Ok(())
}

// ============================================================
// SERIES COLUMNS
// ============================================================

/// Columnar decomposition of a bar series. Detectors and indicators all
/// operate on these parallel arrays, aligned by index and ascending by
/// date.
#[derive(Debug, Clone, Default)]
pub struct SeriesColumns {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl SeriesColumns {
    /// Build columns from any OHLCV slice.
    pub fn from_bars<T: OHLCV>(bars: &[T]) -> Self {
        Self {
            closes: bars.iter().map(|b| b.close()).collect(),
            highs: bars.iter().map(|b| b.high()).collect(),
            lows: bars.iter().map(|b| b.low()).collect(),
            volumes: bars.iter().map(|b| b.volume()).collect(),
        }
    }

    /// Build columns from pre-separated arrays. All four must have the
    /// same length.
    pub fn new(closes: Vec<f64>, highs: Vec<f64>, lows: Vec<f64>, volumes: Vec<f64>) -> Result<Self> {
        let n = closes.len();
        if highs.len() != n || lows.len() != n || volumes.len() != n {
            return Err(ScanError::InvalidValue("column lengths differ"));
        }
        Ok(Self { closes, highs, lows, volumes })
    }

    /// Close-only columns for tests and close-driven callers: highs and
    /// lows mirror the closes, volumes are zero.
    pub fn from_closes(closes: Vec<f64>) -> Self {
        let highs = closes.clone();
        let lows = closes.clone();
        let volumes = vec![0.0; closes.len()];
        Self { closes, highs, lows, volumes }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// Unique identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A chart pattern detector: scans a whole series and yields at most one
/// best match per call.
pub trait PatternDetector {
    /// The structured match this detector produces.
    type Match;

    fn id(&self) -> PatternId;

    /// Minimum series length for a meaningful scan; shorter input always
    /// yields `None`.
    fn min_bars(&self) -> usize;

    fn detect(&self, series: &SeriesColumns) -> Option<Self::Match>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// ROUNDING
// ============================================================

// Externally reported values: prices to 2 decimals, percentages and
// ratios to 1 or 2 per field.

pub(crate) fn round_dp2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round_dp1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================
// SCANNER
// ============================================================

use detectors::{AscendingTriangleDetector, BullFlagDetector, CupHandleDetector};
use report::{PatternSet, SymbolReport};
use signal::SentimentReport;

/// Scanner-level configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Reject series containing NaN/infinite/negative bars instead of
    /// scanning them.
    pub validate_data: bool,
    /// Minimum bars before a symbol is evaluated at all.
    pub min_bars: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { validate_data: false, min_bars: 150 }
    }
}

/// Main scanning engine: runs the three detectors, the breakout signal
/// evaluator, and the valuation estimator over one series and assembles
/// the per-symbol report.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    cup: CupHandleDetector,
    triangle: AscendingTriangleDetector,
    flag: BullFlagDetector,
    config: ScannerConfig,
}

impl Scanner {
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    // ===========================================
    // HIGH-LEVEL: full evaluation
    // ===========================================

    /// Evaluate one symbol. Returns `Ok(None)` when the series is shorter
    /// than the configured minimum; errors only on invalid bars when data
    /// validation is enabled.
    pub fn evaluate<T: OHLCV>(&self, symbol: &str, bars: &[T]) -> Result<Option<SymbolReport>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }
        if bars.len() < self.config.min_bars {
            return Ok(None);
        }

        let series = SeriesColumns::from_bars(bars);
        Ok(Some(self.evaluate_columns(symbol, &series)))
    }

    /// Evaluate pre-separated columns without the length gate. Detectors
    /// and estimators still apply their own minimums.
    pub fn evaluate_columns(&self, symbol: &str, series: &SeriesColumns) -> SymbolReport {
        let patterns = self.detect_patterns(series);
        let signal = signal::evaluate(series, patterns.cup_and_handle.as_ref());
        let valuation = valuation::evaluate(&series.closes);
        SymbolReport::assemble(symbol, patterns, signal, valuation)
    }

    // ===========================================
    // MID-LEVEL: individual stages
    // ===========================================

    /// Run all three detectors independently on the same series.
    pub fn detect_patterns(&self, series: &SeriesColumns) -> PatternSet {
        PatternSet {
            cup_and_handle: self.cup.detect(series),
            ascending_triangle: self.triangle.detect(series),
            bull_flag: self.flag.detect(series),
        }
    }

    /// Market-sentiment gauge for one symbol; `None` under 50 bars.
    pub fn sentiment<T: OHLCV>(&self, bars: &[T]) -> Option<SentimentReport> {
        signal::sentiment(&SeriesColumns::from_bars(bars))
    }

    /// The configured evaluation minimum.
    pub fn min_bars(&self) -> usize {
        self.config.min_bars
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            validate_bar(bar, i)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.cup.validate_config()?;
        self.triangle.validate_config()?;
        self.flag.validate_config()?;
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`Scanner`] instances
#[derive(Debug, Clone, Default)]
pub struct ScannerBuilder {
    cup: CupHandleDetector,
    triangle: AscendingTriangleDetector,
    flag: BullFlagDetector,
    config: ScannerConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cup-and-handle detector configuration.
    pub fn cup_handle(mut self, detector: CupHandleDetector) -> Self {
        self.cup = detector;
        self
    }

    /// Replace the ascending-triangle detector configuration.
    pub fn ascending_triangle(mut self, detector: AscendingTriangleDetector) -> Self {
        self.triangle = detector;
        self
    }

    /// Replace the bull-flag detector configuration.
    pub fn bull_flag(mut self, detector: BullFlagDetector) -> Self {
        self.flag = detector;
        self
    }

    /// Set the minimum series length for evaluation.
    pub fn min_bars(mut self, min_bars: usize) -> Self {
        self.config.min_bars = min_bars;
        self
    }

    /// Enable/disable bar validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the scanner, validating every detector configuration.
    pub fn build(self) -> Result<Scanner> {
        let scanner = Scanner {
            cup: self.cup,
            triangle: self.triangle,
            flag: self.flag,
            config: self.config,
        };
        scanner.validate()?;
        Ok(scanner)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// A symbol the bulk scan could not evaluate, and why.
#[derive(Debug)]
pub struct SkippedScan {
    pub symbol: String,
    pub error: ScanError,
}

/// Scan many instruments in parallel. Returns completed reports and the
/// skipped symbols (short series or, with validation on, malformed bars).
pub fn scan_parallel<'a, T, I>(
    scanner: &Scanner,
    instruments: I,
) -> (Vec<SymbolReport>, Vec<SkippedScan>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| match scanner.evaluate(symbol, bars) {
            Ok(Some(report)) => Ok(report),
            Ok(None) => Err(SkippedScan {
                symbol: symbol.to_string(),
                error: ScanError::InsufficientData {
                    need: scanner.min_bars(),
                    got: bars.len(),
                },
            }),
            Err(error) => Err(SkippedScan { symbol: symbol.to_string(), error }),
        })
        .collect();

    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for result in results {
        match result {
            Ok(r) => reports.push(r),
            Err(s) => skipped.push(s),
        }
    }

    (reports, skipped)
}

// ============================================================
// TESTS
// ============================================================
