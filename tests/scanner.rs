//! Integration tests for full-report evaluation: breakout scenarios,
//! valuation boundaries, bulk scanning, and the JSON contract.

use cupscan::prelude::*;
use cupscan::universe;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    c: f64,
    v: f64,
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.c
    }

    fn high(&self) -> f64 {
        self.c + 0.5
    }

    fn low(&self) -> f64 {
        self.c - 0.5
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        self.v
    }
}

fn bars(closes: &[f64], volumes: &[f64]) -> Vec<TestBar> {
    closes.iter().zip(volumes).map(|(&c, &v)| TestBar { c, v }).collect()
}

/// 130-bar lead-in rising toward 100, a symmetric 60-bar cup down to 80,
/// then the given tail after the right rim at index 190.
fn cup_closes(tail: &[f64]) -> Vec<f64> {
    let mut closes = Vec::new();
    for i in 0..130 {
        closes.push(85.0 + 14.5 * i as f64 / 130.0);
    }
    for i in 0..=30 {
        closes.push(100.0 - 20.0 * i as f64 / 30.0);
    }
    for i in 1..=30 {
        closes.push(80.0 + 20.0 * i as f64 / 30.0);
    }
    closes.extend_from_slice(tail);
    closes
}

fn declining_handle() -> Vec<f64> {
    (1..=10).map(|k| 100.0 - 0.8 * k as f64).collect()
}

// ============================================================
// BREAKOUT SCENARIOS
// ============================================================

#[test]
fn confirmed_breakout_with_volume_is_strong_buy() {
    // Handle down to 92, then a rally through the 100.10 buy point
    let mut tail = declining_handle();
    tail.extend((1..=10).map(|k| 92.0 + 0.9 * k as f64));
    let closes = cup_closes(&tail);

    // Volume doubles into the breakout
    let mut volumes = vec![1_000_000.0; closes.len()];
    let n = volumes.len();
    volumes[n - 5..].fill(3_000_000.0);

    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("BRKO", &bars(&closes, &volumes)).unwrap().unwrap();

    assert!(report.patterns.cup_and_handle.is_some());
    assert!(report.criteria.breakout_confirmed);
    assert!(report.criteria.above_sma50);
    assert!(report.criteria.above_sma200);
    assert!(report.criteria.volume_spike);
    assert!(report.signal_score >= 70);
    assert_eq!(report.status, Status::StrongBuy);

    assert_eq!(report.indicators.buy_point, 100.1);
    assert_eq!(report.indicators.stop_loss, 92.0);
    assert_eq!(report.indicators.target, 120.0);
    assert_eq!(report.current_price, 101.0);
}

#[test]
fn recovering_handle_is_near_breakout() {
    // Handle bottoms at 92 and recovers to 99: above 97% of the rim but
    // below the buy point
    let mut tail = declining_handle();
    tail.extend((1..=5).map(|k| 92.0 + 1.4 * k as f64));
    let closes = cup_closes(&tail);
    let volumes = vec![1_000_000.0; closes.len()];

    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("NEAR", &bars(&closes, &volumes)).unwrap().unwrap();

    assert!(report.patterns.cup_and_handle.is_some());
    assert!(!report.criteria.breakout_confirmed);
    assert_eq!(report.status, Status::FormingNearBreakout);
}

#[test]
fn deep_handle_is_still_forming() {
    let closes = cup_closes(&declining_handle());
    let volumes = vec![1_000_000.0; closes.len()];

    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("FORM", &bars(&closes, &volumes)).unwrap().unwrap();

    assert!(report.patterns.cup_and_handle.is_some());
    // Current price of 92 sits below 97% of the 100 rim
    assert_eq!(report.status, Status::Forming);
    assert_eq!(report.score, report.patterns.cup_and_handle.unwrap().score);
}

#[test]
fn signal_score_and_status_stay_in_domain() {
    let scanner = Scanner::builder().build().unwrap();
    let series: Vec<Vec<f64>> = vec![
        vec![100.0; 200],
        (0..200).map(|i| 100.0 + i as f64).collect(),
        (0..200).map(|i| 300.0 - i as f64).collect(),
        cup_closes(&declining_handle()),
    ];

    for closes in series {
        let volumes = vec![1_000_000.0; closes.len()];
        let report = scanner.evaluate("X", &bars(&closes, &volumes)).unwrap().unwrap();
        assert!(report.signal_score <= 100);
        assert!(matches!(
            report.status,
            Status::StrongBuy
                | Status::Buy
                | Status::FormingNearBreakout
                | Status::Forming
                | Status::Watch
        ));
    }
}

// ============================================================
// VALUATION BOUNDARIES
// ============================================================

#[test]
fn valuation_boundary_at_fifty_closes() {
    // Below the scanner minimum, exercise the estimator directly
    let v49 = cupscan::valuation::evaluate(&vec![100.0; 49]);
    assert_eq!(v49.status, ValuationOutcome::InsufficientData);
    assert!(v49.dcf_value.is_none());

    let v50 = cupscan::valuation::evaluate(&vec![100.0; 50]);
    assert_eq!(v50.status, ValuationOutcome::Success);
    assert!(v50.dcf_value.is_some());
}

#[test]
fn report_carries_valuation_fields() {
    let closes = cup_closes(&declining_handle());
    let volumes = vec![1_000_000.0; closes.len()];
    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("VAL", &bars(&closes, &volumes)).unwrap().unwrap();

    assert!(report.dcf_value.is_some());
    assert!(report.margin_of_safety.is_some());
    assert!(report.valuation_status.is_some());
    assert!(report.returns.is_some());
    assert!(report.moving_averages.is_some());
    assert_eq!(report.details.unwrap().projection_years, 5);
}

// ============================================================
// BULK SCAN
// ============================================================

#[test]
fn bulk_scan_over_universe_symbols() {
    let scanner = Scanner::builder().build().unwrap();

    let flat: Vec<f64> = vec![100.0; 200];
    let flat_vol = vec![1_000_000.0; 200];
    let cup = cup_closes(&declining_handle());
    let cup_vol = vec![1_000_000.0; cup.len()];
    let short: Vec<f64> = vec![100.0; 30];
    let short_vol = vec![1_000_000.0; 30];

    let flat_bars = bars(&flat, &flat_vol);
    let cup_bars = bars(&cup, &cup_vol);
    let short_bars = bars(&short, &short_vol);

    let symbols: Vec<&str> = universe::SP500.iter().take(3).copied().collect();
    let instruments: Vec<(&str, &[TestBar])> = vec![
        (symbols[0], &flat_bars),
        (symbols[1], &cup_bars),
        (symbols[2], &short_bars),
    ];

    let (mut reports, skipped) = scan_parallel(&scanner, instruments);
    assert_eq!(reports.len(), 2);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].symbol, symbols[2]);

    // Forming cup sorts ahead of the patternless watch
    sort_reports(&mut reports);
    assert_eq!(reports[0].symbol, symbols[1]);
    assert_eq!(reports[0].status, Status::Forming);
    assert_eq!(reports[1].status, Status::Watch);
}

// ============================================================
// JSON CONTRACT
// ============================================================

#[test]
fn report_serializes_with_expected_keys() {
    let closes = cup_closes(&declining_handle());
    let volumes = vec![1_000_000.0; closes.len()];
    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("JSON", &bars(&closes, &volumes)).unwrap().unwrap();

    let v = serde_json::to_value(&report).unwrap();

    assert_eq!(v["symbol"], "JSON");
    assert_eq!(v["status"], "FORMING");
    assert!(v["patterns"]["cupAndHandle"]["leftRimIdx"].is_number());
    assert!(v["patterns"]["cupAndHandle"]["cupDepthPct"].is_number());
    assert!(v["patterns"]["cupAndHandle"]["handleDeclinePct"].is_number());
    assert!(v["patterns"]["ascendingTriangle"].is_null());
    assert!(v["criteria"]["aboveSMA50"].is_boolean());
    assert!(v["criteria"]["breakoutConfirmed"].is_boolean());
    assert!(v["indicators"]["volumeRatio"].is_number());
    assert!(v["indicators"]["rrRatio"].is_number());
    assert!(v["signalScore"].is_number());
    assert!(v["dcfValue"].is_number());
    assert!(v["marginOfSafety"].is_number());
    assert!(v["movingAverages"]["priceVsSMA50"].is_number());
    assert!(v["movingAverages"]["goldenCross"].is_boolean());
    assert!(v["returns"]["oneYear"].is_number());
    assert!(v["patternCount"].is_number());
}

#[test]
fn short_series_report_serializes_null_valuation() {
    // The columns path has no length gate; 40 closes still evaluate but
    // stay under the valuation minimum of 50
    let scanner = Scanner::builder().build().unwrap();
    let series = SeriesColumns::from_closes(vec![100.0; 40]);
    let report = scanner.evaluate_columns("TINY", &series);

    let v = serde_json::to_value(&report).unwrap();
    assert!(v["dcfValue"].is_null());
    assert!(v["marginOfSafety"].is_null());
    assert_eq!(v["status"], "WATCH");
}

#[test]
fn report_round_trips_through_json() {
    let closes = cup_closes(&declining_handle());
    let volumes = vec![1_000_000.0; closes.len()];
    let scanner = Scanner::builder().build().unwrap();
    let report = scanner.evaluate("RT", &bars(&closes, &volumes)).unwrap().unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let back: SymbolReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.symbol, report.symbol);
    assert_eq!(back.status, report.status);
    assert_eq!(back.signal_score, report.signal_score);
    assert_eq!(back.patterns.cup_and_handle.unwrap(), report.patterns.cup_and_handle.unwrap());
}

// ============================================================
// SENTIMENT
// ============================================================

#[test]
fn sentiment_gauge_tracks_trend_direction() {
    let scanner = Scanner::builder().build().unwrap();

    let up: Vec<f64> = (0..260).map(|i| 50.0 * 1.01f64.powi(i)).collect();
    let up_vol = vec![1_000_000.0; 260];
    let up_report = scanner.sentiment(&bars(&up, &up_vol)).unwrap();
    assert_eq!(up_report.overall_sentiment, Sentiment::Bullish);

    let down: Vec<f64> = (0..260).map(|i| 500.0 * 0.99f64.powi(i)).collect();
    let down_vol = vec![1_000_000.0; 260];
    let down_report = scanner.sentiment(&bars(&down, &down_vol)).unwrap();
    assert_eq!(down_report.overall_sentiment, Sentiment::Bearish);
}
