//! Benchmarks for pattern detection and full-report evaluation.
//!
//! The MACD bench exists to keep the quadratic signal-line recomputation
//! visible: at daily-bar scale (~250 closes) it is cheap, but the cost
//! grows fast if callers feed multi-year intraday series.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cupscan::prelude::*;
use cupscan::indicators;

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
    self.c + 1.0
  }

  fn low(&self) -> f64 {
    self.c - 1.0
  }

  fn close(&self) -> f64 {
    self.c
  }

  fn volume(&self) -> f64 {
    self.v
  }
}

/// Generate realistic wavy bars
fn generate_bars(n: usize) -> Vec<TestBar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    price = (price + change).max(1.0);
    let volume = 1_000_000.0 + ((i * 37) % 500_000) as f64;
    bars.push(TestBar { c: price, v: volume });
  }

  bars
}

fn bench_cup_detection(c: &mut Criterion) {
  let detector = CupHandleDetector::with_defaults();
  let mut group = c.benchmark_group("cup_handle");

  for n in [250, 500, 1000] {
    let bars = generate_bars(n);
    let series = SeriesColumns::from_bars(&bars);
    group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, series| {
      b.iter(|| detector.detect_in(black_box(&series.closes)));
    });
  }

  group.finish();
}

fn bench_macd_quadratic(c: &mut Criterion) {
  let mut group = c.benchmark_group("macd");

  for n in [250, 500, 1000] {
    let closes: Vec<f64> = generate_bars(n).iter().map(|b| b.c).collect();
    group.bench_with_input(BenchmarkId::from_parameter(n), &closes, |b, closes| {
      b.iter(|| indicators::macd(black_box(closes)));
    });
  }

  group.finish();
}

fn bench_full_evaluation(c: &mut Criterion) {
  let scanner = Scanner::builder().build().unwrap();
  let bars = generate_bars(250);

  c.bench_function("evaluate_250_bars", |b| {
    b.iter(|| scanner.evaluate(black_box("BENCH"), black_box(&bars)));
  });
}

fn bench_parallel_scan(c: &mut Criterion) {
  let scanner = Scanner::builder().build().unwrap();
  let universe: Vec<Vec<TestBar>> = (0..16).map(|i| generate_bars(250 + i * 3)).collect();

  c.bench_function("scan_parallel_16_symbols", |b| {
    b.iter(|| {
      let instruments: Vec<(&str, &[TestBar])> =
        universe.iter().map(|bars| ("BENCH", bars.as_slice())).collect();
      scan_parallel(&scanner, instruments)
    });
  });
}

criterion_group!(
  benches,
  bench_cup_detection,
  bench_macd_quadratic,
  bench_full_evaluation,
  bench_parallel_scan
);
criterion_main!(benches);
