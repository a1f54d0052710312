//! Breakout signal evaluator
//!
//! Combines a cup-and-handle match (when present) with the indicator
//! snapshot into a fixed checklist of breakout criteria, a 0-100 signal
//! score, and a status label. Also hosts the lighter market-sentiment
//! gauge derived from the same series.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detectors::CupHandlePattern;
use crate::indicators::{self, IndicatorSet};
use crate::{round_dp1, round_dp2, SeriesColumns};

// ============================================================
// STATUS
// ============================================================

/// Classification of a scanned symbol, ordered from most to least
/// actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "FORMING - NEAR BREAKOUT")]
    FormingNearBreakout,
    #[serde(rename = "FORMING")]
    Forming,
    #[serde(rename = "WATCH")]
    Watch,
}

impl Status {
    /// Sort priority: lower is more actionable.
    pub fn priority(self) -> u8 {
        match self {
            Status::StrongBuy => 0,
            Status::Buy => 1,
            Status::FormingNearBreakout => 2,
            Status::Forming => 3,
            Status::Watch => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::StrongBuy => "STRONG BUY",
            Status::Buy => "BUY",
            Status::FormingNearBreakout => "FORMING - NEAR BREAKOUT",
            Status::Forming => "FORMING",
            Status::Watch => "WATCH",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// BREAKOUT CRITERIA
// ============================================================

/// The fixed checklist behind the signal score.
///
/// `rsi_acceptable` is reported but carries no score weight; consumers
/// use it as a softer filter. `bullish_candle` approximates candle bodies
/// from consecutive closes because true opens are not available on this
/// computation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutCriteria {
    pub breakout_confirmed: bool,
    #[serde(rename = "aboveSMA50")]
    pub above_sma50: bool,
    #[serde(rename = "aboveSMA200")]
    pub above_sma200: bool,
    pub rsi_healthy: bool,
    pub rsi_acceptable: bool,
    pub volume_spike: bool,
    pub macd_bullish: bool,
    pub macd_crossover: bool,
    pub bullish_candle: bool,
}

impl BreakoutCriteria {
    /// Weighted sum of the scored criteria, 0-100.
    pub fn score(&self) -> u32 {
        let mut score = 0;
        if self.breakout_confirmed {
            score += 25;
        }
        if self.above_sma50 {
            score += 15;
        }
        if self.above_sma200 {
            score += 15;
        }
        if self.rsi_healthy {
            score += 10;
        }
        if self.volume_spike {
            score += 15;
        }
        if self.macd_bullish {
            score += 10;
        }
        if self.macd_crossover {
            score += 5;
        }
        if self.bullish_candle {
            score += 5;
        }
        score
    }
}

// ============================================================
// SIGNAL REPORT
// ============================================================

/// The evaluator's full output: trade levels, rounded indicator readouts,
/// the criteria checklist, and the derived score and status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub current_price: f64,
    pub buy_point: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub rr_ratio: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub rsi: f64,
    pub adx: f64,
    pub volume_ratio: f64,
    pub macd_bullish: bool,
    pub criteria: BreakoutCriteria,
    pub signal_score: u32,
    pub status: Status,
}

/// Evaluate the breakout checklist over a series and an optional cup
/// match.
///
/// Monetary outputs are rounded to 2 decimals, RSI/ADX and the
/// risk:reward ratio to 1, the volume ratio to 2. An empty series yields
/// an all-zero WATCH report.
pub fn evaluate(series: &SeriesColumns, cup: Option<&CupHandlePattern>) -> SignalReport {
    let closes = &series.closes;
    let n = closes.len();
    if n == 0 {
        return SignalReport {
            current_price: 0.0,
            buy_point: 0.0,
            stop_loss: 0.0,
            target: 0.0,
            rr_ratio: 0.0,
            sma50: 0.0,
            sma200: 0.0,
            rsi: 50.0,
            adx: 0.0,
            volume_ratio: 1.0,
            macd_bullish: false,
            criteria: BreakoutCriteria::default(),
            signal_score: 0,
            status: Status::Watch,
        };
    }

    let current_price = closes[n - 1];
    let prev_close = if n >= 2 { closes[n - 2] } else { current_price };
    let prev_open = if n >= 3 { closes[n - 3] } else { current_price };

    let ind = IndicatorSet::compute(series);

    // Trade levels come straight off the cup geometry
    let (buy_point, stop_loss, target) = match cup {
        Some(p) => {
            let buy = p.right_rim_price + 0.10;
            let target = p.right_rim_price + (p.right_rim_price - p.bottom_price);
            (buy, p.handle_low, target)
        },
        None => (0.0, 0.0, 0.0),
    };

    // Candle anatomy from closes: previous close stands in for today's
    // open, the bar before that for yesterday's open
    let body = current_price - prev_close;
    let full_range = series.highs[n - 1] - series.lows[n - 1];
    let is_bullish_candle = body > 0.0 && full_range > 0.0 && body > full_range * 0.6;
    let prev_body = prev_close - prev_open;
    let is_engulfing = prev_body < 0.0 && body > 0.0;

    let criteria = BreakoutCriteria {
        breakout_confirmed: cup.is_some() && current_price > buy_point,
        above_sma50: current_price > ind.sma50,
        above_sma200: current_price > ind.sma200,
        rsi_healthy: (50.0..=70.0).contains(&ind.rsi),
        rsi_acceptable: (45.0..=75.0).contains(&ind.rsi),
        volume_spike: ind.volume_ratio > 1.5,
        macd_bullish: ind.macd.bullish,
        macd_crossover: ind.macd.histogram > 0.0 && ind.macd.histogram < 0.5,
        bullish_candle: is_bullish_candle || is_engulfing,
    };

    let signal_score = criteria.score();

    let status = match cup {
        Some(p) => {
            if criteria.breakout_confirmed && criteria.above_sma50 && criteria.above_sma200 {
                if signal_score >= 70 {
                    Status::StrongBuy
                } else if signal_score >= 50 {
                    Status::Buy
                } else {
                    Status::Watch
                }
            } else if !criteria.breakout_confirmed && current_price > p.right_rim_price * 0.97 {
                Status::FormingNearBreakout
            } else if !criteria.breakout_confirmed {
                Status::Forming
            } else {
                Status::Watch
            }
        },
        None => Status::Watch,
    };

    let risk = buy_point - stop_loss;
    let reward = target - buy_point;
    let rr_ratio = if risk > 0.0 { reward / risk } else { 0.0 };

    SignalReport {
        current_price: round_dp2(current_price),
        buy_point: round_dp2(buy_point),
        stop_loss: round_dp2(stop_loss),
        target: round_dp2(target),
        rr_ratio: round_dp1(rr_ratio),
        sma50: round_dp2(ind.sma50),
        sma200: round_dp2(ind.sma200),
        rsi: round_dp1(ind.rsi),
        adx: round_dp1(ind.adx),
        volume_ratio: round_dp2(ind.volume_ratio),
        macd_bullish: ind.macd.bullish,
        criteria,
        signal_score,
        status,
    }
}

// ============================================================
// SENTIMENT
// ============================================================

/// Overall market read for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

/// Recent volume participation relative to its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeStrength {
    High,
    Normal,
    Low,
}

/// Qualitative tone bucket derived from the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

/// Heuristic sentiment gauge: moving-average position, RSI extremes, and
/// 20-day momentum around a neutral base of 50.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub overall_sentiment: Sentiment,
    pub sentiment_score: u32,
    pub price_momentum: f64,
    pub volume_strength: VolumeStrength,
    pub news_sentiment: Tone,
}

/// Compute the sentiment gauge. Requires at least 50 closes.
pub fn sentiment(series: &SeriesColumns) -> Option<SentimentReport> {
    let closes = &series.closes;
    let n = closes.len();
    if n < 50 {
        return None;
    }

    let current = closes[n - 1];
    let sma50 = indicators::sma(closes, 50);
    let sma200 = indicators::sma(closes, 200);
    let rsi = indicators::rsi(closes, indicators::DEFAULT_PERIOD);
    let volume_ratio = indicators::volume_ratio(&series.volumes);

    let anchor = closes[n.saturating_sub(20)];
    let momentum = (current - anchor) / anchor * 100.0;

    let mut score: i32 = 50;
    if current > sma50 && current > sma200 {
        score += 15;
    } else if current < sma50 && current < sma200 {
        score -= 15;
    }
    if rsi > 70.0 {
        score -= 10;
    } else if rsi < 30.0 {
        score += 10;
    }
    if momentum > 10.0 {
        score += 10;
    } else if momentum < -10.0 {
        score -= 10;
    }
    let score = score.clamp(0, 100) as u32;

    let overall = if score > 60 {
        Sentiment::Bullish
    } else if score < 40 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    };

    let volume_strength = if volume_ratio > 1.2 {
        VolumeStrength::High
    } else if volume_ratio > 0.8 {
        VolumeStrength::Normal
    } else {
        VolumeStrength::Low
    };

    let news_sentiment = if score > 55 {
        Tone::Positive
    } else if score < 45 {
        Tone::Negative
    } else {
        Tone::Neutral
    };

    Some(SentimentReport {
        overall_sentiment: overall,
        sentiment_score: score,
        price_momentum: round_dp1(momentum),
        volume_strength,
        news_sentiment,
    })
}

// ============================================================
// TESTS
// ============================================================
