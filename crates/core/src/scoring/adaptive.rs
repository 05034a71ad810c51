//! Momentum score from the trailing year of daily bars: moving averages, RSI and
//! position inside the 52-week range.

use super::indicators::{range_position, rsi, sma};
use crate::domain::analysis::ScoreResult;
use crate::domain::fundamentals::{FundamentalsSnapshot, PriceHistory};

pub const MIN_BARS: usize = 50;
pub const LONG_MA_BARS: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const INSUFFICIENT_HISTORY: &str = "Insufficient historical data";

pub fn score(history: &PriceHistory, f: &FundamentalsSnapshot) -> ScoreResult {
    if history.len() < MIN_BARS {
        return ScoreResult::neutral(vec![INSUFFICIENT_HISTORY.to_string()]);
    }

    let closes = history.closes();
    let Some(price) = history.last_close() else {
        return ScoreResult::neutral(vec![INSUFFICIENT_HISTORY.to_string()]);
    };

    let mut score = 0;
    let mut reasons = Vec::new();

    if let Some(ma50) = sma(&closes, MIN_BARS) {
        if price < ma50 * 0.95 {
            score -= 15;
            reasons.push(format!("Trading below 50-day MA (${ma50:.2})"));
        } else if price > ma50 * 1.05 {
            score += 15;
            reasons.push(format!("Trading above 50-day MA (${ma50:.2})"));
        }
    }

    if history.len() >= LONG_MA_BARS {
        if let Some(ma200) = sma(&closes, LONG_MA_BARS) {
            if price < ma200 * 0.90 {
                score -= 20;
                reasons.push(format!("Significantly below 200-day MA (${ma200:.2})"));
            } else if price > ma200 * 1.10 {
                score += 20;
                reasons.push(format!("Significantly above 200-day MA (${ma200:.2})"));
            }
        }
    }

    if let Some(current_rsi) = rsi(&closes, RSI_PERIOD) {
        if current_rsi < 30.0 {
            score -= 15;
            reasons.push(format!("Oversold RSI ({current_rsi:.1})"));
        } else if current_rsi > 70.0 {
            score += 15;
            reasons.push(format!("Overbought RSI ({current_rsi:.1})"));
        }
    }

    let high = positive(f.week_52_high).or_else(|| history.max_high());
    let low = positive(f.week_52_low).or_else(|| history.min_low());
    if let Some(position) = high
        .zip(low)
        .and_then(|(high, low)| range_position(price, low, high))
    {
        if position < 0.25 {
            score -= 10;
            reasons.push(format!(
                "Near 52-week low ({:.1}% of range)",
                position * 100.0
            ));
        } else if position > 0.75 {
            score += 10;
            reasons.push(format!(
                "Near 52-week high ({:.1}% of range)",
                position * 100.0
            ));
        }
    }

    ScoreResult::clamped(score, reasons)
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}
