use crate::domain::analysis::{CombinedResult, Recommendation, SCORE_MAX, SCORE_MIN};

/// Convex blend of the two scores; `rational_weight` is a fraction in [0, 1].
pub fn combine(rational: i32, adaptive: i32, rational_weight: f64) -> CombinedResult {
    // Clamp only absorbs float rounding at the extremes.
    let score = (f64::from(rational) * rational_weight
        + f64::from(adaptive) * (1.0 - rational_weight))
        .clamp(f64::from(SCORE_MIN), f64::from(SCORE_MAX));
    CombinedResult {
        score,
        recommendation: bucket(score),
    }
}

/// First match wins: both buy-side thresholds are tested before the sell side.
pub fn bucket(combined: f64) -> Recommendation {
    if combined < -20.0 {
        Recommendation::StrongBuy
    } else if combined < -5.0 {
        Recommendation::Buy
    } else if combined > 20.0 {
        Recommendation::StrongSell
    } else if combined > 5.0 {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}
