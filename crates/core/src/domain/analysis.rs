use crate::domain::fundamentals::FundamentalsSnapshot;
use crate::scoring::combine::combine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCORE_MIN: i32 = -50;
pub const SCORE_MAX: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: i32,
    pub reasons: Vec<String>,
}

impl ScoreResult {
    /// Clamps the accumulated sum into [-50, 50].
    pub fn clamped(raw: i32, reasons: Vec<String>) -> Self {
        Self {
            score: raw.clamp(SCORE_MIN, SCORE_MAX),
            reasons,
        }
    }

    pub fn neutral(reasons: Vec<String>) -> Self {
        Self { score: 0, reasons }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG SELL",
        }
    }

    pub fn signal_class(self) -> &'static str {
        match self {
            Self::StrongBuy => "strong-buy",
            Self::Buy => "buy",
            Self::Hold => "hold",
            Self::Sell => "sell",
            Self::StrongSell => "strong-sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedResult {
    pub score: f64,
    pub recommendation: Recommendation,
}

/// Weight-independent outcome of a fresh fetch. This is what the cache keeps, so a
/// hit can be recombined with whatever weight the next caller asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: String,
    pub fundamentals: FundamentalsSnapshot,
    pub rational: ScoreResult,
    pub adaptive: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub ticker: String,
    pub company_name: String,
    pub current_price: f64,
    pub rational_score: i32,
    pub adaptive_score: i32,
    pub combined_score: f64,
    pub recommendation: String,
    pub signal_class: String,
    pub rational_reasons: Vec<String>,
    pub adaptive_reasons: Vec<String>,
    pub rational_weight: f64,
    pub adaptive_weight: f64,
    pub pe_ratio: Value,
    pub forward_pe: Value,
    pub peg_ratio: Value,
    pub price_to_book: Value,
    pub market_cap: Value,
    pub sector: Value,
    pub industry: Value,
}

impl AnalysisResponse {
    /// `rational_weight` is a fraction in [0, 1].
    pub fn from_result(result: &AnalysisResult, rational_weight: f64) -> Self {
        let combined = combine(result.rational.score, result.adaptive.score, rational_weight);
        let f = &result.fundamentals;

        Self {
            ticker: result.ticker.clone(),
            company_name: f
                .company_name
                .clone()
                .unwrap_or_else(|| result.ticker.clone()),
            current_price: f.current_price,
            rational_score: result.rational.score,
            adaptive_score: result.adaptive.score,
            combined_score: round2(combined.score),
            recommendation: combined.recommendation.label().to_string(),
            signal_class: combined.recommendation.signal_class().to_string(),
            rational_reasons: result.rational.reasons.clone(),
            adaptive_reasons: result.adaptive.reasons.clone(),
            rational_weight,
            adaptive_weight: 1.0 - rational_weight,
            pe_ratio: number_or_na(f.pe_ratio),
            forward_pe: number_or_na(f.forward_pe),
            peg_ratio: number_or_na(f.peg_ratio),
            price_to_book: number_or_na(f.price_to_book),
            market_cap: f.market_cap.map(Value::from).unwrap_or_else(na),
            sector: text_or_na(f.sector.as_deref()),
            industry: text_or_na(f.industry.as_deref()),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn na() -> Value {
    Value::String("N/A".to_string())
}

fn number_or_na(v: Option<f64>) -> Value {
    v.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(na)
}

fn text_or_na(v: Option<&str>) -> Value {
    v.map(Value::from).unwrap_or_else(na)
}
