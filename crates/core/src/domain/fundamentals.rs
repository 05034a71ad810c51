use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Industry P/E assumed when the provider does not report one.
pub const DEFAULT_INDUSTRY_PE: f64 = 25.0;

/// Point-in-time fundamentals for one ticker. Only the current price is required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    pub company_name: Option<String>,
    pub current_price: f64,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub industry_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub profit_margin: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub market_cap: Option<u64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl FundamentalsSnapshot {
    pub fn industry_pe(&self) -> f64 {
        self.industry_pe.unwrap_or(DEFAULT_INDUSTRY_PE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Daily bars, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn max_high(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.high).reduce(f64::max)
    }

    pub fn min_low(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.low).reduce(f64::min)
    }
}
