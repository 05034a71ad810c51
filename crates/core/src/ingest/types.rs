//! Yahoo Finance wire shapes and their conversion into domain types.

use crate::domain::fundamentals::{FundamentalsSnapshot, PriceBar, PriceHistory};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<YahooError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YahooError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: PriceModule,
    #[serde(default)]
    pub summary_detail: SummaryDetailModule,
    #[serde(default)]
    pub default_key_statistics: KeyStatisticsModule,
    #[serde(default)]
    pub financial_data: FinancialDataModule,
    #[serde(default)]
    pub asset_profile: AssetProfileModule,
}

/// Yahoo numbers arrive as `{"raw": 1.23, "fmt": "1.23"}`, `{}` when absent, and
/// occasionally `"Infinity"` for the raw value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YahooNumber {
    #[serde(default)]
    pub raw: Value,
}

impl YahooNumber {
    fn value(&self) -> Option<f64> {
        self.raw.as_f64().filter(|v| v.is_finite())
    }
}

fn num(v: &Option<YahooNumber>) -> Option<f64> {
    v.as_ref().and_then(YahooNumber::value)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub regular_market_price: Option<YahooNumber>,
    pub market_cap: Option<YahooNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<YahooNumber>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<YahooNumber>,
    pub fifty_two_week_high: Option<YahooNumber>,
    pub fifty_two_week_low: Option<YahooNumber>,
    pub market_cap: Option<YahooNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatisticsModule {
    pub peg_ratio: Option<YahooNumber>,
    pub price_to_book: Option<YahooNumber>,
    pub profit_margins: Option<YahooNumber>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<YahooNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    pub current_price: Option<YahooNumber>,
    pub profit_margins: Option<YahooNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfileModule {
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl QuoteSummaryResult {
    /// `None` when neither `currentPrice` nor `regularMarketPrice` is usable.
    pub fn into_snapshot(self) -> Option<FundamentalsSnapshot> {
        let current_price = num(&self.financial_data.current_price)
            .or_else(|| num(&self.price.regular_market_price))
            .filter(|p| *p > 0.0)?;

        let market_cap = num(&self.summary_detail.market_cap)
            .or_else(|| num(&self.price.market_cap))
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u64);

        Some(FundamentalsSnapshot {
            company_name: non_empty(self.price.long_name).or_else(|| non_empty(self.price.short_name)),
            current_price,
            pe_ratio: num(&self.summary_detail.trailing_pe),
            forward_pe: num(&self.summary_detail.forward_pe)
                .or_else(|| num(&self.default_key_statistics.forward_pe)),
            // Yahoo does not publish an industry P/E.
            industry_pe: None,
            peg_ratio: num(&self.default_key_statistics.peg_ratio),
            price_to_book: num(&self.default_key_statistics.price_to_book),
            profit_margin: num(&self.financial_data.profit_margins)
                .or_else(|| num(&self.default_key_statistics.profit_margins)),
            week_52_high: num(&self.summary_detail.fifty_two_week_high),
            week_52_low: num(&self.summary_detail.fifty_two_week_low),
            market_cap,
            sector: non_empty(self.asset_profile.sector),
            industry: non_empty(self.asset_profile.industry),
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<YahooError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Drops bars without a positive close. Missing high/low fall back to the close.
    pub fn into_history(self) -> PriceHistory {
        let timestamps = self.timestamp.unwrap_or_default();
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(close) = at(&quote.close, i).filter(|c| c.is_finite() && *c > 0.0) else {
                continue;
            };
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            bars.push(PriceBar {
                date,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i),
            });
        }

        PriceHistory::new(bars)
    }
}

fn at(v: &[Option<f64>], i: usize) -> Option<f64> {
    v.get(i).copied().flatten()
}
