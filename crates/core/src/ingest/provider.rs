use crate::domain::fundamentals::{FundamentalsSnapshot, PriceHistory};
use anyhow::Result;

/// Source of fundamentals and daily bars for a ticker.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// `Ok(None)` when the symbol is unknown or has no resolvable current price.
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Option<FundamentalsSnapshot>>;

    /// Up to one year of daily bars, oldest first.
    async fn fetch_history(&self, ticker: &str) -> Result<PriceHistory>;
}
