use crate::cache::AnalysisCache;
use crate::domain::analysis::{AnalysisResponse, AnalysisResult, ScoreResult};
use crate::ingest::provider::MarketDataProvider;
use crate::scoring::{adaptive, rational};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RATIONAL_WEIGHT_PCT: f64 = 50.0;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Please enter a ticker symbol")]
    EmptyTicker,

    #[error("{0}")]
    Validation(String),

    #[error("Could not fetch data for {0}. Please check the ticker symbol or try again later.")]
    NotFound(String),

    #[error("Rate limit reached. Please wait 15-20 minutes before trying again.")]
    RateLimited,

    #[error("Error: {0}")]
    Internal(String),
}

impl AnalyzeError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyTicker | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::RateLimited => 429,
            Self::Internal(_) => 500,
        }
    }

    /// Upstream throttling is only recognizable from the error text.
    pub fn from_provider(err: anyhow::Error) -> Self {
        let message = format!("{err:#}");
        let lower = message.to_lowercase();
        if lower.contains("rate") || lower.contains("429") {
            Self::RateLimited
        } else {
            Self::Internal(message)
        }
    }
}

/// Cache-first analysis of a single ticker.
pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<AnalysisCache>,
    fetch_delay: Duration,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<AnalysisCache>,
        fetch_delay: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            fetch_delay,
        }
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// `rational_weight_pct` is on a 0-100 scale and defaults to 50.
    pub async fn analyze(
        &self,
        ticker: &str,
        rational_weight_pct: Option<f64>,
    ) -> Result<AnalysisResponse, AnalyzeError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AnalyzeError::EmptyTicker);
        }
        let weight = rational_weight_fraction(rational_weight_pct)?;

        if let Some(cached) = self.cache.lookup(&ticker).await {
            tracing::info!(ticker = %ticker, "using cached analysis");
            return Ok(AnalysisResponse::from_result(&cached, weight));
        }

        tracing::info!(
            ticker = %ticker,
            provider = self.provider.provider_name(),
            "fetching fresh data"
        );
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        let result = self.fetch_and_score(&ticker).await?;
        self.cache.store(&ticker, result.clone()).await;

        Ok(AnalysisResponse::from_result(&result, weight))
    }

    async fn fetch_and_score(&self, ticker: &str) -> Result<AnalysisResult, AnalyzeError> {
        let fundamentals = self
            .provider
            .fetch_fundamentals(ticker)
            .await
            .map_err(|err| {
                tracing::error!(ticker = %ticker, error = %err, "fundamentals fetch failed");
                AnalyzeError::from_provider(err)
            })?
            .ok_or_else(|| AnalyzeError::NotFound(ticker.to_string()))?;

        let rational = rational::score(&fundamentals);

        let adaptive = match self.provider.fetch_history(ticker).await {
            Ok(history) => adaptive::score(&history, &fundamentals),
            Err(err) => {
                tracing::warn!(ticker = %ticker, error = %err, "history fetch failed; adaptive score neutral");
                ScoreResult::neutral(Vec::new())
            }
        };

        tracing::debug!(
            ticker = %ticker,
            rational = rational.score,
            adaptive = adaptive.score,
            "scored ticker"
        );

        Ok(AnalysisResult {
            ticker: ticker.to_string(),
            fundamentals,
            rational,
            adaptive,
        })
    }
}

fn rational_weight_fraction(pct: Option<f64>) -> Result<f64, AnalyzeError> {
    let pct = pct.unwrap_or(DEFAULT_RATIONAL_WEIGHT_PCT);
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(AnalyzeError::Validation(format!(
            "rational_weight must be between 0 and 100 (got {pct})"
        )));
    }
    Ok(pct / 100.0)
}
