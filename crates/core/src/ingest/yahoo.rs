use crate::config::Settings;
use crate::domain::fundamentals::{FundamentalsSnapshot, PriceHistory};
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::{ChartResponse, QuoteSummaryResponse};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;

const CRUMB_PATH: &str = "/v1/test/getcrumb";
const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug)]
pub struct YahooFinanceClient {
    http: reqwest::Client,
    base_url: String,
    cookie_url: String,

    // quoteSummary needs a session cookie plus a matching crumb; reuse both for the
    // life of the process.
    crumb_cache: tokio::sync::Mutex<Option<String>>,
}

impl YahooFinanceClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let user_agent = settings
            .data_provider_user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.data_provider_timeout_secs))
            .user_agent(user_agent)
            .cookie_store(true)
            .build()
            .context("failed to build Yahoo Finance http client")?;

        Ok(Self {
            http,
            base_url: settings.data_provider_base_url.clone(),
            cookie_url: settings.data_provider_cookie_url.clone(),
            crumb_cache: tokio::sync::Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_crumb_cached(&self) -> Result<String> {
        let mut guard = self.crumb_cache.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // Only sets the session cookie; the status is usually 404.
        let _ = self
            .http
            .get(&self.cookie_url)
            .send()
            .await
            .context("Yahoo cookie request failed")?;

        let res = self
            .http
            .get(self.url(CRUMB_PATH))
            .send()
            .await
            .context("Yahoo crumb request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read Yahoo crumb")?;
        if !status.is_success() {
            anyhow::bail!("Yahoo crumb HTTP {status}: {}", body_excerpt(&text));
        }

        let crumb = text.trim().to_string();
        anyhow::ensure!(!crumb.is_empty(), "Yahoo returned an empty crumb");

        tracing::debug!("obtained Yahoo crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn forget_crumb(&self) {
        *self.crumb_cache.lock().await = None;
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Option<FundamentalsSnapshot>> {
        let symbol = normalize_symbol(ticker);
        let crumb = self.get_crumb_cached().await?;

        let res = self
            .http
            .get(self.url(&format!("/v10/finance/quoteSummary/{symbol}")))
            .query(&[("modules", QUOTE_SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .send()
            .await
            .context("Yahoo quoteSummary request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Yahoo quoteSummary response")?;

        if status == StatusCode::UNAUTHORIZED {
            // Crumb expired with the session; the next request negotiates a new one.
            self.forget_crumb().await;
        }

        let snapshot = quote_summary_outcome(status, &text)?;
        if snapshot.is_none() {
            tracing::info!(ticker = %symbol, "Yahoo has no quote for symbol");
        }
        Ok(snapshot)
    }

    async fn fetch_history(&self, ticker: &str) -> Result<PriceHistory> {
        let symbol = normalize_symbol(ticker);

        let res = self
            .http
            .get(self.url(&format!("/v8/finance/chart/{symbol}")))
            .query(&[("range", "1y"), ("interval", "1d"), ("includePrePost", "false")])
            .send()
            .await
            .context("Yahoo chart request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Yahoo chart response")?;

        let history = chart_outcome(status, &text)?;
        tracing::debug!(ticker = %symbol, bars = history.len(), "fetched daily history");
        Ok(history)
    }
}

/// Yahoo takes symbols verbatim (`SHOP.TO`, `BRK-B`); only case and whitespace are
/// normalized.
pub fn normalize_symbol(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}

/// `None` for an unknown symbol (HTTP 404 or a `Not Found` error body) and for a
/// quote without a usable price.
fn quote_summary_outcome(status: StatusCode, text: &str) -> Result<Option<FundamentalsSnapshot>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        anyhow::bail!("Yahoo quoteSummary HTTP {status}: {}", body_excerpt(text));
    }

    let parsed = serde_json::from_str::<QuoteSummaryResponse>(text)
        .context("failed to parse Yahoo quoteSummary response")?;

    if let Some(err) = parsed.quote_summary.error {
        if err.code.eq_ignore_ascii_case("not found") {
            return Ok(None);
        }
        anyhow::bail!("Yahoo quoteSummary error {}: {}", err.code, err.description);
    }

    Ok(parsed
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.into_snapshot()))
}

fn chart_outcome(status: StatusCode, text: &str) -> Result<PriceHistory> {
    if !status.is_success() {
        anyhow::bail!("Yahoo chart HTTP {status}: {}", body_excerpt(text));
    }

    let parsed =
        serde_json::from_str::<ChartResponse>(text).context("failed to parse Yahoo chart response")?;

    if let Some(err) = parsed.chart.error {
        anyhow::bail!("Yahoo chart error {}: {}", err.code, err.description);
    }

    let result = parsed
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("Yahoo chart response has no result")?;

    Ok(result.into_history())
}

/// Upstream error pages can be whole HTML documents; keep the head only.
fn body_excerpt(text: &str) -> &str {
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
