use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use raex_core::domain::analysis::AnalysisResponse;
use raex_core::service::{AnalyzeError, Analyzer};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    ticker: Option<String>,

    /// Percent (0-100) of the combined score taken from the rational side.
    #[serde(default)]
    rational_weight: Option<f64>,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(req) = payload
        .map_err(|rejection| AnalyzeError::Validation(rejection.body_text()))?;

    let ticker = req.ticker.unwrap_or_default();
    let resp = state
        .analyzer
        .analyze(&ticker, req.rational_weight)
        .await?;

    Ok(Json(resp))
}

struct ApiError(AnalyzeError);

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            let err = anyhow::anyhow!("{}", self.0);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "analyze request failed");
        } else {
            tracing::info!(http_status = %status, error = %self.0, "analyze request rejected");
        }

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, NaiveDate};
    use raex_core::cache::AnalysisCache;
    use raex_core::domain::fundamentals::{FundamentalsSnapshot, PriceBar, PriceHistory};
    use raex_core::ingest::provider::MarketDataProvider;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StaticProvider {
        fail_with: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for StaticProvider {
        fn provider_name(&self) -> &'static str {
            "static"
        }

        async fn fetch_fundamentals(
            &self,
            ticker: &str,
        ) -> anyhow::Result<Option<FundamentalsSnapshot>> {
            if let Some(msg) = self.fail_with {
                anyhow::bail!("{msg}");
            }
            if ticker != "ACME" {
                return Ok(None);
            }
            Ok(Some(FundamentalsSnapshot {
                company_name: Some("Acme Corp".to_string()),
                current_price: 120.0,
                pe_ratio: Some(35.0),
                peg_ratio: Some(2.5),
                sector: Some("Industrials".to_string()),
                ..Default::default()
            }))
        }

        async fn fetch_history(&self, _ticker: &str) -> anyhow::Result<PriceHistory> {
            let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
            Ok(PriceHistory::new(
                (0..30)
                    .map(|i| PriceBar {
                        date: start + Duration::days(i),
                        open: 120.0,
                        high: 121.0,
                        low: 119.0,
                        close: 120.0,
                        volume: None,
                    })
                    .collect(),
            ))
        }
    }

    fn app(fail_with: Option<&'static str>) -> Router {
        let analyzer = Analyzer::new(
            Arc::new(StaticProvider { fail_with }),
            Arc::new(AnalysisCache::default()),
            std::time::Duration::ZERO,
        );
        router(AppState {
            analyzer: Arc::new(analyzer),
        })
    }

    async fn post_analyze(app: Router, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn healthz_says_ok() {
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let res = app(None).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn analyze_returns_full_payload() {
        let (status, v) =
            post_analyze(app(None), r#"{"ticker": "acme", "rational_weight": 80}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["ticker"], json!("ACME"));
        assert_eq!(v["company_name"], json!("Acme Corp"));
        assert_eq!(v["current_price"], json!(120.0));
        // High P/E (+20) and high PEG (+15); 30 bars is too short for momentum.
        assert_eq!(v["rational_score"], json!(35));
        assert_eq!(v["adaptive_score"], json!(0));
        assert_eq!(v["adaptive_reasons"], json!(["Insufficient historical data"]));
        assert_eq!(v["combined_score"], json!(28.0));
        assert_eq!(v["recommendation"], json!("STRONG SELL"));
        assert_eq!(v["signal_class"], json!("strong-sell"));
        assert_eq!(v["rational_weight"], json!(0.8));
        assert_eq!(v["rational_reasons"].as_array().unwrap().len(), 2);
        assert_eq!(v["pe_ratio"], json!(35.0));
        assert_eq!(v["forward_pe"], json!("N/A"));
        assert_eq!(v["market_cap"], json!("N/A"));
        assert_eq!(v["sector"], json!("Industrials"));
        assert_eq!(v["industry"], json!("N/A"));
    }

    #[tokio::test]
    async fn empty_ticker_is_400() {
        let (status, v) = post_analyze(app(None), r#"{"ticker": "  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"], json!("Please enter a ticker symbol"));

        let (status, _) = post_analyze(app(None), r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let (status, v) = post_analyze(app(None), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(v["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_ticker_is_404() {
        let (status, v) = post_analyze(app(None), r#"{"ticker": "nope"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            v["error"],
            json!("Could not fetch data for NOPE. Please check the ticker symbol or try again later.")
        );
    }

    #[tokio::test]
    async fn upstream_throttling_is_429() {
        let app = app(Some("Yahoo quoteSummary HTTP 429 Too Many Requests: "));
        let (status, v) = post_analyze(app, r#"{"ticker": "ACME"}"#).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            v["error"],
            json!("Rate limit reached. Please wait 15-20 minutes before trying again.")
        );
    }

    #[tokio::test]
    async fn other_upstream_failure_is_500() {
        let app = app(Some("connection closed before message completed"));
        let (status, v) = post_analyze(app, r#"{"ticker": "ACME"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            v["error"],
            json!("Error: connection closed before message completed")
        );
    }
}
