use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raex_core::cache::AnalysisCache;
use raex_core::ingest::yahoo::YahooFinanceClient;
use raex_core::service::Analyzer;

#[derive(Debug, Parser)]
#[command(name = "raex_cli")]
struct Args {
    /// Ticker symbol to analyze. Repeat to analyze several in one run.
    #[arg(long = "ticker", required = true)]
    tickers: Vec<String>,

    /// Percent (0-100) of the combined score taken from the rational side.
    #[arg(long, default_value_t = 50.0)]
    rational_weight: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = raex_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let provider = YahooFinanceClient::from_settings(&settings)?;
    let analyzer = Analyzer::new(
        Arc::new(provider),
        Arc::new(AnalysisCache::default()),
        settings.fetch_delay(),
    );

    let mut failures: usize = 0;
    for ticker in &args.tickers {
        match analyzer.analyze(ticker, Some(args.rational_weight)).await {
            Ok(resp) => {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            }
            Err(err) => {
                failures += 1;
                if err.status_code() >= 500 {
                    sentry_anyhow::capture_anyhow(&anyhow::anyhow!("{err}"));
                }
                tracing::error!(
                    ticker = %ticker,
                    status = err.status_code(),
                    error = %err,
                    "analysis failed"
                );
            }
        }
    }

    anyhow::ensure!(
        failures == 0,
        "{failures} of {} tickers failed",
        args.tickers.len()
    );
    Ok(())
}

fn init_sentry(settings: &raex_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
