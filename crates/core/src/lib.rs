pub mod cache;
pub mod domain;
pub mod ingest;
pub mod scoring;
pub mod service;

pub mod config {
    const DEFAULT_PORT: u16 = 3000;
    const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
    const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_REQ_DELAY_MS: u64 = 2000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub sentry_dsn: Option<String>,
        pub data_provider_base_url: String,
        pub data_provider_cookie_url: String,
        pub data_provider_timeout_secs: u64,
        pub data_provider_req_delay_ms: u64,
        pub data_provider_user_agent: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                port: parse_env("PORT").unwrap_or(DEFAULT_PORT),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                data_provider_base_url: std::env::var("DATA_PROVIDER_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                data_provider_cookie_url: std::env::var("DATA_PROVIDER_COOKIE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_COOKIE_URL.to_string()),
                data_provider_timeout_secs: parse_env("DATA_PROVIDER_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
                data_provider_req_delay_ms: parse_env("DATA_PROVIDER_REQ_DELAY_MS")
                    .unwrap_or(DEFAULT_REQ_DELAY_MS),
                data_provider_user_agent: std::env::var("DATA_PROVIDER_USER_AGENT")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
            })
        }

        pub fn fetch_delay(&self) -> std::time::Duration {
            std::time::Duration::from_millis(self.data_provider_req_delay_ms)
        }
    }

    fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
    }
}
