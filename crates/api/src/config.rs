/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Weighted-workload ceiling above which a reviewer gets no new
    /// assignments (default: `100`).
    pub workload_ceiling: i64,
    /// How often the background rebalancer runs, in seconds (default: `300`).
    pub rebalance_interval_secs: u64,
    /// Overload multiple of the mean weighted workload that marks a donor
    /// for rebalancing (default: `1.5`).
    pub overload_factor: f64,
    /// Worker-pool width for batch execution (default: `8`).
    pub batch_width: usize,
    /// Performance scoring window in days (default: `30`).
    pub score_window_days: u32,
    /// Salt mixed into anonymized reviewer tokens.
    pub anonymizer_salt: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `WORKLOAD_CEILING`       | `100`                      |
    /// | `REBALANCE_INTERVAL_SECS`| `300`                      |
    /// | `OVERLOAD_FACTOR`        | `1.5`                      |
    /// | `BATCH_WIDTH`            | `8`                        |
    /// | `SCORE_WINDOW_DAYS`      | `30`                       |
    /// | `ANONYMIZER_SALT`        | `dev-salt`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let workload_ceiling: i64 = std::env::var("WORKLOAD_CEILING")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("WORKLOAD_CEILING must be a valid i64");

        let rebalance_interval_secs: u64 = std::env::var("REBALANCE_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REBALANCE_INTERVAL_SECS must be a valid u64");

        let overload_factor: f64 = std::env::var("OVERLOAD_FACTOR")
            .unwrap_or_else(|_| "1.5".into())
            .parse()
            .expect("OVERLOAD_FACTOR must be a valid f64");

        let batch_width: usize = std::env::var("BATCH_WIDTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("BATCH_WIDTH must be a valid usize");

        let score_window_days: u32 = std::env::var("SCORE_WINDOW_DAYS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SCORE_WINDOW_DAYS must be a valid u32");

        let anonymizer_salt =
            std::env::var("ANONYMIZER_SALT").unwrap_or_else(|_| "dev-salt".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            workload_ceiling,
            rebalance_interval_secs,
            overload_factor,
            batch_width,
            score_window_days,
            anonymizer_salt,
        }
    }
}
