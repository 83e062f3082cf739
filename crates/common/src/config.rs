use std::time::Duration;

/// Where price history comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Upstox,
    Offline,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Upstox => write!(f, "upstox"),
            DataSource::Offline => write!(f, "offline"),
        }
    }
}

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Data source
    pub data_source: DataSource,
    pub upstox_access_token: Option<String>,
    pub instruments_csv_path: Option<String>,
    pub offline_data_dir: String,

    // HTTP boundary
    pub port: u16,

    // Scan scheduling
    pub max_workers: usize,
    pub submit_stagger: Duration,
    pub fetch_timeout: Duration,

    // Registry files
    pub strategy_config_path: String,
    pub universe_config_path: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let data_source = match optional_env("DATA_SOURCE")
            .unwrap_or_else(|| "upstox".to_string())
            .to_lowercase()
            .as_str()
        {
            "upstox" => DataSource::Upstox,
            "offline" => DataSource::Offline,
            other => panic!("ERROR: DATA_SOURCE must be 'upstox' or 'offline', got: '{other}'"),
        };

        let (upstox_access_token, instruments_csv_path) = match data_source {
            DataSource::Upstox => (
                Some(required_env("UPSTOX_ACCESS_TOKEN")),
                Some(required_env("INSTRUMENTS_CSV")),
            ),
            DataSource::Offline => (None, None),
        };

        let max_workers: usize = optional_env("SCAN_MAX_WORKERS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Config {
            data_source,
            upstox_access_token,
            instruments_csv_path,
            offline_data_dir: optional_env("OFFLINE_DATA_DIR")
                .unwrap_or_else(|| "data/offline".to_string()),
            port: optional_env("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5001),
            max_workers: max_workers.max(1),
            submit_stagger: Duration::from_millis(
                optional_env("SCAN_SUBMIT_STAGGER_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(45),
            ),
            fetch_timeout: Duration::from_secs(
                optional_env("FETCH_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
            universe_config_path: optional_env("UNIVERSE_CONFIG_PATH")
                .unwrap_or_else(|| "config/universes.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
