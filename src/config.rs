use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub metrics: MetricsConfig,
    pub challenge: ChallengeConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
    /// Leaderboard table name; interpolated into SQL, so identifier-only.
    pub table: String,
    pub max_pool_size: u32,
    /// Records fetched per scan page before the cursor is handed back.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: u32,
}

fn default_scan_page_size() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Endpoint returning three-month challenge totals keyed by user id.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    /// Endpoint that receives the assembled season payload.
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfig {
    /// Optional cron expression for season runs (e.g. "0 0 0 1 * *" = first of the month). Uses local time.
    pub cron: Option<String>,
    /// Run every N seconds when cron is not set. 0 leaves the service trigger-only.
    #[serde(default)]
    pub interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.store.path.is_empty(), "store.path must be non-empty");
        anyhow::ensure!(
            is_sql_identifier(&self.store.table),
            "store.table must be a plain identifier (ascii alphanumeric or '_'), got {:?}",
            self.store.table
        );
        anyhow::ensure!(
            self.store.max_pool_size > 0,
            "store.max_pool_size must be > 0, got {}",
            self.store.max_pool_size
        );
        anyhow::ensure!(
            self.store.scan_page_size > 0,
            "store.scan_page_size must be > 0, got {}",
            self.store.scan_page_size
        );
        anyhow::ensure!(!self.metrics.url.is_empty(), "metrics.url must be non-empty");
        anyhow::ensure!(
            !self.challenge.url.is_empty(),
            "challenge.url must be non-empty"
        );
        Ok(())
    }
}

/// Table names are interpolated into SQL; restrict to identifier characters.
pub(crate) fn is_sql_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
