use clap::{Parser, ValueEnum};
use std::time::Duration;

/// How the fixture window is chosen for `/api/matches`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// One calendar day (the `date` query parameter, or today).
    Day,
    /// `today+1 .. today+range_days`, ignoring the `date` parameter.
    Rolling,
    /// First to last day of the current month.
    Month,
}

/// Which 1X2 / goals table the prediction engine uses.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Deterministic bucket percentages.
    Fixed,
    /// Bucket base plus random spread.
    Jittered,
}

/// Football fixtures with heuristic predictions
#[derive(Parser, Debug, Clone)]
#[command(name = "fixture-forecast", version, about)]
pub struct Config {
    /// football-data.org API token (required for every data endpoint)
    #[arg(long, env = "FOOTBALL_DATA_KEY")]
    pub football_data_key: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Listen host
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// football-data.org v4 base URL
    #[arg(
        long,
        env = "FOOTBALL_DATA_URL",
        default_value = "https://api.football-data.org/v4"
    )]
    pub football_data_url: String,

    /// Upstream calls allowed per rate window
    #[arg(long, env = "REQUEST_LIMIT", default_value = "5")]
    pub request_limit: u32,

    /// Length of the rate window in seconds
    #[arg(long, env = "RATE_WINDOW_SECS", default_value = "60")]
    pub rate_window_secs: u64,

    /// Minimum spacing between consecutive upstream calls in milliseconds
    #[arg(long, env = "CALL_SPACING_MS", default_value = "3000")]
    pub call_spacing_ms: u64,

    /// Upstream HTTP timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "20")]
    pub upstream_timeout_secs: u64,

    /// Fixture window selection
    #[arg(long, env = "FETCH_MODE", value_enum, default_value = "day")]
    pub fetch_mode: FetchMode,

    /// Days covered by the rolling window
    #[arg(long, env = "RANGE_DAYS", default_value = "31")]
    pub range_days: u32,

    /// Longest date span accepted by one upstream query
    #[arg(long, env = "CHUNK_DAYS", default_value = "10")]
    pub chunk_days: u32,

    /// Keep only the first N fixtures before scoring
    #[arg(long, env = "MAX_MATCHES")]
    pub max_matches: Option<usize>,

    /// Standings cache time-to-live in seconds
    #[arg(long, env = "STANDINGS_TTL_SECS", default_value = "3600")]
    pub standings_ttl_secs: u64,

    /// Resolve unknown teams from live standings
    #[arg(long, env = "USE_STANDINGS", default_value = "true", action = clap::ArgAction::Set)]
    pub use_standings: bool,

    /// Prediction table variant
    #[arg(long, env = "MODEL_VARIANT", value_enum, default_value = "fixed")]
    pub model_variant: ModelVariant,

    /// Seed for the prediction random source (unset = fresh entropy per request)
    #[arg(long, env = "PREDICTION_SEED")]
    pub prediction_seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_limit == 0 {
            anyhow::bail!("request_limit must be at least 1");
        }
        if self.rate_window_secs == 0 {
            anyhow::bail!("rate_window_secs must be positive");
        }
        if !(1..=10).contains(&self.chunk_days) {
            anyhow::bail!("chunk_days must be between 1 and 10 (upstream window limit)");
        }
        if self.range_days == 0 {
            anyhow::bail!("range_days must be positive");
        }
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("upstream_timeout_secs must be positive");
        }
        if self.max_matches == Some(0) {
            anyhow::bail!("max_matches must be positive when set");
        }
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.football_data_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn call_spacing(&self) -> Duration {
        Duration::from_millis(self.call_spacing_ms)
    }

    pub fn standings_ttl(&self) -> Duration {
        Duration::from_secs(self.standings_ttl_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
