use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{Competition, Fixture, Standings};

/// Failure talking to the upstream sports-data API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

impl UpstreamError {
    /// Short hint for the common football-data.org status codes.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            UpstreamError::Status { status, .. } => match status.as_u16() {
                429 => Some("rate limit exceeded upstream"),
                403 => Some("API key rejected or competition not in plan"),
                404 => Some("endpoint or resource not found"),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Trait every fixture/standings source must implement.
#[async_trait]
pub trait FootballData: Send + Sync {
    /// Matches scheduled between `from` and `to` inclusive.
    async fn matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Fixture>, UpstreamError>;

    /// Current league tables of a competition.
    async fn standings(&self, competition_id: u64) -> Result<Standings, UpstreamError>;

    /// Competitions visible to the configured API key.
    async fn competitions(&self) -> Result<Vec<Competition>, UpstreamError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
