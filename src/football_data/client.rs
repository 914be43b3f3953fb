use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::models::{
    Competition, CompetitionsResponse, Fixture, MatchesResponse, Standings, StandingsResponse,
};
use super::provider::{FootballData, UpstreamError};

const USER_AGENT: &str = concat!("fixture-forecast/", env!("CARGO_PKG_VERSION"));

/// Client for the football-data.org v4 REST API.
/// Docs: <https://www.football-data.org/documentation/api>
#[derive(Clone)]
pub struct FootballDataClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl FootballDataClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        // A trailing slash keeps `join` from dropping the `/v4` segment.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).context("Invalid football-data base URL")?;
        Ok(FootballDataClient {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header("X-Auth-Token", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FootballData for FootballDataClient {
    fn name(&self) -> &str {
        "football-data.org"
    }

    async fn matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Fixture>, UpstreamError> {
        let mut url = self.endpoint("matches")?;
        url.query_pairs_mut()
            .append_pair("dateFrom", &from.format("%Y-%m-%d").to_string())
            .append_pair("dateTo", &to.format("%Y-%m-%d").to_string());

        let resp: MatchesResponse = self.get_json(url).await?;
        info!(
            "{}: {} match(es) between {} and {}",
            self.name(),
            resp.matches.len(),
            from,
            to
        );
        Ok(resp.matches)
    }

    async fn standings(&self, competition_id: u64) -> Result<Standings, UpstreamError> {
        let url = self.endpoint(&format!("competitions/{}/standings", competition_id))?;
        let resp: StandingsResponse = self.get_json(url).await?;
        let standings = Standings::from_response(resp);
        info!(
            "{}: standings for competition {} ({} rows)",
            self.name(),
            competition_id,
            standings.row_count()
        );
        Ok(standings)
    }

    async fn competitions(&self) -> Result<Vec<Competition>, UpstreamError> {
        let url = self.endpoint("competitions")?;
        let resp: CompetitionsResponse = self.get_json(url).await?;
        info!("{}: {} competition(s) available", self.name(), resp.competitions.len());
        Ok(resp.competitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_version_segment() {
        let client = FootballDataClient::new(
            "https://api.football-data.org/v4",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.endpoint("competitions/2019/standings").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.football-data.org/v4/competitions/2019/standings"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let client =
            FootballDataClient::new("http://localhost:9000/v4/", "key", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.endpoint("matches").unwrap().as_str(),
            "http://localhost:9000/v4/matches"
        );
    }

    #[test]
    fn status_hint_for_rate_limit() {
        let err = UpstreamError::Status {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        assert_eq!(err.hint(), Some("rate limit exceeded upstream"));
    }
}
