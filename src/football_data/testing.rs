//! In-memory `FootballData` stub shared by unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::models::{Competition, Fixture, Standings};
use super::provider::{FootballData, UpstreamError};

#[derive(Default)]
pub struct StubSource {
    fixtures: Vec<Fixture>,
    standings: HashMap<u64, Standings>,
    competitions: Vec<Competition>,
    fail_matches: bool,
    match_calls: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    standings_calls: AtomicUsize,
    competitions_calls: AtomicUsize,
}

impl StubSource {
    pub fn with_fixtures(mut self, fixtures: Vec<Fixture>) -> Self {
        self.fixtures = fixtures;
        self
    }

    pub fn with_standings(mut self, competition_id: u64, standings: Standings) -> Self {
        self.standings.insert(competition_id, standings);
        self
    }

    pub fn with_competitions(mut self, competitions: Vec<Competition>) -> Self {
        self.competitions = competitions;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_matches = true;
        self
    }

    pub fn match_calls(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.match_calls.lock().unwrap().clone()
    }

    pub fn standings_calls(&self) -> usize {
        self.standings_calls.load(Ordering::SeqCst)
    }

    pub fn competitions_calls(&self) -> usize {
        self.competitions_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FootballData for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Fixture>, UpstreamError> {
        self.match_calls.lock().unwrap().push((from, to));
        if self.fail_matches {
            return Err(UpstreamError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "stub failure".into(),
            });
        }
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        Ok(self
            .fixtures
            .iter()
            .filter(|f| {
                f.match_day()
                    .is_some_and(|d| d >= from.as_str() && d <= to.as_str())
            })
            .cloned()
            .collect())
    }

    async fn standings(&self, competition_id: u64) -> Result<Standings, UpstreamError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        self.standings
            .get(&competition_id)
            .cloned()
            .ok_or(UpstreamError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: "unknown competition".into(),
            })
    }

    async fn competitions(&self) -> Result<Vec<Competition>, UpstreamError> {
        self.competitions_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.competitions.clone())
    }
}

/// Fixture with the given teams kicking off at noon UTC on `day`.
pub fn fixture(id: u64, day: &str, home: &str, away: &str, competition_id: u64) -> Fixture {
    serde_json::from_value(json!({
        "id": id,
        "utcDate": format!("{}T12:00:00Z", day),
        "status": "TIMED",
        "matchday": 27,
        "homeTeam": { "id": id * 10, "name": home },
        "awayTeam": { "id": id * 10 + 1, "name": away },
        "competition": { "id": competition_id, "name": "Test League" }
    }))
    .expect("stub fixture should deserialize")
}
