pub mod window;

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::FetchMode;
use crate::football_data::models::Fixture;
use crate::football_data::{FootballData, RequestBudget};

/// Why a window produced no fixtures without an upstream answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skipped {
    Budget,
    Upstream,
}

/// Decides which date windows to query and funnels every call through the
/// request budget.
#[derive(Clone)]
pub struct FixtureService {
    source: Arc<dyn FootballData>,
    budget: RequestBudget,
    mode: FetchMode,
    range_days: u32,
    chunk_days: u32,
    max_matches: Option<usize>,
}

impl FixtureService {
    pub fn new(source: Arc<dyn FootballData>, budget: RequestBudget, mode: FetchMode) -> Self {
        FixtureService {
            source,
            budget,
            mode,
            range_days: 31,
            chunk_days: 10,
            max_matches: None,
        }
    }

    pub fn with_range(mut self, range_days: u32, chunk_days: u32) -> Self {
        self.range_days = range_days;
        self.chunk_days = chunk_days;
        self
    }

    pub fn with_max_matches(mut self, max_matches: Option<usize>) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Fixtures for the request.  `requested` is the raw `date` query value
    /// (day mode only); `today` anchors defaults and range windows.
    ///
    /// Failures never surface here: they are logged and yield no fixtures.
    pub async fn fetch(&self, requested: Option<&str>, today: NaiveDate) -> Vec<Fixture> {
        let mut fixtures = match self.mode {
            FetchMode::Day => {
                let day = match requested {
                    Some(raw) => match window::parse_date(raw) {
                        Some(day) => day,
                        None => {
                            error!("Invalid date {:?}, expected YYYY-MM-DD", raw);
                            return Vec::new();
                        }
                    },
                    None => today,
                };
                self.fetch_day(day, requested.is_some()).await
            }
            FetchMode::Rolling => {
                let (from, to) = window::rolling_window(today, self.range_days);
                self.fetch_range(from, to).await
            }
            FetchMode::Month => {
                let (from, to) = window::month_window(today);
                self.fetch_range(from, to).await
            }
        };

        if let Some(max) = self.max_matches {
            if fixtures.len() > max {
                info!("Keeping first {} of {} fixtures", max, fixtures.len());
                fixtures.truncate(max);
            }
        }
        log_competitions(&fixtures);
        fixtures
    }

    async fn fetch_day(&self, day: NaiveDate, explicit: bool) -> Vec<Fixture> {
        match self.call(day, day).await {
            Ok(found) if !found.is_empty() => return found,
            Ok(_) => {}
            Err(_) => return Vec::new(),
        }

        info!("No fixtures on {}, widening to 7 days", day);
        if let Ok(week) = self.call(day, day + Duration::days(7)).await {
            if !week.is_empty() {
                let key = day.format("%Y-%m-%d").to_string();
                let on_day: Vec<Fixture> = week
                    .into_iter()
                    .filter(|f| f.match_day() == Some(key.as_str()))
                    .collect();
                debug!("{} fixture(s) of the week fall on {}", on_day.len(), day);
                return on_day;
            }
        }

        if explicit {
            return Vec::new();
        }
        let tomorrow = day + Duration::days(1);
        info!("Still nothing, trying {}", tomorrow);
        self.call(tomorrow, tomorrow).await.unwrap_or_default()
    }

    async fn fetch_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<Fixture> {
        let chunks = window::chunk_range(from, to, self.chunk_days);
        info!(
            "Fetching fixtures {} .. {} in {} chunk(s)",
            from,
            to,
            chunks.len()
        );

        let mut all = Vec::new();
        for (chunk_from, chunk_to) in chunks {
            match self.call(chunk_from, chunk_to).await {
                Ok(found) => all.extend(found),
                Err(Skipped::Upstream) => continue,
                Err(Skipped::Budget) => {
                    warn!("Stopping range fetch at {}: request budget spent", chunk_from);
                    break;
                }
            }
        }
        all
    }

    /// One budgeted upstream call.
    async fn call(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Fixture>, Skipped> {
        let purpose = format!("matches {}..{}", from, to);
        if !self.budget.acquire(&purpose).await {
            return Err(Skipped::Budget);
        }
        match self.source.matches(from, to).await {
            Ok(found) => {
                debug!("{} returned {} fixture(s) for {}", self.source.name(), found.len(), purpose);
                Ok(found)
            }
            Err(e) => {
                match e.hint() {
                    Some(hint) => error!("Fetching {} failed: {} ({})", purpose, e, hint),
                    None => error!("Fetching {} failed: {}", purpose, e),
                }
                Err(Skipped::Upstream)
            }
        }
    }
}

fn log_competitions(fixtures: &[Fixture]) {
    if fixtures.is_empty() {
        return;
    }
    let mut per_competition: BTreeMap<&str, usize> = BTreeMap::new();
    for f in fixtures {
        *per_competition.entry(f.competition_name()).or_default() += 1;
    }
    for (name, count) in per_competition {
        debug!("  {}: {} fixture(s)", name, count);
    }
}
