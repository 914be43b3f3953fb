use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::names::{first_token_match, same_team};
use super::standings::team_strength;
use crate::football_data::models::{Standings, StandingsRow};
use crate::football_data::{FootballData, RequestBudget, StandingsCache};

/// Strength/form ratings of one team on a 1–10 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    pub strength: f64,
    pub form: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<f64>,
    /// Multiplier applied to the home side's rating; the model uses 1.15 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_advantage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_goals_for: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_goals_against: Option<f64>,
    #[serde(skip)]
    pub source: ProfileSource,
}

impl TeamProfile {
    /// Attack rating, falling back to overall strength.
    pub fn attack_or_strength(&self) -> f64 {
        self.attack.unwrap_or(self.strength)
    }

    /// Goals scored and conceded per game, when known.
    pub fn goal_rates(&self) -> Option<(f64, f64)> {
        Some((self.avg_goals_for?, self.avg_goals_against?))
    }
}

/// Where a profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileSource {
    Table,
    Fuzzy,
    Standings,
    #[default]
    Synthetic,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ── Static strength table ────────────────────────────────────────────────────

struct TableEntry {
    name: &'static str,
    strength: f64,
    form: f64,
    attack: f64,
    defense: f64,
}

const fn entry(name: &'static str, strength: f64, form: f64, attack: f64, defense: f64) -> TableEntry {
    TableEntry {
        name,
        strength,
        form,
        attack,
        defense,
    }
}

/// Hand-maintained ratings.  Order matters: fuzzy matches take the first hit.
const TEAM_TABLE: &[TableEntry] = &[
    // Premier League
    entry("Manchester City", 9.5, 9.0, 8.8, 8.5),
    entry("Arsenal", 8.5, 8.2, 8.0, 7.8),
    entry("Liverpool", 9.0, 8.5, 8.7, 8.0),
    entry("Chelsea", 7.8, 7.0, 7.5, 7.2),
    entry("Manchester United", 7.5, 6.8, 7.0, 7.0),
    entry("Tottenham", 7.2, 7.0, 7.5, 6.5),
    entry("Newcastle United", 7.0, 7.5, 6.8, 7.2),
    entry("Aston Villa", 6.8, 7.0, 6.5, 6.8),
    entry("West Ham United", 6.2, 6.0, 6.0, 6.2),
    entry("Brighton & Hove Albion", 6.5, 6.8, 6.2, 6.5),
    // La Liga
    entry("Real Madrid", 9.8, 9.5, 9.2, 8.5),
    entry("FC Barcelona", 8.8, 8.0, 8.5, 7.8),
    entry("Atlético Madrid", 8.0, 7.5, 7.0, 8.5),
    entry("Real Sociedad", 7.0, 7.2, 6.8, 7.0),
    entry("Real Betis", 6.8, 6.5, 6.5, 6.8),
    entry("Villarreal", 7.2, 7.0, 7.0, 7.0),
    entry("Athletic Bilbao", 6.9, 7.1, 6.6, 7.2),
    // Serie A
    entry("Juventus", 8.0, 7.5, 7.2, 8.2),
    entry("AC Milan", 8.2, 8.0, 7.8, 7.5),
    entry("Inter Milan", 8.5, 8.2, 8.0, 8.0),
    entry("SSC Napoli", 8.0, 7.2, 7.5, 7.8),
    entry("AS Roma", 7.2, 6.8, 6.8, 7.0),
    entry("SS Lazio", 7.0, 7.0, 7.2, 6.8),
    entry("Atalanta", 7.5, 7.8, 8.2, 6.8),
    entry("ACF Fiorentina", 6.7, 6.9, 6.5, 6.9),
    entry("Torino FC", 6.3, 6.5, 6.0, 6.6),
    entry("Bologna FC", 6.5, 6.8, 6.3, 6.7),
    // Bundesliga
    entry("FC Bayern München", 9.2, 8.8, 9.0, 8.0),
    entry("Borussia Dortmund", 8.0, 7.5, 8.2, 7.0),
    entry("RB Leipzig", 7.5, 7.8, 7.2, 7.8),
    entry("Bayer Leverkusen", 7.8, 8.5, 8.0, 7.2),
    entry("Eintracht Frankfurt", 6.8, 7.0, 7.0, 6.6),
    // Ligue 1
    entry("Paris Saint-Germain", 9.0, 8.5, 9.2, 7.5),
    entry("AS Monaco", 7.0, 7.2, 7.5, 6.8),
    entry("Olympique de Marseille", 6.8, 6.5, 6.5, 6.8),
    entry("Olympique Lyonnais", 6.5, 6.3, 6.2, 6.8),
    // Leagues running through the European summer
    entry("Flamengo", 7.8, 8.2, 8.0, 7.5),
    entry("Palmeiras", 7.5, 7.8, 7.2, 7.8),
    entry("São Paulo", 7.2, 7.0, 6.8, 7.4),
    entry("FC Porto", 7.6, 7.5, 7.3, 7.8),
    entry("Sporting CP", 7.4, 7.2, 7.0, 7.5),
    entry("SL Benfica", 7.8, 7.6, 7.5, 7.3),
    entry("LA Galaxy", 6.5, 6.8, 6.7, 6.3),
    entry("Inter Miami", 6.8, 7.2, 7.0, 6.6),
];

fn profile_from_entry(e: &TableEntry, source: ProfileSource) -> TeamProfile {
    TeamProfile {
        strength: e.strength,
        form: e.form,
        attack: Some(e.attack),
        defense: Some(e.defense),
        home_advantage: None,
        avg_goals_for: None,
        avg_goals_against: None,
        source,
    }
}

/// Look a team up in the static table: exact name, then normalized name, then
/// first-token containment (first hit in table order).
pub fn lookup_table(name: &str) -> Option<TeamProfile> {
    if let Some(e) = TEAM_TABLE.iter().find(|e| e.name == name) {
        return Some(profile_from_entry(e, ProfileSource::Table));
    }
    if let Some(e) = TEAM_TABLE.iter().find(|e| same_team(name, e.name)) {
        debug!("Normalized match: {} -> {}", name, e.name);
        return Some(profile_from_entry(e, ProfileSource::Fuzzy));
    }
    let e = TEAM_TABLE.iter().find(|e| first_token_match(name, e.name))?;
    debug!("Similar team: {} -> {}", name, e.name);
    Some(profile_from_entry(e, ProfileSource::Fuzzy))
}

/// Find `name` in the standings and convert its row.  League size is the size
/// of the table the row belongs to.
pub fn profile_from_standings(name: &str, standings: &Standings) -> Option<TeamProfile> {
    let exact = standings.tables.iter().find_map(|table| {
        table
            .iter()
            .find(|r| row_names(r).into_iter().flatten().any(|n| same_team(name, n)))
            .map(|r| (r, table.len()))
    });
    let found = exact.or_else(|| {
        standings.tables.iter().find_map(|table| {
            table
                .iter()
                .find(|r| {
                    row_names(r)
                        .into_iter()
                        .flatten()
                        .any(|n| first_token_match(name, n))
                })
                .map(|r| (r, table.len()))
        })
    });

    found.map(|(row, league_size)| team_strength(row, league_size))
}

fn row_names(row: &StandingsRow) -> [Option<&str>; 3] {
    let team = &row.team;
    [
        Some(team.name.as_str()),
        team.short_name.as_deref(),
        team.tla.as_deref(),
    ]
}

/// Random profile for a team we know nothing about: every rating drawn
/// uniformly from [5.0, 9.0], rounded to one decimal.
pub fn synthetic_profile<R: Rng>(rng: &mut R) -> TeamProfile {
    let mut draw = || round_to(rng.gen_range(5.0..=9.0), 1);
    TeamProfile {
        strength: draw(),
        form: draw(),
        attack: Some(draw()),
        defense: Some(draw()),
        home_advantage: None,
        avg_goals_for: None,
        avg_goals_against: None,
        source: ProfileSource::Synthetic,
    }
}

// ── Resolver ─────────────────────────────────────────────────────────────────

/// Resolves team names to profiles: table, then live standings, then a
/// synthetic profile.
#[derive(Clone)]
pub struct ProfileResolver {
    standings: Option<StandingsLookup>,
}

#[derive(Clone)]
struct StandingsLookup {
    source: Arc<dyn FootballData>,
    cache: StandingsCache,
    budget: RequestBudget,
}

impl ProfileResolver {
    /// Resolver that never calls upstream.
    pub fn table_only() -> Self {
        ProfileResolver { standings: None }
    }

    pub fn with_standings(
        source: Arc<dyn FootballData>,
        cache: StandingsCache,
        budget: RequestBudget,
    ) -> Self {
        ProfileResolver {
            standings: Some(StandingsLookup {
                source,
                cache,
                budget,
            }),
        }
    }

    pub async fn resolve<R: Rng + Send>(
        &self,
        name: &str,
        competition_id: Option<u64>,
        rng: &mut R,
    ) -> TeamProfile {
        if let Some(profile) = lookup_table(name) {
            return profile;
        }

        if let (Some(lookup), Some(id)) = (&self.standings, competition_id) {
            let standings = lookup
                .cache
                .get_or_fetch(id, lookup.source.as_ref(), &lookup.budget)
                .await;
            if let Some(profile) = standings.and_then(|s| profile_from_standings(name, &s)) {
                debug!(
                    "Standings profile for {}: strength {} form {}",
                    name, profile.strength, profile.form
                );
                return profile;
            }
        }

        let profile = synthetic_profile(rng);
        info!(
            "Generated random profile for {}: strength {} form {}",
            name, profile.strength, profile.form
        );
        profile
    }
}
