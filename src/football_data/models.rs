use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A scheduled match as returned by `GET /v4/matches`.
///
/// Only the fields the service reads are typed; everything else the upstream
/// sends is kept in `extra` so the response echoes the upstream record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date: Option<String>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<CompetitionRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fixture {
    /// Calendar day (`YYYY-MM-DD`) of the kick-off, taken from `utcDate`.
    pub fn match_day(&self) -> Option<&str> {
        self.utc_date.as_deref().and_then(|d| d.get(..10))
    }

    pub fn competition_id(&self) -> Option<u64> {
        self.competition.as_ref().and_then(|c| c.id)
    }

    pub fn competition_name(&self) -> &str {
        self.competition
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Team reference embedded in a fixture. Knock-out ties not yet drawn carry
/// a null name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tla: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamRef {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or("TBD")
    }

    /// Whether the team has been decided (knock-out slots may still be open).
    pub fn is_known(&self) -> bool {
        self.name.is_some() || self.short_name.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<Fixture>,
}

// ── Standings ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct StandingsResponse {
    #[serde(default)]
    pub standings: Vec<StandingsGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StandingsGroup {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub table: Vec<StandingsRow>,
}

/// One line of a league table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandingsRow {
    pub position: u32,
    pub team: StandingsTeam,
    pub played_games: Option<u32>,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
}

impl StandingsRow {
    pub fn games_played(&self) -> u32 {
        match self.played_games {
            Some(n) if n > 0 => n,
            _ => self.won + self.draw + self.lost,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandingsTeam {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub short_name: Option<String>,
    pub tla: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// League tables of one competition. Group-stage competitions carry one table
/// per group; leagues carry a single table.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    pub tables: Vec<Vec<StandingsRow>>,
}

impl Standings {
    pub(crate) fn from_response(resp: StandingsResponse) -> Self {
        let has_total = resp
            .standings
            .iter()
            .any(|g| g.kind.as_deref() == Some("TOTAL"));
        let tables = resp
            .standings
            .into_iter()
            .filter(|g| !has_total || g.kind.as_deref() == Some("TOTAL"))
            .map(|g| g.table)
            .filter(|t| !t.is_empty())
            .collect();
        Standings { tables }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}

// ── Competitions ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct CompetitionsResponse {
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub current_season: Option<Season>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current_matchday: Option<u32>,
}
