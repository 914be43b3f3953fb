//! League-table → team-strength conversion.
//!
//! A team's table position maps linearly onto a 1–10 strength scale (1st →
//! 10, last → 1), nudged by goal difference.  Points per game gives the form
//! rating and goals per game the attack/defense ratings.
//!
//! ```text
//! positionStrength = max(1, 10 - ((position-1)/(L-1)) * 9)
//! formStrength     = clamp(pointsPerGame * 3.33, 1, 10)
//! goalDiffBonus    = clamp(goalDifference / 10, -2, 2)
//! strength         = clamp(positionStrength + goalDiffBonus, 1, 10)
//! homeAdvantage    = 1.0 + positionStrength / 50
//! ```

use super::profile::{round_to, ProfileSource, TeamProfile};
use crate::football_data::models::StandingsRow;

/// League size assumed when the table size is unknown.
pub const DEFAULT_LEAGUE_SIZE: usize = 20;

/// Goals per game assumed for a team without games.
const NEUTRAL_GOALS_PER_GAME: f64 = 1.5;

/// Position-only strength on the 1–10 scale.
pub fn position_strength(position: u32, league_size: usize) -> f64 {
    if league_size < 2 {
        return 5.0;
    }
    let span = (league_size - 1) as f64;
    let pos = position.max(1) as f64;
    (10.0 - ((pos - 1.0) / span) * 9.0).max(1.0)
}

/// Profile of a team without any games played (or without a usable table).
pub fn neutral_profile() -> TeamProfile {
    TeamProfile {
        strength: 5.0,
        form: 5.0,
        attack: Some(5.0),
        defense: Some(5.0),
        home_advantage: Some(1.0),
        avg_goals_for: Some(NEUTRAL_GOALS_PER_GAME),
        avg_goals_against: Some(NEUTRAL_GOALS_PER_GAME),
        source: ProfileSource::Standings,
    }
}

/// Derive a team profile from its standings row.
pub fn team_strength(row: &StandingsRow, league_size: usize) -> TeamProfile {
    let games = row.games_played();
    if games == 0 || league_size < 2 {
        return neutral_profile();
    }
    let games = games as f64;

    let pos_strength = position_strength(row.position, league_size);
    let points_per_game = row.points as f64 / games;
    let form = (points_per_game * 3.33).clamp(1.0, 10.0);
    let goal_diff_bonus = (row.goal_difference as f64 / 10.0).clamp(-2.0, 2.0);
    let strength = (pos_strength + goal_diff_bonus).clamp(1.0, 10.0);
    let home_advantage = 1.0 + pos_strength / 50.0;

    let avg_for = row.goals_for as f64 / games;
    let avg_against = row.goals_against as f64 / games;

    TeamProfile {
        strength: round_to(strength, 1),
        form: round_to(form, 1),
        attack: Some(round_to((avg_for * 4.0).clamp(1.0, 10.0), 1)),
        defense: Some(round_to((10.0 - avg_against * 4.0).clamp(1.0, 10.0), 1)),
        home_advantage: Some(round_to(home_advantage, 2)),
        avg_goals_for: Some(round_to(avg_for, 2)),
        avg_goals_against: Some(round_to(avg_against, 2)),
        source: ProfileSource::Standings,
    }
}
