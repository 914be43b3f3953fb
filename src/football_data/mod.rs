pub mod client;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod standings_cache;

#[cfg(test)]
pub mod testing;

pub use client::FootballDataClient;
pub use provider::{FootballData, UpstreamError};
pub use rate_limit::RequestBudget;
pub use standings_cache::StandingsCache;

/// Competitions covered by the football-data.org free tier, by display name.
pub const SUPPORTED_COMPETITIONS: &[(&str, u64)] = &[
    ("Serie A", 2019),
    ("Premier League", 2021),
    ("La Liga", 2014),
    ("Bundesliga", 2002),
    ("Ligue 1", 2015),
    ("Champions League", 2001),
    ("Europa League", 2018),
    ("Primeira Liga", 2017),
    ("Eredivisie", 2003),
    ("Championship", 2016),
    ("Copa Libertadores", 2152),
    ("Brasileirao", 2013),
];
