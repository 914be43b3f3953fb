//! In-memory standings cache keyed by competition id.
//!
//! League tables change at most a few times a day, while resolving one
//! unknown team costs an upstream call out of a five-per-minute budget.  Each
//! competition's tables are kept for a fixed TTL (one hour by default) and
//! served from memory until they expire.  Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::models::Standings;
use super::provider::FootballData;
use super::rate_limit::RequestBudget;

/// Thread-safe TTL cache of competition standings.
#[derive(Clone)]
pub struct StandingsCache {
    inner: Arc<RwLock<HashMap<u64, CacheEntry>>>,
    ttl: Duration,
}

struct CacheEntry {
    standings: Arc<Standings>,
    fetched_at: Instant,
}

impl StandingsCache {
    pub fn new(ttl: Duration) -> Self {
        StandingsCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Cached standings for `competition_id`, if present and younger than the TTL.
    pub async fn get(&self, competition_id: u64) -> Option<Arc<Standings>> {
        let inner = self.inner.read().await;
        inner
            .get(&competition_id)
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.standings))
    }

    pub async fn insert(&self, competition_id: u64, standings: Standings) -> Arc<Standings> {
        let standings = Arc::new(standings);
        let mut inner = self.inner.write().await;
        inner.insert(
            competition_id,
            CacheEntry {
                standings: Arc::clone(&standings),
                fetched_at: Instant::now(),
            },
        );
        standings
    }

    /// Return cached standings or fetch them through `source`.
    ///
    /// A fetch takes a permit from `budget`.  Any failure (exhausted budget,
    /// upstream error, empty table) is logged and yields `None`.
    pub async fn get_or_fetch(
        &self,
        competition_id: u64,
        source: &dyn FootballData,
        budget: &RequestBudget,
    ) -> Option<Arc<Standings>> {
        if let Some(hit) = self.get(competition_id).await {
            debug!("Standings cache hit for competition {}", competition_id);
            return Some(hit);
        }

        if !budget
            .acquire(&format!("standings of competition {}", competition_id))
            .await
        {
            return None;
        }

        match source.standings(competition_id).await {
            Ok(standings) if standings.is_empty() => {
                info!("Competition {} has no standings table", competition_id);
                None
            }
            Ok(standings) => Some(self.insert(competition_id, standings).await),
            Err(e) => {
                warn!(
                    "Standings fetch for competition {} failed: {}{}",
                    competition_id,
                    e,
                    e.hint().map(|h| format!(" ({})", h)).unwrap_or_default()
                );
                None
            }
        }
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|_, e| e.fetched_at.elapsed() < self.ttl);
        before - inner.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Background task that evicts expired tables once per TTL.
    pub fn spawn_purge_task(&self) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cache.ttl.max(Duration::from_secs(1)));
            interval.tick().await;
            loop {
                interval.tick().await;
                let dropped = cache.purge_expired().await;
                if dropped > 0 {
                    debug!(
                        "Evicted {} standings table(s), {} cached",
                        dropped,
                        cache.len().await
                    );
                }
            }
        })
    }
}
