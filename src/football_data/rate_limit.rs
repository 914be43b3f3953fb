//! Upstream request budget.
//!
//! football-data.org's free tier allows a handful of calls per minute, and a
//! 429 costs more than a skipped call.  Every upstream call therefore takes a
//! permit from a fixed-window token bucket first: `limit` permits per
//! `window`, refilled in full when the window rolls over.  Consecutive permits
//! are also spaced by at least `spacing`, so chunked range fetches trickle out
//! instead of bursting.
//!
//! The bucket rolls over lazily on `acquire`, and `spawn_reset_task` adds the
//! timer-driven reset the `/api/status` endpoint reports against.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Shared, clonable handle to the request budget.
#[derive(Clone)]
pub struct RequestBudget {
    inner: Arc<Mutex<BudgetWindow>>,
    limit: u32,
    window: Duration,
    spacing: Duration,
}

struct BudgetWindow {
    used: u32,
    started: Instant,
    started_at: DateTime<Utc>,
    /// Slot handed to the most recent permit (may lie in the future).
    last_slot: Option<Instant>,
}

impl BudgetWindow {
    fn fresh() -> Self {
        BudgetWindow {
            used: 0,
            started: Instant::now(),
            started_at: Utc::now(),
            last_slot: None,
        }
    }

    fn roll_if_expired(&mut self, window: Duration) {
        if self.started.elapsed() >= window {
            let last_slot = self.last_slot;
            *self = BudgetWindow::fresh();
            self.last_slot = last_slot;
        }
    }
}

/// Point-in-time view of the budget, as reported by `/api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSnapshot {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub resets_at: DateTime<Utc>,
}

impl RequestBudget {
    pub fn new(limit: u32, window: Duration, spacing: Duration) -> Self {
        RequestBudget {
            inner: Arc::new(Mutex::new(BudgetWindow::fresh())),
            limit,
            window,
            spacing,
        }
    }

    /// Take one permit for an upstream call.
    ///
    /// Returns `false` without waiting when the window's permits are spent.
    /// Otherwise waits out the call spacing and returns `true`.
    pub async fn acquire(&self, purpose: &str) -> bool {
        let slot = {
            let mut w = self.inner.lock().await;
            w.roll_if_expired(self.window);

            if w.used >= self.limit {
                warn!(
                    "Request budget exhausted ({}/{}), skipping {}",
                    w.used, self.limit, purpose
                );
                return false;
            }
            w.used += 1;

            let now = Instant::now();
            let slot = match w.last_slot {
                Some(prev) => (prev + self.spacing).max(now),
                None => now,
            };
            w.last_slot = Some(slot);
            debug!(
                "Upstream call #{}/{} for {}",
                w.used, self.limit, purpose
            );
            slot
        };

        tokio::time::sleep_until(slot).await;
        true
    }

    /// Refill the bucket and start a new window.
    pub async fn reset(&self) -> u32 {
        let mut w = self.inner.lock().await;
        let previous = w.used;
        let last_slot = w.last_slot;
        *w = BudgetWindow::fresh();
        w.last_slot = last_slot;
        previous
    }

    pub async fn snapshot(&self) -> BudgetSnapshot {
        let mut w = self.inner.lock().await;
        w.roll_if_expired(self.window);
        let window = chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::zero());
        BudgetSnapshot {
            used: w.used,
            limit: self.limit,
            remaining: self.limit.saturating_sub(w.used),
            resets_at: w.started_at + window,
        }
    }

    /// Background task that resets the budget every window.
    pub fn spawn_reset_task(&self) -> JoinHandle<()> {
        let budget = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(budget.window);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let previous = budget.reset().await;
                info!("Request budget reset (previous window used {})", previous);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn permits_run_out_at_limit() {
        let budget = RequestBudget::new(3, Duration::from_secs(60), Duration::ZERO);
        assert!(budget.acquire("a").await);
        assert!(budget.acquire("b").await);
        assert!(budget.acquire("c").await);
        assert!(!budget.acquire("d").await);

        let snap = budget.snapshot().await;
        assert_eq!(snap.used, 3);
        assert_eq!(snap.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn window_rollover_refills_bucket() {
        let budget = RequestBudget::new(1, Duration::from_secs(60), Duration::ZERO);
        assert!(budget.acquire("first").await);
        assert!(!budget.acquire("second").await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(budget.acquire("after rollover").await);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_reset_returns_previous_usage() {
        let budget = RequestBudget::new(2, Duration::from_secs(60), Duration::ZERO);
        budget.acquire("a").await;
        budget.acquire("b").await;
        assert_eq!(budget.reset().await, 2);
        assert_eq!(budget.snapshot().await.remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_permits_are_spaced() {
        let budget = RequestBudget::new(5, Duration::from_secs(60), Duration::from_secs(3));
        let start = Instant::now();
        budget.acquire("a").await;
        assert!(start.elapsed() < Duration::from_millis(1));
        budget.acquire("b").await;
        budget.acquire("c").await;
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_task_refills_on_the_timer() {
        let budget = RequestBudget::new(2, Duration::from_secs(60), Duration::ZERO);
        let task = budget.spawn_reset_task();
        // Let the task start its interval before time moves.
        tokio::task::yield_now().await;

        assert!(budget.acquire("a").await);
        assert!(budget.acquire("b").await);

        tokio::time::advance(Duration::from_secs(61)).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        // Read the window directly: `snapshot` would also roll it lazily.
        assert_eq!(budget.inner.lock().await.used, 0);
        assert_eq!(budget.snapshot().await.remaining, 2);
        task.abort();
    }
}
