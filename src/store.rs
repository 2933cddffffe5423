//! Shared client-side goal store.
//!
//! The store owns the canonical in-memory copy of every goal record. The
//! editor never owns a record itself: it reads the live record through
//! [`GoalStore::get`] and writes fully-merged snapshots back through
//! [`GoalStore::set`]. The capability is a trait so tests can substitute a
//! fake or instrumented store.

use crate::db::{DbPool, get_all_goals};
use crate::errors::Result;
use crate::models::Goal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, trace};

/// Read/write access to the shared goal map.
///
/// Both operations are synchronous: a `set` must be visible to the next
/// `get` as soon as the call returns.
pub trait GoalStore: Send + Sync {
    /// Returns a clone of the current record for `id`, if present.
    fn get(&self, id: i64) -> Option<Goal>;
    /// Replaces the stored entry for `goal.id` with `goal`.
    fn set(&self, goal: Goal);
}

/// In-process implementation of [`GoalStore`] over a locked map.
#[derive(Debug, Default)]
pub struct SharedGoalStore {
    goals: RwLock<HashMap<i64, Goal>>,
}

impl SharedGoalStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All stored goals, ordered by id. Used by the shell's listing.
    pub fn all(&self) -> Vec<Goal> {
        let guard = self.goals.read().unwrap_or_else(|e| e.into_inner());
        let mut goals: Vec<Goal> = guard.values().cloned().collect();
        goals.sort_by_key(|g| g.id);
        goals
    }
}

impl GoalStore for SharedGoalStore {
    fn get(&self, id: i64) -> Option<Goal> {
        let guard = self.goals.read().unwrap_or_else(|e| e.into_inner());
        guard.get(&id).cloned()
    }

    fn set(&self, goal: Goal) {
        trace!("Store set for goal id {}: {:?}", goal.id, goal);
        let mut guard = self.goals.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(goal.id, goal);
    }
}

/// Fills the store from the goals database.
pub async fn refresh_goal_store(pool: &DbPool, store: &SharedGoalStore) -> Result<()> {
    info!("Refreshing goal store from database...");
    let goals = get_all_goals(pool).await?;
    let count = goals.len();
    {
        let mut guard = store.goals.write().unwrap_or_else(|e| e.into_inner());
        guard.clear();
        for goal in goals {
            guard.insert(goal.id, goal);
        }
    }
    info!("Goal store refreshed with {} record(s).", count);
    Ok(())
}
