//! Remote persistence API for goal records.
//!
//! The editor only ever calls `update_goal(id, record)` and looks at the
//! boolean it resolves to: `true` means the backend accepted the write,
//! `false` that it rejected it. Transport failures surface as `Err` and are
//! treated like a rejection by the Save path. The trait keeps the editor
//! independent of any concrete backend; [`SqliteGoalApi`] is the local
//! stand-in used by the binary.

use crate::db::{self, DbPool};
use crate::errors::Result;
use crate::models::Goal;
use async_trait::async_trait;

/// Asynchronous write access to the goal backend.
#[async_trait]
pub trait GoalApi: Send + Sync {
    /// Persists the editable fields of `goal` under `id`.
    ///
    /// Resolves to `true` on success, `false` if the backend rejected the
    /// update (e.g. the record no longer exists).
    async fn update_goal(&self, id: i64, goal: Goal) -> Result<bool>;
}

/// [`GoalApi`] backed by the local goals database.
#[derive(Clone)]
pub struct SqliteGoalApi {
    pool: DbPool,
}

impl SqliteGoalApi {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalApi for SqliteGoalApi {
    async fn update_goal(&self, id: i64, goal: Goal) -> Result<bool> {
        db::update_goal(&self.pool, id, &goal).await
    }
}
