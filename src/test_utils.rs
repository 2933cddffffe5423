//! Shared test fixtures for `GoalBuddy`.
//!
//! Provides a canned goal record, a recording [`GoalApi`] double with
//! scriptable outcomes, and a store wrapper that counts writes, so editor
//! tests can assert on the exact store/backend traffic.

use crate::api::GoalApi;
use crate::errors::{Error, Result};
use crate::models::Goal;
use crate::store::{GoalStore, SharedGoalStore};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A goal record with stable, recognizable values.
pub fn sample_goal(id: i64) -> Goal {
    Goal {
        id,
        name: format!("Goal {id}"),
        icon: Some("🎯".to_string()),
        target_date: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
        target_amount: 2500.0,
        balance: 400.0,
        created: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    }
}

/// How a [`RecordingApi`] answers `update_goal` calls.
#[derive(Debug, Clone, Copy)]
pub enum ApiMode {
    /// Resolve to `Ok(true)`.
    Accept,
    /// Resolve to `Ok(false)`.
    Reject,
    /// Resolve to `Err(..)`, simulating transport failure.
    Fail,
}

/// [`GoalApi`] double that records every call and signals each delivery on
/// an unbounded channel, so fire-and-forget pushes can be awaited
/// deterministically from tests.
pub struct RecordingApi {
    mode: ApiMode,
    calls: Mutex<Vec<(i64, Goal)>>,
    tx: UnboundedSender<(i64, Goal)>,
}

impl RecordingApi {
    pub fn new(mode: ApiMode) -> (Arc<Self>, UnboundedReceiver<(i64, Goal)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                mode,
                calls: Mutex::new(Vec::new()),
                tx,
            }),
            rx,
        )
    }

    pub fn calls(&self) -> Vec<(i64, Goal)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GoalApi for RecordingApi {
    async fn update_goal(&self, id: i64, goal: Goal) -> Result<bool> {
        self.calls.lock().unwrap().push((id, goal.clone()));
        let _ = self.tx.send((id, goal));
        match self.mode {
            ApiMode::Accept => Ok(true),
            ApiMode::Reject => Ok(false),
            ApiMode::Fail => Err(Error::Database("simulated backend outage".to_string())),
        }
    }
}

/// [`GoalStore`] wrapper that counts `set` calls.
pub struct CountingStore {
    inner: Arc<SharedGoalStore>,
    sets: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<SharedGoalStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            sets: AtomicUsize::new(0),
        })
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl GoalStore for CountingStore {
    fn get(&self, id: i64) -> Option<Goal> {
        self.inner.get(id)
    }

    fn set(&self, goal: Goal) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(goal);
    }
}
