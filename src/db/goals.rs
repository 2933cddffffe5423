use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::Goal;
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

const GOAL_COLUMNS: &str = "id, name, icon, target_date, target_amount, balance, created";

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        target_date: row.get(3)?,
        target_amount: row.get(4)?,
        balance: row.get(5)?,
        created: row.get(6)?,
    })
}

/// Fetches a single goal by id.
///
/// Returns `Ok(None)` if no goal with that id exists.
#[instrument(skip(pool))]
pub async fn get_goal_by_id(pool: &DbPool, id: i64) -> Result<Option<Goal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS))?;
    let goal = stmt.query_row(params![id], goal_from_row).optional()?;
    trace!("Goal lookup for id {}: {:?}", id, goal);
    Ok(goal)
}

/// Fetches all goals, ordered by creation.
#[instrument(skip(pool))]
pub async fn get_all_goals(pool: &DbPool) -> Result<Vec<Goal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM goals ORDER BY created, id",
        GOAL_COLUMNS
    ))?;
    let goals = stmt
        .query_map([], goal_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!("Fetched {} goal(s) from database.", goals.len());
    Ok(goals)
}

/// Inserts a new goal and returns its id.
///
/// `balance` starts at the given value (0 for seeded goals) and `created` is
/// stamped here rather than left to the column default, so the stored format
/// round-trips through chrono.
#[instrument(skip(pool))]
pub async fn insert_goal(
    pool: &DbPool,
    name: &str,
    icon: Option<&str>,
    target_date: chrono::NaiveDate,
    target_amount: f64,
    balance: f64,
) -> Result<i64> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO goals (name, icon, target_date, target_amount, balance, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let id = stmt.insert(params![
        name,
        icon,
        target_date,
        target_amount,
        balance,
        Utc::now()
    ])?;
    info!("Inserted goal '{}' with id {}.", name, id);
    Ok(id)
}

/// Persists the editable fields of a goal record.
///
/// This is the backend half of the editor's `update_goal(id, record)` call:
/// name, icon, target date and target amount are written, while `balance`
/// and `created` are deliberately left alone; the editor only displays
/// them. Returns `Ok(true)` if a row was updated, `Ok(false)` if no goal
/// with that id exists.
#[instrument(skip(pool, goal))]
pub async fn update_goal(pool: &DbPool, id: i64, goal: &Goal) -> Result<bool> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;
    let rows_affected = conn.execute(
        "UPDATE goals SET name = ?1, icon = ?2, target_date = ?3, target_amount = ?4
         WHERE id = ?5",
        params![
            goal.name,
            goal.icon,
            goal.target_date,
            goal.target_amount,
            id
        ],
    )?;
    debug!("Updated goal id {}, rows affected: {}", id, rows_affected);
    Ok(rows_affected > 0)
}

/// Seeds goals from the TOML configuration.
///
/// Goals already present (matched by name) are skipped, so repeated startups
/// do not duplicate them.
#[instrument(skip(pool, config))]
pub async fn seed_initial_goals(pool: &DbPool, config: &Arc<AppConfig>) -> Result<()> {
    info!(
        "Starting to seed initial goals. Found {} configurations from TOML.",
        config.goals.len()
    );
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock for seeding".to_string()))?;

    for cfg_goal in &config.goals {
        let mut stmt_check =
            conn.prepare_cached("SELECT id FROM goals WHERE name = ?1")?;
        let existing: Option<i64> = stmt_check
            .query_row(params![cfg_goal.name], |row| row.get(0))
            .optional()?;

        if existing.is_some() {
            warn!("Goal '{}' already exists. Skipping.", cfg_goal.name);
            continue;
        }

        info!("Inserting NEW goal '{}'", cfg_goal.name);
        let mut stmt_insert = conn.prepare_cached(
            "INSERT INTO goals (name, icon, target_date, target_amount, balance, created)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        )?;
        stmt_insert.execute(params![
            cfg_goal.name,
            cfg_goal.icon,
            cfg_goal.target_date,
            cfg_goal.target_amount,
            Utc::now()
        ])?;
    }
    Ok(())
}
