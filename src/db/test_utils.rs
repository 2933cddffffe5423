#![allow(dead_code)]
use crate::db::{DbPool, schema};
use crate::errors::{Error, Result};
use crate::models::Goal;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rusqlite::{OptionalExtension, params};
use std::sync::Arc;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

// Helper to create an in-memory DbPool for testing.
pub(crate) async fn setup_test_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()
        .map_err(|e| Error::Database(format!("Test DB: Failed to open in-memory: {}", e)))?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) struct DirectInsertArgs<'a> {
    pub(crate) conn: &'a Connection,
    pub(crate) name: &'a str,
    pub(crate) icon: Option<&'a str>,
    pub(crate) target_date: NaiveDate,
    pub(crate) target_amount: f64,
    pub(crate) balance: f64,
}

// Quick insert for test setup, bypassing the seeding logic.
pub(crate) fn direct_insert_goal(args: &DirectInsertArgs<'_>) -> Result<i64> {
    let mut stmt = args.conn.prepare_cached(
        "INSERT INTO goals (name, icon, target_date, target_amount, balance, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let id = stmt.insert(params![
        args.name,
        args.icon,
        args.target_date,
        args.target_amount,
        args.balance,
        Utc::now()
    ])?;
    Ok(id)
}

// Fetch a goal by id for test verification without going through the pool.
pub(crate) fn get_goal_by_id_for_test(conn: &Connection, id: i64) -> Result<Option<Goal>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, icon, target_date, target_amount, balance, created
         FROM goals WHERE id = ?1",
    )?;
    stmt.query_row(params![id], |row| {
        Ok(Goal {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            target_date: row.get(3)?,
            target_amount: row.get(4)?,
            balance: row.get(5)?,
            created: row.get(6)?,
        })
    })
    .optional()
    .map_err(Error::from)
}
