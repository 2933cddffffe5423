use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single savings goal, as stored in the `goals` table and mirrored in the
/// shared store.
///
/// `balance` and `created` are display-only from the editor's point of view:
/// every merge the editor performs passes them through untouched. `id` is
/// stable for the lifetime of an editor session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Goal {
    pub id: i64, // Primary Key, INTEGER
    pub name: String,
    /// Optional emoji/short grapheme shown next to the goal, NULL if unset.
    pub icon: Option<String>,
    /// Day the goal should be reached by.
    pub target_date: NaiveDate,
    pub target_amount: f64, // REAL
    /// Amount saved so far. Never edited through the goal editor.
    pub balance: f64, // REAL
    /// Creation timestamp. Never edited through the goal editor.
    pub created: DateTime<Utc>, // DATETIME
}
