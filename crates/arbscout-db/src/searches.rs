//! Database operations for the `searches` table: one row per research run.

use std::fmt;

use arbscout_core::PlatformToggleSet;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl SearchStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::InProgress => "in_progress",
            SearchStatus::Completed => "completed",
            SearchStatus::Cancelled => "cancelled",
            SearchStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchStatus::InProgress)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `searches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub search_term: String,
    pub timestamp: DateTime<Utc>,
    pub platforms: Json<PlatformToggleSet>,
    pub max_products: i64,
    /// Unset until the search is completed.
    pub total_results: Option<i64>,
    pub avg_margin: Option<f64>,
    pub best_margin: Option<f64>,
    pub status: String,
}

/// Final figures recorded when a search ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub total_results: usize,
    pub avg_margin: Option<f64>,
    pub best_margin: Option<f64>,
}

const SEARCH_COLUMNS: &str = "id, search_term, timestamp, platforms, max_products, \
                              total_results, avg_margin, best_margin, status";

/// Records a new search in `in_progress` status and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_search(
    pool: &SqlitePool,
    search_term: &str,
    platforms: PlatformToggleSet,
    max_products: usize,
) -> Result<i64, DbError> {
    let max_products = i64::try_from(max_products).unwrap_or(i64::MAX);
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO searches (search_term, timestamp, platforms, max_products, status) \
         VALUES (?1, ?2, ?3, ?4, 'in_progress') \
         RETURNING id",
    )
    .bind(search_term)
    .bind(Utc::now())
    .bind(Json(platforms))
    .bind(max_products)
    .fetch_one(pool)
    .await?;

    tracing::debug!(id, search_term, "search recorded");
    Ok(id)
}

/// Moves an `in_progress` search to a terminal status with its totals.
///
/// # Errors
///
/// Returns [`DbError::NotTerminal`] if `outcome.status` is `in_progress`,
/// [`DbError::InvalidSearchTransition`] if the search does not exist or has
/// already ended, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_search(
    pool: &SqlitePool,
    id: i64,
    outcome: SearchOutcome,
) -> Result<(), DbError> {
    if !outcome.status.is_terminal() {
        return Err(DbError::NotTerminal {
            id,
            status: outcome.status,
        });
    }
    let total_results = i64::try_from(outcome.total_results).unwrap_or(i64::MAX);

    let result = sqlx::query(
        "UPDATE searches \
         SET status = ?1, total_results = ?2, avg_margin = ?3, best_margin = ?4 \
         WHERE id = ?5 AND status = 'in_progress'",
    )
    .bind(outcome.status.as_str())
    .bind(total_results)
    .bind(outcome.avg_margin)
    .bind(outcome.best_margin)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSearchTransition {
            id,
            target: outcome.status,
        });
    }
    Ok(())
}

/// Fetches a single search by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_search(pool: &SqlitePool, id: i64) -> Result<SearchRow, DbError> {
    sqlx::query_as::<_, SearchRow>(&format!("SELECT {SEARCH_COLUMNS} FROM searches WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` searches, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_searches(pool: &SqlitePool, limit: i64) -> Result<Vec<SearchRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchRow>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM searches ORDER BY timestamp DESC, id DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Searches whose term contains `fragment` (case-insensitive for ASCII),
/// newest first. `%` and `_` in `fragment` match literally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_searches(pool: &SqlitePool, fragment: &str) -> Result<Vec<SearchRow>, DbError> {
    let pattern = format!("%{}%", escape_like(fragment));
    let rows = sqlx::query_as::<_, SearchRow>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM searches \
         WHERE search_term LIKE ?1 ESCAPE '\\' \
         ORDER BY timestamp DESC, id DESC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
