mod meal_repo;
mod template_repo;
mod workout_repo;

pub use meal_repo::MealRepository;
pub use template_repo::TemplateRepository;
pub use workout_repo::WorkoutRepository;

use chrono::{DateTime, Utc};
use fittrack_core::parse_timestamp;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Open (creating if needed) the database and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::debug!("Opened database at {}", path.display());

    Ok(pool)
}

/// Parse a stored id, logging and returning `None` for rows that cannot be used.
fn row_id(table: &str, raw: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(table, id = raw, "Skipping row with invalid id: {}", e);
            None
        }
    }
}

/// Parse the timestamp a record is bucketed by. Rows without one are skipped.
fn row_occurred_at(table: &str, id: &str, raw: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!(table, id, "Skipping row with unparsable timestamp {:?}", raw);
    }
    parsed
}

/// Bookkeeping timestamps fall back to now rather than hiding the row.
fn row_timestamp(raw: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(Utc::now)
}
