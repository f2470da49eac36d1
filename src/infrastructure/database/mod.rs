//! Database Module
//!
//! Connection pool over the sqlx `Any` driver, migrations, and the column
//! encodings shared by every repository.
//!
//! The backend is picked from the URL scheme (`sqlite:` or `mysql:`). Columns
//! stick to types both backends decode the same way through `Any`:
//!
//! - IDs, counts and flags are `BIGINT` (flags as `0`/`1`)
//! - timestamps are RFC 3339 UTC text with fixed microsecond precision, so
//!   they order correctly as strings
//! - dates are `YYYY-MM-DD` text

use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::DatabaseSettings;
use crate::shared::error::AppError;

/// Create a connection pool for the configured database URL.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let url = settings.connection_url();
    let mut options = AnyPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout));

    // Each connection to an in-memory SQLite database is a separate database,
    // so keep exactly one alive for the lifetime of the pool.
    if url.contains(":memory:") || url.contains("mode=memory") {
        options = options
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    options.connect(url).await
}

/// Run database migrations
pub async fn run_migrations(pool: &AnyPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}

pub fn parse_opt_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::Internal(format!("Invalid stored date '{}': {}", value, e)))
}

/// Narrow a `BIGINT` column to the `i32` the entity uses.
pub fn to_i32(value: i64, column: &str) -> Result<i32, AppError> {
    i32::try_from(value)
        .map_err(|_| AppError::Internal(format!("Column {} out of range: {}", column, value)))
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Map a foreign-key violation to `Conflict`, anything else to `Database`.
pub fn conflict_on_reference(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
