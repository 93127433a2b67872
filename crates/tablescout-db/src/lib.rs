//! SQLite persistence for bookings, restaurants, ratings, and preferences.
//!
//! The database is a single local file under the application data directory.
//! All writes are idempotent upserts keyed on stable identifiers
//! (`booking_id`, `place_id`), so replaying an operation never duplicates a
//! record.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use thiserror::Error;

mod bookings;
mod preferences;
mod ratings;
mod restaurants;
mod store;

pub use bookings::{
    count_bookings, get_booking, list_bookings, save_booking, update_booking_status, BookingFilter,
    BookingRow,
};
pub use preferences::{get_preferences, set_preference};
pub use ratings::{
    get_ratings, get_top_restaurants, get_unrated_past_bookings, save_rating, RatingRow,
    VisitSummary,
};
pub use restaurants::{get_restaurant, upsert_restaurant, RestaurantRow};
pub use store::Store;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/tablescout-db/Cargo.toml; resolves to
// <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connects to the SQLite database at `database_url`, creating the file if
/// it does not exist (`mode=rwc` in the URL). The parent directory must
/// already exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Runs all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Sends a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
