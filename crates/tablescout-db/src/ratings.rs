//! Database operations for the `ratings` table and visit statistics.

use sqlx::SqlitePool;
use tablescout_core::types::{BookingStatus, BookingUpdate};

use crate::{bookings, BookingRow, DbError};

/// A rating joined with the booking it belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingRow {
    pub id: i64,
    pub booking_id: String,
    pub rating: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub restaurant_name: String,
    pub place_id: Option<String>,
    pub date: String,
}

/// Most-visited restaurants with their average rating, for the suggestion
/// and status commands.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VisitSummary {
    pub restaurant_name: String,
    pub place_id: Option<String>,
    pub visit_count: i64,
    pub avg_rating: Option<f64>,
}

/// Records a rating for a booking and marks the booking completed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either write fails.
pub async fn save_rating(
    pool: &SqlitePool,
    booking_id: &str,
    rating: i64,
    notes: Option<&str>,
) -> Result<(), DbError> {
    bookings::update_booking_status(
        pool,
        booking_id,
        BookingStatus::Completed,
        &BookingUpdate::default(),
    )
    .await?;

    sqlx::query("INSERT INTO ratings (booking_id, rating, notes) VALUES (?, ?, ?)")
        .bind(booking_id)
        .bind(rating)
        .bind(notes)
        .execute(pool)
        .await?;
    Ok(())
}

/// Lists ratings newest first, optionally restricted to one place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ratings(
    pool: &SqlitePool,
    place_id: Option<&str>,
) -> Result<Vec<RatingRow>, DbError> {
    let mut sql = String::from(
        "SELECT r.id, r.booking_id, r.rating, r.notes, r.created_at, \
                b.restaurant_name, b.place_id, b.date \
         FROM ratings r JOIN bookings b ON r.booking_id = b.booking_id",
    );
    if place_id.is_some() {
        sql.push_str(" WHERE b.place_id = ?");
    }
    sql.push_str(" ORDER BY r.created_at DESC");

    let mut query = sqlx::query_as::<_, RatingRow>(&sql);
    if let Some(place_id) = place_id {
        query = query.bind(place_id);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Returns yesterday's confirmed bookings that have no rating yet, ordered
/// by time. These are the candidates for the rating prompt.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_unrated_past_bookings(pool: &SqlitePool) -> Result<Vec<BookingRow>, DbError> {
    let rows = sqlx::query_as::<_, BookingRow>(
        "SELECT b.id, b.booking_id, b.restaurant_name, b.restaurant_addr, b.place_id, \
                b.date, b.time, b.party_size, b.platform, b.platform_ref, b.status, \
                b.maps_url, b.phone, b.notes, b.created_at, b.updated_at \
         FROM bookings b \
         LEFT JOIN ratings r ON b.booking_id = r.booking_id \
         WHERE b.date = date('now', '-1 day') \
           AND b.status = 'confirmed' \
           AND r.id IS NULL \
         ORDER BY b.time ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns the most-visited restaurants with their average rating.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_top_restaurants(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<VisitSummary>, DbError> {
    let rows = sqlx::query_as::<_, VisitSummary>(
        "SELECT b.restaurant_name, b.place_id, COUNT(*) as visit_count, \
                AVG(r.rating) as avg_rating \
         FROM bookings b \
         LEFT JOIN ratings r ON b.booking_id = r.booking_id \
         GROUP BY b.place_id \
         ORDER BY visit_count DESC \
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
