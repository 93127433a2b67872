//! Database operations for the `bookings` table.

use sqlx::SqlitePool;
use tablescout_core::types::{BookingRecord, BookingStatus, BookingUpdate, Platform};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `bookings` table. Dates and times are the local-wall-clock
/// strings the booking was made with (`YYYY-MM-DD`, `HH:MM`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub booking_id: String,
    pub restaurant_name: String,
    pub restaurant_addr: Option<String>,
    pub place_id: Option<String>,
    pub date: String,
    pub time: String,
    pub party_size: i64,
    pub platform: String,
    pub platform_ref: Option<String>,
    pub status: String,
    pub maps_url: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl BookingRow {
    /// Converts the row into the shared domain record.
    #[must_use]
    pub fn into_record(self) -> BookingRecord {
        BookingRecord {
            booking_id: self.booking_id,
            restaurant_name: self.restaurant_name,
            restaurant_addr: self.restaurant_addr,
            place_id: self.place_id,
            date: self.date,
            time: self.time,
            party_size: u32::try_from(self.party_size).unwrap_or(0),
            platform: Platform::parse(&self.platform),
            platform_ref: self.platform_ref,
            // Rows written by this crate always carry a known status; the
            // schema default covers anything else.
            status: BookingStatus::parse(&self.status).unwrap_or(BookingStatus::Confirmed),
            maps_url: self.maps_url,
            phone: self.phone,
            notes: self.notes,
        }
    }
}

const BOOKING_COLUMNS: &str = "id, booking_id, restaurant_name, restaurant_addr, place_id, \
     date, time, party_size, platform, platform_ref, status, maps_url, phone, notes, \
     created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Upserts a booking keyed on `booking_id`. Replaying the same booking
/// overwrites the mutable fields and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn save_booking(pool: &SqlitePool, record: &BookingRecord) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO bookings (
            booking_id, restaurant_name, restaurant_addr, place_id,
            date, time, party_size, platform, platform_ref, status,
            maps_url, phone, notes
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(booking_id) DO UPDATE SET
            restaurant_name = excluded.restaurant_name,
            restaurant_addr = excluded.restaurant_addr,
            place_id = excluded.place_id,
            date = excluded.date,
            time = excluded.time,
            party_size = excluded.party_size,
            platform = excluded.platform,
            platform_ref = excluded.platform_ref,
            status = excluded.status,
            maps_url = excluded.maps_url,
            phone = excluded.phone,
            notes = excluded.notes,
            updated_at = datetime('now')",
    )
    .bind(&record.booking_id)
    .bind(&record.restaurant_name)
    .bind(&record.restaurant_addr)
    .bind(&record.place_id)
    .bind(&record.date)
    .bind(&record.time)
    .bind(i64::from(record.party_size))
    .bind(record.platform.as_str())
    .bind(&record.platform_ref)
    .bind(record.status.as_str())
    .bind(&record.maps_url)
    .bind(&record.phone)
    .bind(&record.notes)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns a booking by its `booking_id`, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_booking(pool: &SqlitePool, booking_id: &str) -> Result<Option<BookingRow>, DbError> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ? LIMIT 1"
    ))
    .bind(booking_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Optional filters for [`list_bookings`]. `upcoming` keeps bookings dated
/// today or later that are still live (confirmed or modified); `past` keeps
/// bookings dated strictly before today.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub upcoming: bool,
    pub past: bool,
    pub limit: Option<i64>,
}

/// Lists bookings ordered by date then time, soonest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_bookings(
    pool: &SqlitePool,
    filter: &BookingFilter,
) -> Result<Vec<BookingRow>, DbError> {
    let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1");
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if filter.upcoming {
        sql.push_str(" AND date >= date('now') AND status IN ('confirmed', 'modified')");
    }
    if filter.past {
        sql.push_str(" AND date < date('now')");
    }
    sql.push_str(" ORDER BY date ASC, time ASC LIMIT ?");

    let mut query = sqlx::query_as::<_, BookingRow>(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status.as_str().to_string());
    }
    query = query.bind(filter.limit.unwrap_or(20));

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Moves a booking to `status`, overlaying any fields set in `fields`, and
/// bumps `updated_at`. Returns `false` if no booking matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_booking_status(
    pool: &SqlitePool,
    booking_id: &str,
    status: BookingStatus,
    fields: &BookingUpdate,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE bookings SET
            status = ?,
            date = COALESCE(?, date),
            time = COALESCE(?, time),
            party_size = COALESCE(?, party_size),
            platform_ref = COALESCE(?, platform_ref),
            notes = COALESCE(?, notes),
            updated_at = datetime('now')
         WHERE booking_id = ?",
    )
    .bind(status.as_str())
    .bind(&fields.date)
    .bind(&fields.time)
    .bind(fields.party_size.map(i64::from))
    .bind(&fields.platform_ref)
    .bind(&fields.notes)
    .bind(booking_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Counts bookings, optionally restricted to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_bookings(
    pool: &SqlitePool,
    status: Option<BookingStatus>,
) -> Result<i64, DbError> {
    let count = match status {
        Some(status) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}
