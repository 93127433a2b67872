//! Database operations for the `restaurants` table, a local identity cache
//! keyed on the directory place id.

use sqlx::SqlitePool;
use tablescout_core::types::{Platform, RestaurantRecord};

use crate::DbError;

/// A row from the `restaurants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub price_level: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    pub platform: Option<String>,
    pub platform_id: Option<String>,
    pub updated_at: String,
}

impl RestaurantRow {
    /// Converts the row into the shared domain record.
    #[must_use]
    pub fn into_record(self) -> RestaurantRecord {
        RestaurantRecord {
            place_id: self.place_id,
            name: self.name,
            address: self.address,
            lat: self.lat,
            lng: self.lng,
            rating: self.rating,
            review_count: self.review_count,
            price_level: self.price_level,
            phone: self.phone,
            website: self.website,
            maps_url: self.maps_url,
            platform: self.platform.as_deref().map_or(Platform::PhoneOnly, Platform::parse),
            platform_id: self.platform_id,
        }
    }
}

/// Upserts a restaurant keyed on `place_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_restaurant(
    pool: &SqlitePool,
    record: &RestaurantRecord,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO restaurants (
            place_id, name, address, lat, lng, rating, review_count,
            price_level, phone, website, maps_url, platform, platform_id,
            updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
         ON CONFLICT(place_id) DO UPDATE SET
            name = excluded.name,
            address = excluded.address,
            lat = excluded.lat,
            lng = excluded.lng,
            rating = excluded.rating,
            review_count = excluded.review_count,
            price_level = excluded.price_level,
            phone = excluded.phone,
            website = excluded.website,
            maps_url = excluded.maps_url,
            platform = excluded.platform,
            platform_id = excluded.platform_id,
            updated_at = datetime('now')",
    )
    .bind(&record.place_id)
    .bind(&record.name)
    .bind(&record.address)
    .bind(record.lat)
    .bind(record.lng)
    .bind(record.rating)
    .bind(record.review_count)
    .bind(&record.price_level)
    .bind(&record.phone)
    .bind(&record.website)
    .bind(&record.maps_url)
    .bind(record.platform.as_str())
    .bind(&record.platform_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns a restaurant by its place id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_restaurant(
    pool: &SqlitePool,
    place_id: &str,
) -> Result<Option<RestaurantRow>, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(
        "SELECT place_id, name, address, lat, lng, rating, review_count, price_level, \
                phone, website, maps_url, platform, platform_id, updated_at \
         FROM restaurants WHERE place_id = ? LIMIT 1",
    )
    .bind(place_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
