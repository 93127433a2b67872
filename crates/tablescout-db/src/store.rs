//! [`BookingStore`] implementation backed by the SQLite pool.

use sqlx::SqlitePool;
use tablescout_core::capabilities::{BookingStore, CapabilityError};
use tablescout_core::types::{BookingRecord, BookingStatus, BookingUpdate, RestaurantRecord};

use crate::{bookings, restaurants, DbError};

/// Handle the booking engine uses for local persistence.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl BookingStore for Store {
    async fn save_booking(&self, record: &BookingRecord) -> Result<(), CapabilityError> {
        bookings::save_booking(&self.pool, record)
            .await
            .map_err(to_capability)
    }

    async fn get_booking(
        &self,
        booking_id: &str,
    ) -> Result<Option<BookingRecord>, CapabilityError> {
        let row = bookings::get_booking(&self.pool, booking_id)
            .await
            .map_err(to_capability)?;
        Ok(row.map(crate::BookingRow::into_record))
    }

    async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        fields: &BookingUpdate,
    ) -> Result<bool, CapabilityError> {
        bookings::update_booking_status(&self.pool, booking_id, status, fields)
            .await
            .map_err(to_capability)
    }

    async fn get_restaurant(
        &self,
        place_id: &str,
    ) -> Result<Option<RestaurantRecord>, CapabilityError> {
        let row = restaurants::get_restaurant(&self.pool, place_id)
            .await
            .map_err(to_capability)?;
        Ok(row.map(crate::RestaurantRow::into_record))
    }

    async fn save_restaurant(&self, record: &RestaurantRecord) -> Result<(), CapabilityError> {
        restaurants::upsert_restaurant(&self.pool, record)
            .await
            .map_err(to_capability)
    }
}

fn to_capability(err: DbError) -> CapabilityError {
    CapabilityError::Storage(err.to_string())
}
