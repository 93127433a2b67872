//! Capability traits the booking engine is generic over.
//!
//! Each external collaborator (the Resy reservation API, the place
//! directory, and the local record store) is modelled as a trait so the
//! engine can be exercised against call-counting doubles in tests. Absence
//! of a capability (no credentials) is a legitimate configuration state
//! reported through [`ReservationApi::has_credentials`], not a hidden null.
//!
//! Collaborator failures are explicit [`CapabilityError`] values. The engine
//! pattern-matches on them to drive its fallback chain; nothing here relies
//! on exception-style suppression.

use thiserror::Error;

use crate::types::{BookingRecord, BookingStatus, BookingUpdate, PlaceRecord, RestaurantRecord, Slot};

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// Network-level failure after any local cache fallback was exhausted.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The platform answered but reported an error of its own.
    #[error("platform error: {0}")]
    Platform(String),

    /// The local record store could not complete a read or write.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Parameters for a place-directory text search.
#[derive(Debug, Clone)]
pub struct PlaceQuery {
    pub query: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    pub price_levels: Option<Vec<String>>,
    pub min_rating: Option<f64>,
    pub max_results: u32,
}

/// The full-API reservation platform (Resy).
///
/// `confirm_token` + `submit_confirm` form the two-step anti-double-booking
/// handshake: a short-lived token is obtained for a specific slot and then
/// submitted for final confirmation.
pub trait ReservationApi {
    /// Whether credentials for the platform are configured. Every branch
    /// that talks to the platform is gated on this.
    fn has_credentials(&self) -> bool;

    /// Looks up a venue id by name and location. `Ok(None)` means the
    /// platform knows no such venue; `Err` is a transport failure with no
    /// cached answer to fall back on.
    async fn search_venue(
        &self,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<Option<String>, CapabilityError>;

    /// Lists bookable slots for a venue/date/party size. An empty list is a
    /// valid "no availability" answer, distinct from a transport failure.
    async fn list_slots(
        &self,
        venue_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Vec<Slot>, CapabilityError>;

    /// Obtains a confirm token for a specific slot configuration.
    async fn confirm_token(
        &self,
        config_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Option<String>, CapabilityError>;

    /// Submits a confirm token; returns the platform-issued reservation
    /// reference on success.
    async fn submit_confirm(&self, book_token: &str) -> Result<String, CapabilityError>;

    /// Cancels a remotely confirmed reservation by its platform reference.
    async fn cancel_reservation(&self, platform_ref: &str) -> Result<(), CapabilityError>;
}

/// The place-directory collaborator (Google Places).
pub trait PlaceDirectory {
    async fn search_places(&self, query: &PlaceQuery) -> Result<Vec<PlaceRecord>, CapabilityError>;

    async fn place_details(&self, place_id: &str)
        -> Result<Option<PlaceRecord>, CapabilityError>;
}

/// The local record store. The engine issues idempotent upserts keyed on
/// stable identifiers and owns none of the storage format.
pub trait BookingStore {
    async fn save_booking(&self, record: &BookingRecord) -> Result<(), CapabilityError>;

    async fn get_booking(&self, booking_id: &str)
        -> Result<Option<BookingRecord>, CapabilityError>;

    /// Moves a booking to `status`, overlaying any fields set in `fields`.
    /// Returns `false` if no such booking exists.
    async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        fields: &BookingUpdate,
    ) -> Result<bool, CapabilityError>;

    async fn get_restaurant(
        &self,
        place_id: &str,
    ) -> Result<Option<RestaurantRecord>, CapabilityError>;

    async fn save_restaurant(&self, record: &RestaurantRecord) -> Result<(), CapabilityError>;
}
