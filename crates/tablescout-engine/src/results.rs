//! Tagged outcome types for the booking state machine.
//!
//! Every expected failure travels as data with a one-line actionable
//! reason; nothing on these paths is reported through panics or bare
//! booleans.

use tablescout_core::types::{Platform, Slot};

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The full-API platform answered with bookable slots. `matched` is the
    /// proximity-filtered view; when matching finds nothing it falls back to
    /// the full set, which is always retained in `all`.
    Slots {
        restaurant_name: String,
        matched: Vec<Slot>,
        all: Vec<Slot>,
        message: String,
    },
    /// The full-API platform answered with zero slots. A normal negative
    /// result, not an error.
    NoAvailability {
        restaurant_name: String,
        message: String,
    },
    /// A link or phone platform: availability is unknowable without the
    /// API, so the caller gets the out-of-band action instead.
    Fallback {
        restaurant_name: String,
        platform: Platform,
        deep_link: Option<String>,
        phone: Option<String>,
        message: String,
    },
    Failed { reason: String },
}

/// Outcome of a book operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingResult {
    /// No side effect occurred, locally or remotely.
    Preview {
        restaurant_name: String,
        date: String,
        time: String,
        party_size: u32,
        platform: Platform,
        deep_link: Option<String>,
        phone: Option<String>,
        message: String,
    },
    /// The full-API platform confirmed the reservation.
    Booked {
        booking_id: String,
        restaurant_name: String,
        date: String,
        time: String,
        party_size: u32,
        platform_ref: String,
        message: String,
    },
    /// A local intent record for a link/phone platform; the operator still
    /// completes the reservation out-of-band.
    Recorded {
        booking_id: String,
        restaurant_name: String,
        date: String,
        time: String,
        party_size: u32,
        platform: Platform,
        deep_link: Option<String>,
        message: String,
    },
    Failed { reason: String },
}

/// Outcome of a cancel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelResult {
    Preview {
        booking_id: String,
        restaurant_name: String,
        date: String,
        time: String,
        party_size: u32,
        platform: Platform,
        message: String,
    },
    Cancelled {
        booking_id: String,
        restaurant_name: String,
        message: String,
    },
    Failed { reason: String },
}

/// The date/time/party-size triple a booking is held under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTerms {
    pub date: String,
    pub time: String,
    pub party_size: u32,
}

/// Outcome of a modify operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyResult {
    Preview {
        booking_id: String,
        restaurant_name: String,
        platform: Platform,
        original: BookingTerms,
        proposed: BookingTerms,
        message: String,
    },
    /// Full-API path: the original was cancelled and a new reservation was
    /// made under a new booking id.
    Rebooked {
        old_booking_id: String,
        new_booking_id: String,
        restaurant_name: String,
        message: String,
    },
    /// Fallback path: the local record was updated in place; the operator
    /// must confirm the change with the restaurant.
    Updated {
        booking_id: String,
        restaurant_name: String,
        deep_link: Option<String>,
        phone: Option<String>,
        message: String,
    },
    Failed { reason: String },
}
