//! Domain types shared across the tablescout crates.
//!
//! Date and time values are carried as opaque strings (`YYYY-MM-DD`,
//! `HH:MM`) exactly as the external platforms emit them; the core parses
//! them for internal comparison but never reformats them on the way out.

use serde::{Deserialize, Serialize};

/// Booking backend a restaurant resolves to.
///
/// Resy is the only platform with a full booking API; OpenTable and Quandoo
/// are reachable via constructed deep links; `PhoneOnly` is the terminal
/// fallback when nothing else matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Resy,
    Opentable,
    Quandoo,
    GoogleReserve,
    PhoneOnly,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Resy => "resy",
            Platform::Opentable => "opentable",
            Platform::Quandoo => "quandoo",
            Platform::GoogleReserve => "google_reserve",
            Platform::PhoneOnly => "phone_only",
        }
    }

    /// Parses a stored platform string. Unrecognized values collapse to
    /// `PhoneOnly`, the safe fallback for records written by older versions.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "resy" => Platform::Resy,
            "opentable" => Platform::Opentable,
            "quandoo" => Platform::Quandoo,
            "google_reserve" => Platform::GoogleReserve,
            _ => Platform::PhoneOnly,
        }
    }

    /// Fixed per-platform constant expressing how automatable a reservation
    /// is. Used only as a ranking input.
    #[must_use]
    pub fn booking_ease(self) -> f64 {
        match self {
            Platform::Resy => 1.0,
            Platform::Opentable => 0.8,
            Platform::Quandoo => 0.7,
            Platform::GoogleReserve => 0.6,
            Platform::PhoneOnly => 0.3,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of platform resolution for one restaurant.
///
/// `platform_id` is populated only for Resy, OpenTable, and Quandoo when an
/// identifier could be extracted; `PhoneOnly` always carries `None` and a
/// confidence of 1.0, since it is the terminal fallback, never itself uncertain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub platform_id: Option<String>,
    pub confidence: f64,
}

impl PlatformInfo {
    #[must_use]
    pub fn phone_only() -> Self {
        Self {
            platform: Platform::PhoneOnly,
            platform_id: None,
            confidence: 1.0,
        }
    }
}

/// One offered reservation option from the Resy availability endpoint.
///
/// Produced fresh per availability query. `time` may be empty when the
/// platform returns a slot without a start; the slot matcher treats such
/// entries as unranked rather than dropping them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub config_id: String,
    pub token: String,
    pub seating_type: String,
    pub time: String,
    pub end_time: String,
}

/// A normalized place from the directory collaborator (Google Places).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub short_address: String,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub price_level: Option<String>,
    pub maps_url: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub primary_type: String,
    pub open_now: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub editorial_summary: Option<String>,
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
}

/// A single user review attached to a place's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceReview {
    pub author: String,
    pub rating: Option<f64>,
    pub text: String,
    pub published_at: String,
}

/// A restaurant as cached in the local record store, with its resolved
/// booking platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantRecord {
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
    pub platform: Platform,
    pub platform_id: Option<String>,
}

/// Lifecycle status of a locally recorded booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
    Modified,
}

impl BookingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Modified => "modified",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            "modified" => Some(BookingStatus::Modified),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally recorded booking.
///
/// `platform_ref` is the platform-issued reservation reference and is only
/// present for Resy bookings that were confirmed remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: String,
    pub restaurant_name: String,
    pub restaurant_addr: Option<String>,
    pub place_id: Option<String>,
    pub date: String,
    pub time: String,
    pub party_size: u32,
    pub platform: Platform,
    pub platform_ref: Option<String>,
    pub status: BookingStatus,
    pub maps_url: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Optional field overlay applied alongside a status update.
///
/// `Some(v)` sets the field; `None` preserves the stored value.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub date: Option<String>,
    pub time: Option<String>,
    pub party_size: Option<u32>,
    pub platform_ref: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_strings() {
        for p in [
            Platform::Resy,
            Platform::Opentable,
            Platform::Quandoo,
            Platform::GoogleReserve,
            Platform::PhoneOnly,
        ] {
            assert_eq!(Platform::parse(p.as_str()), p);
        }
    }

    #[test]
    fn unknown_platform_string_falls_back_to_phone_only() {
        assert_eq!(Platform::parse("yelp"), Platform::PhoneOnly);
        assert_eq!(Platform::parse(""), Platform::PhoneOnly);
    }

    #[test]
    fn booking_ease_orders_platforms_by_automatability() {
        assert!(Platform::Resy.booking_ease() > Platform::Opentable.booking_ease());
        assert!(Platform::Opentable.booking_ease() > Platform::Quandoo.booking_ease());
        assert!(Platform::Quandoo.booking_ease() > Platform::PhoneOnly.booking_ease());
    }

    #[test]
    fn phone_only_info_is_certain_and_id_less() {
        let info = PlatformInfo::phone_only();
        assert_eq!(info.platform, Platform::PhoneOnly);
        assert!(info.platform_id.is_none());
        assert!((info.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn booking_status_parse_rejects_unknown() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("archived"), None);
    }
}
