//! Shared domain types, capability traits, and infrastructure for tablescout.
//!
//! Everything that more than one crate needs lives here: the booking
//! [`Platform`] taxonomy, record types exchanged with the persistence and
//! directory collaborators, the capability traits the booking engine is
//! generic over, environment-driven configuration, the on-disk response
//! cache, and the call-rate limiter.

use thiserror::Error;

pub mod app_config;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod rate_limit;
pub mod types;

pub use app_config::AppConfig;
pub use cache::FileCache;
pub use capabilities::{
    BookingStore, CapabilityError, PlaceDirectory, PlaceQuery, ReservationApi,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use rate_limit::RateLimiter;
pub use types::{
    BookingRecord, BookingStatus, BookingUpdate, PlaceRecord, PlaceReview, Platform,
    PlatformInfo, RestaurantRecord, Slot,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
