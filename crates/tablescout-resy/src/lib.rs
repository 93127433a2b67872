//! Resy reservation platform client.
//!
//! Wraps the Resy consumer API: venue search, slot availability, the
//! two-step booking handshake (details token then book), cancellation, and
//! the authenticated user profile. Read endpoints are cached on disk and
//! fall back to a stale entry when the upstream is unreachable.

mod client;
mod error;
mod types;

pub use client::{BookingConfirmation, ResyClient, ResyUser};
pub use error::ResyError;
