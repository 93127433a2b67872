//! Google Places API (New) client: restaurant search and details.
//!
//! Implements the place-directory capability: text search with location
//! bias, place details with reviews, and a connectivity probe. Responses
//! are cached on disk; on transport failure the last cached value is
//! returned regardless of its age, because a stale answer beats none.

mod client;
mod error;
mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
