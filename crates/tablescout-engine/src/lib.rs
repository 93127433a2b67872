//! Booking orchestration: platform resolution, deep links, slot matching,
//! the check/book/cancel/modify state machine, and search ranking.
//!
//! The engine talks to its collaborators only through the capability traits
//! in `tablescout-core`, so every flow here can be exercised against
//! in-memory doubles.

mod booking;
mod discovery;
mod platform;
mod results;
mod slots;

pub use booking::BookingEngine;
pub use discovery::{rank_results, search, RankedCandidate, SearchParams, SortKey};
pub use platform::{deep_link, resolve_platform};
pub use results::{BookingResult, BookingTerms, CancelResult, CheckOutcome, ModifyResult};
pub use slots::filter_slots;
