//! The check/book/cancel/modify state machine.
//!
//! Every operation starts idle, runs to completion, and returns a tagged
//! outcome. Two-phase confirmation: without `confirm` an operation only
//! previews, with no local or remote side effect. The Resy path owns the
//! confirm-token handshake; link and phone platforms only ever produce
//! local intent records.

use tablescout_core::capabilities::{BookingStore, PlaceDirectory, ReservationApi};
use tablescout_core::types::{
    BookingRecord, BookingStatus, BookingUpdate, Platform, RestaurantRecord,
};

use crate::platform::{deep_link, resolve_platform};
use crate::results::{BookingResult, BookingTerms, CancelResult, CheckOutcome, ModifyResult};
use crate::slots::filter_slots;

/// Orchestrates booking operations across the injected collaborators.
///
/// `reservations` and `directory` are optional capabilities: without Resy
/// credentials every full-API branch degrades to the fallback path, and
/// without the place directory an unknown restaurant is a terminal failure.
pub struct BookingEngine<'a, R, D, S> {
    reservations: Option<&'a R>,
    directory: Option<&'a D>,
    store: &'a S,
    default_lat: f64,
    default_lng: f64,
}

impl<'a, R, D, S> BookingEngine<'a, R, D, S>
where
    R: ReservationApi,
    D: PlaceDirectory,
    S: BookingStore,
{
    pub fn new(
        reservations: Option<&'a R>,
        directory: Option<&'a D>,
        store: &'a S,
        default_lat: f64,
        default_lng: f64,
    ) -> Self {
        Self {
            reservations,
            directory,
            store,
            default_lat,
            default_lng,
        }
    }

    fn credentialed_api(&self) -> Option<&'a R> {
        self.reservations.filter(|api| api.has_credentials())
    }

    /// Reports availability for a restaurant on a date near a time.
    pub async fn check_availability(
        &self,
        place_id: &str,
        date: &str,
        time: &str,
        party_size: u32,
    ) -> CheckOutcome {
        let restaurant = match self.resolve_restaurant(place_id, false).await {
            Ok(restaurant) => restaurant,
            Err(reason) => return CheckOutcome::Failed { reason },
        };

        if restaurant.platform == Platform::Resy {
            if let (Some(venue_id), Some(api)) =
                (&restaurant.platform_id, self.credentialed_api())
            {
                let slots = match api.list_slots(venue_id, date, party_size).await {
                    Ok(slots) => slots,
                    Err(e) => {
                        return CheckOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                if slots.is_empty() {
                    return CheckOutcome::NoAvailability {
                        restaurant_name: restaurant.name,
                        message: "No availability on this date".to_string(),
                    };
                }
                let matched = filter_slots(&slots, time);
                let message = format!("{} time slots available", slots.len());
                return CheckOutcome::Slots {
                    restaurant_name: restaurant.name,
                    matched: if matched.is_empty() {
                        slots.clone()
                    } else {
                        matched
                    },
                    all: slots,
                    message,
                };
            }
        }

        // Availability is unknowable without the full API; hand back the
        // out-of-band action instead of a guess.
        let link = deep_link(
            restaurant.platform,
            restaurant.platform_id.as_deref(),
            Some(date),
            Some(time),
            party_size,
        );
        let message = match &link {
            Some(link) => format!("Check availability via {}: {link}", restaurant.platform),
            None => format!("Check availability via {}", restaurant.platform),
        };
        CheckOutcome::Fallback {
            restaurant_name: restaurant.name,
            platform: restaurant.platform,
            deep_link: link,
            phone: restaurant.phone,
            message,
        }
    }

    /// Books a table, or previews the booking when `confirm` is false.
    pub async fn book(
        &self,
        place_id: &str,
        date: &str,
        time: &str,
        party_size: u32,
        confirm: bool,
        notes: Option<&str>,
    ) -> BookingResult {
        let restaurant = match self.resolve_restaurant(place_id, true).await {
            Ok(restaurant) => restaurant,
            Err(reason) => return BookingResult::Failed { reason },
        };
        let terms = BookingTerms {
            date: date.to_string(),
            time: time.to_string(),
            party_size,
        };

        if restaurant.platform == Platform::Resy {
            if let (Some(venue_id), Some(api)) =
                (restaurant.platform_id.clone(), self.credentialed_api())
            {
                return self
                    .book_resy(&restaurant, &venue_id, api, &terms, confirm, notes)
                    .await;
            }
        }
        self.book_fallback(&restaurant, &terms, confirm, notes).await
    }

    async fn book_resy(
        &self,
        restaurant: &RestaurantRecord,
        venue_id: &str,
        api: &R,
        terms: &BookingTerms,
        confirm: bool,
        notes: Option<&str>,
    ) -> BookingResult {
        let slots = match api.list_slots(venue_id, &terms.date, terms.party_size).await {
            Ok(slots) => slots,
            Err(e) => {
                return BookingResult::Failed {
                    reason: e.to_string(),
                }
            }
        };
        if slots.is_empty() {
            return BookingResult::Failed {
                reason: "No availability on this date".to_string(),
            };
        }

        let matching = filter_slots(&slots, &terms.time);
        let Some(slot) = matching.first() else {
            // Never silently book an unrequested time; list the nearest
            // options for the operator instead.
            let available: Vec<&str> = slots
                .iter()
                .filter(|s| !s.time.is_empty())
                .map(|s| s.time.as_str())
                .take(6)
                .collect();
            return BookingResult::Failed {
                reason: format!(
                    "No slot at {}. Available: {}",
                    terms.time,
                    available.join(", ")
                ),
            };
        };

        if !confirm {
            return BookingResult::Preview {
                restaurant_name: restaurant.name.clone(),
                date: terms.date.clone(),
                time: slot.time.clone(),
                party_size: terms.party_size,
                platform: Platform::Resy,
                deep_link: None,
                phone: restaurant.phone.clone(),
                message: format!(
                    "Ready to book {} on {} at {} for {}",
                    restaurant.name, terms.date, slot.time, terms.party_size
                ),
            };
        }

        let token = match api
            .confirm_token(&slot.config_id, &terms.date, terms.party_size)
            .await
        {
            Ok(Some(token)) => token,
            Ok(None) => {
                return BookingResult::Failed {
                    reason: "Could not get booking token".to_string(),
                }
            }
            Err(e) => {
                return BookingResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let reference = match api.submit_confirm(&token).await {
            Ok(reference) => reference,
            Err(e) => {
                return BookingResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let booking_id = new_booking_id();
        let record = BookingRecord {
            booking_id: booking_id.clone(),
            restaurant_name: restaurant.name.clone(),
            restaurant_addr: restaurant.address.clone(),
            place_id: Some(restaurant.place_id.clone()),
            date: terms.date.clone(),
            time: slot.time.clone(),
            party_size: terms.party_size,
            platform: Platform::Resy,
            platform_ref: Some(reference.clone()),
            status: BookingStatus::Confirmed,
            maps_url: restaurant.maps_url.clone(),
            phone: restaurant.phone.clone(),
            notes: notes.map(str::to_string),
        };

        // The platform has confirmed; a local write failure must not
        // un-book the reservation, only flag it.
        let mut message = format!(
            "Booked {} on {} at {} for {}",
            restaurant.name, terms.date, slot.time, terms.party_size
        );
        if let Err(e) = self.store.save_booking(&record).await {
            tracing::error!(booking_id, error = %e, "confirmed reservation could not be recorded locally");
            message.push_str(" (warning: local record could not be written)");
        }

        BookingResult::Booked {
            booking_id,
            restaurant_name: restaurant.name.clone(),
            date: terms.date.clone(),
            time: slot.time.clone(),
            party_size: terms.party_size,
            platform_ref: reference,
            message,
        }
    }

    async fn book_fallback(
        &self,
        restaurant: &RestaurantRecord,
        terms: &BookingTerms,
        confirm: bool,
        notes: Option<&str>,
    ) -> BookingResult {
        let link = deep_link(
            restaurant.platform,
            restaurant.platform_id.as_deref(),
            Some(&terms.date),
            Some(&terms.time),
            terms.party_size,
        );
        let action = match &link {
            Some(link) => format!("via {}: {link}", restaurant.platform),
            None => format!(
                "via {} — call {}",
                restaurant.platform,
                restaurant.phone.as_deref().unwrap_or("N/A")
            ),
        };

        if !confirm {
            return BookingResult::Preview {
                restaurant_name: restaurant.name.clone(),
                date: terms.date.clone(),
                time: terms.time.clone(),
                party_size: terms.party_size,
                platform: restaurant.platform,
                deep_link: link,
                phone: restaurant.phone.clone(),
                message: format!("Book {action}"),
            };
        }

        let booking_id = new_booking_id();
        let record = BookingRecord {
            booking_id: booking_id.clone(),
            restaurant_name: restaurant.name.clone(),
            restaurant_addr: restaurant.address.clone(),
            place_id: Some(restaurant.place_id.clone()),
            date: terms.date.clone(),
            time: terms.time.clone(),
            party_size: terms.party_size,
            platform: restaurant.platform,
            platform_ref: None,
            status: BookingStatus::Confirmed,
            maps_url: restaurant.maps_url.clone(),
            phone: restaurant.phone.clone(),
            notes: notes.map(str::to_string),
        };
        if let Err(e) = self.store.save_booking(&record).await {
            return BookingResult::Failed {
                reason: e.to_string(),
            };
        }

        BookingResult::Recorded {
            booking_id,
            restaurant_name: restaurant.name.clone(),
            date: terms.date.clone(),
            time: terms.time.clone(),
            party_size: terms.party_size,
            platform: restaurant.platform,
            deep_link: link,
            message: format!("Booking recorded. Complete booking {action}"),
        }
    }

    /// Cancels a booking, or previews the cancellation when `confirm` is
    /// false. Cancelling an already-cancelled booking fails explicitly.
    pub async fn cancel(&self, booking_id: &str, confirm: bool) -> CancelResult {
        let booking = match self.store.get_booking(booking_id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => {
                return CancelResult::Failed {
                    reason: format!("Booking not found: {booking_id}"),
                }
            }
            Err(e) => {
                return CancelResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if booking.status == BookingStatus::Cancelled {
            return CancelResult::Failed {
                reason: "Booking is already cancelled".to_string(),
            };
        }

        if !confirm {
            return CancelResult::Preview {
                booking_id: booking_id.to_string(),
                restaurant_name: booking.restaurant_name.clone(),
                date: booking.date.clone(),
                time: booking.time.clone(),
                party_size: booking.party_size,
                platform: booking.platform,
                message: format!(
                    "Cancel {} on {} at {}?",
                    booking.restaurant_name, booking.date, booking.time
                ),
            };
        }

        // A failed remote cancel aborts everything; the local record must
        // stay confirmed rather than drift from the platform's state.
        if booking.platform == Platform::Resy {
            if let (Some(reference), Some(api)) = (&booking.platform_ref, self.credentialed_api())
            {
                if let Err(e) = api.cancel_reservation(reference).await {
                    return CancelResult::Failed {
                        reason: format!("Resy cancellation failed: {e}"),
                    };
                }
            }
        }

        match self
            .store
            .update_booking_status(booking_id, BookingStatus::Cancelled, &BookingUpdate::default())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return CancelResult::Failed {
                    reason: format!("Booking not found: {booking_id}"),
                }
            }
            Err(e) => {
                return CancelResult::Failed {
                    reason: e.to_string(),
                }
            }
        }

        CancelResult::Cancelled {
            booking_id: booking_id.to_string(),
            restaurant_name: booking.restaurant_name.clone(),
            message: format!(
                "Cancelled: {} on {} at {}",
                booking.restaurant_name, booking.date, booking.time
            ),
        }
    }

    /// Modifies a booking's date, time, or party size. Unspecified fields
    /// keep the existing values. On the Resy path this is strictly
    /// cancel-then-book; a re-book failure after the cancel is reported
    /// with the loss of the original made explicit.
    pub async fn modify(
        &self,
        booking_id: &str,
        new_date: Option<&str>,
        new_time: Option<&str>,
        new_party_size: Option<u32>,
        confirm: bool,
    ) -> ModifyResult {
        let booking = match self.store.get_booking(booking_id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => {
                return ModifyResult::Failed {
                    reason: format!("Booking not found: {booking_id}"),
                }
            }
            Err(e) => {
                return ModifyResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if booking.status != BookingStatus::Confirmed {
            return ModifyResult::Failed {
                reason: format!("Cannot modify booking with status: {}", booking.status),
            };
        }

        let proposed = BookingTerms {
            date: new_date.unwrap_or(&booking.date).to_string(),
            time: new_time.unwrap_or(&booking.time).to_string(),
            party_size: new_party_size.unwrap_or(booking.party_size),
        };

        if !confirm {
            let original = BookingTerms {
                date: booking.date.clone(),
                time: booking.time.clone(),
                party_size: booking.party_size,
            };
            let message = format!(
                "Modify {}: {} {} ({}p) \u{2192} {} {} ({}p)?",
                booking.restaurant_name,
                original.date,
                original.time,
                original.party_size,
                proposed.date,
                proposed.time,
                proposed.party_size
            );
            return ModifyResult::Preview {
                booking_id: booking_id.to_string(),
                restaurant_name: booking.restaurant_name.clone(),
                platform: booking.platform,
                original,
                proposed,
                message,
            };
        }

        if booking.platform == Platform::Resy && self.credentialed_api().is_some() {
            return self.modify_resy(booking_id, &booking, &proposed).await;
        }
        self.modify_fallback(booking_id, &booking, &proposed).await
    }

    async fn modify_resy(
        &self,
        booking_id: &str,
        booking: &BookingRecord,
        proposed: &BookingTerms,
    ) -> ModifyResult {
        if let CancelResult::Failed { reason } = self.cancel(booking_id, true).await {
            return ModifyResult::Failed {
                reason: format!("Could not cancel original: {reason}"),
            };
        }

        let place_id = match booking.place_id.as_deref() {
            Some(place_id) if !place_id.is_empty() => place_id,
            _ => {
                return ModifyResult::Failed {
                    reason: "New booking failed: restaurant identity unknown \
                             (old booking was cancelled)"
                        .to_string(),
                }
            }
        };

        let book_result = self
            .book(
                place_id,
                &proposed.date,
                &proposed.time,
                proposed.party_size,
                true,
                booking.notes.as_deref(),
            )
            .await;

        match book_result {
            BookingResult::Booked {
                booking_id: new_booking_id,
                time,
                ..
            }
            | BookingResult::Recorded {
                booking_id: new_booking_id,
                time,
                ..
            } => ModifyResult::Rebooked {
                old_booking_id: booking_id.to_string(),
                new_booking_id,
                restaurant_name: booking.restaurant_name.clone(),
                message: format!(
                    "Modified: {} now on {} at {} for {}",
                    booking.restaurant_name, proposed.date, time, proposed.party_size
                ),
            },
            BookingResult::Failed { reason } => ModifyResult::Failed {
                reason: format!("New booking failed: {reason} (old booking was cancelled)"),
            },
            BookingResult::Preview { .. } => ModifyResult::Failed {
                reason: "New booking failed (old booking was cancelled)".to_string(),
            },
        }
    }

    async fn modify_fallback(
        &self,
        booking_id: &str,
        booking: &BookingRecord,
        proposed: &BookingTerms,
    ) -> ModifyResult {
        let fields = BookingUpdate {
            date: Some(proposed.date.clone()),
            time: Some(proposed.time.clone()),
            party_size: Some(proposed.party_size),
            ..BookingUpdate::default()
        };
        match self
            .store
            .update_booking_status(booking_id, BookingStatus::Confirmed, &fields)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return ModifyResult::Failed {
                    reason: format!("Booking not found: {booking_id}"),
                }
            }
            Err(e) => {
                return ModifyResult::Failed {
                    reason: e.to_string(),
                }
            }
        }

        // Regenerate the link with the platform id from the restaurant
        // cache, if we still have it.
        let platform_id = match booking.place_id.as_deref() {
            Some(place_id) => match self.store.get_restaurant(place_id).await {
                Ok(Some(restaurant)) => restaurant.platform_id,
                _ => None,
            },
            None => None,
        };
        let link = deep_link(
            booking.platform,
            platform_id.as_deref(),
            Some(&proposed.date),
            Some(&proposed.time),
            proposed.party_size,
        );

        let mut message = format!(
            "Local record updated. Contact {} to confirm the change",
            booking.restaurant_name
        );
        if let Some(phone) = booking.phone.as_deref() {
            if !phone.is_empty() {
                message.push_str(&format!(" \u{2014} call {phone}"));
            }
        }

        ModifyResult::Updated {
            booking_id: booking_id.to_string(),
            restaurant_name: booking.restaurant_name.clone(),
            deep_link: link,
            phone: booking.phone.clone(),
            message,
        }
    }

    /// Loads a restaurant from the local store, falling back to the place
    /// directory for unknown ids. Directory hits get their platform
    /// resolved; with `persist` the result is cached in the store.
    async fn resolve_restaurant(
        &self,
        place_id: &str,
        persist: bool,
    ) -> Result<RestaurantRecord, String> {
        match self.store.get_restaurant(place_id).await {
            Ok(Some(record)) => return Ok(record),
            Ok(None) => {}
            Err(e) => return Err(e.to_string()),
        }

        let Some(directory) = self.directory else {
            return Err(format!("Restaurant not found: {place_id}"));
        };
        let place = match directory.place_details(place_id).await {
            Ok(Some(place)) => place,
            Ok(None) => return Err(format!("Restaurant not found: {place_id}")),
            Err(e) => return Err(e.to_string()),
        };

        let lat = place.lat.unwrap_or(self.default_lat);
        let lng = place.lng.unwrap_or(self.default_lng);
        let info = resolve_platform(
            &place.name,
            lat,
            lng,
            place.website.as_deref(),
            self.credentialed_api(),
        )
        .await;

        let record = RestaurantRecord {
            place_id: place.place_id,
            name: place.name,
            address: Some(place.address),
            lat: place.lat,
            lng: place.lng,
            rating: place.rating,
            review_count: place.review_count,
            price_level: place.price_level,
            phone: place.phone,
            website: place.website,
            maps_url: Some(place.maps_url),
            platform: info.platform,
            platform_id: info.platform_id,
        };
        if persist {
            if let Err(e) = self.store.save_restaurant(&record).await {
                tracing::warn!(place_id, error = %e, "failed to cache restaurant record");
            }
        }
        Ok(record)
    }
}

fn new_booking_id() -> String {
    format!("BK_{}", chrono::Utc::now().timestamp_millis())
}
