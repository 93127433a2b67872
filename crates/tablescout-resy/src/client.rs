//! HTTP client for the Resy consumer API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tablescout_core::app_config::CacheTtls;
use tablescout_core::capabilities::{CapabilityError, ReservationApi};
use tablescout_core::types::Slot;
use tablescout_core::{AppConfig, FileCache, RateLimiter};

use crate::error::ResyError;
use crate::types::{slot_from_entry, stringify_id, BookResponse, DetailsResponse, FindResponse, UserResponse};

/// Cached outcome of a venue lookup. A `None` venue id is a remembered
/// negative answer, so repeated misses do not re-query the API.
#[derive(Debug, Serialize, Deserialize)]
struct VenueMatch {
    venue_id: Option<String>,
    name: String,
}

/// Outcome of a confirmed booking.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub resy_token: String,
    pub reservation_id: String,
}

/// The authenticated Resy user profile.
#[derive(Debug, Clone)]
pub struct ResyUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Client for the Resy API with on-disk caching and rate limiting.
///
/// Credentials are optional at construction; every request fails with
/// [`ResyError::MissingCredentials`] until both the API key and auth token
/// are configured.
pub struct ResyClient {
    client: Client,
    credentials: Option<(String, String)>,
    base_url: String,
    cache: FileCache,
    limiter: RateLimiter,
    ttls: CacheTtls,
}

impl ResyClient {
    /// Creates a client pointed at the production Resy API.
    ///
    /// # Errors
    ///
    /// Returns [`ResyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ResyError> {
        let base_url = config.resy_base_url.clone();
        Self::with_base_url(config, &base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, ResyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tablescout/0.1 (restaurant-bookings)")
            .build()?;

        Ok(Self {
            client,
            credentials: config.resy_credentials(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: FileCache::new(&config.cache_dir(), "resy"),
            limiter: RateLimiter::new(
                config.resy_rate_limit_calls,
                Duration::from_secs(config.resy_rate_limit_period_secs),
            ),
            ttls: config.cache_ttls,
        })
    }

    /// Whether both the API key and the auth token are configured.
    #[must_use]
    pub fn has_credentials_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<(&str, &str), ResyError> {
        self.credentials
            .as_ref()
            .map(|(key, token)| (key.as_str(), token.as_str()))
            .ok_or(ResyError::MissingCredentials)
    }

    /// Looks up a venue id by name near a location. Matching is a
    /// case-insensitive substring test in either direction. `Ok(None)` means
    /// Resy does not list the venue; that answer is cached too.
    ///
    /// # Errors
    ///
    /// - [`ResyError::MissingCredentials`] when not configured.
    /// - A transport error only when the request fails and no cached lookup
    ///   (of any age) exists for this name and location.
    pub async fn search_venue(
        &self,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<Option<String>, ResyError> {
        let cache_key = format!("venue_search_{name}_{lat}_{lng}");
        if let Some(cached) = self
            .cache
            .get::<VenueMatch>(&cache_key, Duration::from_secs(self.ttls.details_secs))
        {
            return Ok(cached.venue_id);
        }

        // The find endpoint requires a day even for identity lookups; the
        // placeholder date does not constrain the match.
        let params = [
            ("lat", lat.to_string()),
            ("long", lng.to_string()),
            ("day", "2026-01-01".to_string()),
            ("party_size", "2".to_string()),
        ];
        let body = match self.get_text("/4/find", &params).await {
            Ok(text) => text,
            Err(err) => {
                if let Some(stale) = self.cache.get_stale::<VenueMatch>(&cache_key) {
                    tracing::warn!(name, error = %err, "venue search failed — serving stale cache");
                    return Ok(stale.venue_id);
                }
                return Err(err);
            }
        };

        let parsed: FindResponse =
            serde_json::from_str(&body).map_err(|e| ResyError::Deserialize {
                context: format!("find(venue_search={name})"),
                source: e,
            })?;

        let name_lower = name.to_lowercase();
        for entry in parsed.results.venues {
            let venue_name = entry.venue.name.to_lowercase();
            if venue_name.is_empty() {
                continue;
            }
            if venue_name.contains(&name_lower) || name_lower.contains(&venue_name) {
                let venue_id = stringify_id(entry.venue.id.as_ref());
                self.cache.set(
                    &cache_key,
                    &VenueMatch {
                        venue_id: Some(venue_id.clone()),
                        name: entry.venue.name,
                    },
                );
                return Ok(Some(venue_id));
            }
        }

        self.cache.set(
            &cache_key,
            &VenueMatch {
                venue_id: None,
                name: String::new(),
            },
        );
        Ok(None)
    }

    /// Lists bookable slots for a venue on a date. An empty list means the
    /// venue has no availability, which is a valid cached answer.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`ResyClient::search_venue`].
    pub async fn get_availability(
        &self,
        venue_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Vec<Slot>, ResyError> {
        let cache_key = format!("avail_{venue_id}_{date}_{party_size}");
        if let Some(cached) = self
            .cache
            .get::<Vec<Slot>>(&cache_key, Duration::from_secs(self.ttls.availability_secs))
        {
            return Ok(cached);
        }

        let params = [
            ("venue_id", venue_id.to_string()),
            ("day", date.to_string()),
            ("party_size", party_size.to_string()),
        ];
        let body = match self.get_text("/4/find", &params).await {
            Ok(text) => text,
            Err(err) => {
                if let Some(stale) = self.cache.get_stale::<Vec<Slot>>(&cache_key) {
                    tracing::warn!(venue_id, date, error = %err, "availability lookup failed — serving stale cache");
                    return Ok(stale);
                }
                return Err(err);
            }
        };

        let parsed: FindResponse =
            serde_json::from_str(&body).map_err(|e| ResyError::Deserialize {
                context: format!("find(venue_id={venue_id}, day={date})"),
                source: e,
            })?;

        let slots: Vec<Slot> = parsed
            .results
            .venues
            .into_iter()
            .flat_map(|entry| entry.slots)
            .map(slot_from_entry)
            .collect();
        self.cache.set(&cache_key, &slots);
        Ok(slots)
    }

    /// Obtains the short-lived book token for one slot configuration, the
    /// first half of the booking handshake. Returns `Ok(None)` when the
    /// platform answers without a token (the slot is gone). Never cached.
    ///
    /// # Errors
    ///
    /// Fails on any transport or decode error; bookings never fall back to
    /// cached state.
    pub async fn get_booking_details(
        &self,
        config_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Option<String>, ResyError> {
        let body = serde_json::json!({
            "config_id": config_id,
            "day": date,
            "party_size": party_size,
        });
        let text = self.post_text("/3/details", &body).await?;
        let parsed: DetailsResponse =
            serde_json::from_str(&text).map_err(|e| ResyError::Deserialize {
                context: format!("details(config_id={config_id})"),
                source: e,
            })?;
        let token = parsed.book_token.value;
        Ok(if token.is_empty() { None } else { Some(token) })
    }

    /// Submits a book token, the second half of the handshake.
    ///
    /// # Errors
    ///
    /// Fails on any transport or decode error.
    pub async fn confirm_booking(
        &self,
        book_token: &str,
    ) -> Result<BookingConfirmation, ResyError> {
        let body = serde_json::json!({ "book_token": book_token });
        let text = self.post_text("/3/book", &body).await?;
        let parsed: BookResponse =
            serde_json::from_str(&text).map_err(|e| ResyError::Deserialize {
                context: "book".to_string(),
                source: e,
            })?;
        Ok(BookingConfirmation {
            resy_token: parsed.resy_token,
            reservation_id: stringify_id(parsed.reservation_id.as_ref()),
        })
    }

    /// Cancels a reservation by its platform reference.
    ///
    /// # Errors
    ///
    /// Fails on any transport error; the caller decides what a remote
    /// cancel failure means for the local record.
    pub async fn cancel_booking(&self, platform_ref: &str) -> Result<(), ResyError> {
        let body = serde_json::json!({ "resy_token": platform_ref });
        self.post_text("/3/cancel", &body).await?;
        Ok(())
    }

    /// Fetches the authenticated user profile. Used as the connectivity
    /// probe for status reporting.
    ///
    /// # Errors
    ///
    /// Fails on any transport or decode error.
    pub async fn get_user_info(&self) -> Result<ResyUser, ResyError> {
        let text = self.get_text("/2/user", &[]).await?;
        let parsed: UserResponse =
            serde_json::from_str(&text).map_err(|e| ResyError::Deserialize {
                context: "user".to_string(),
                source: e,
            })?;
        Ok(ResyUser {
            id: stringify_id(parsed.id.as_ref()),
            first_name: parsed.first_name,
            last_name: parsed.last_name,
            email: parsed.email_address,
            phone: parsed.mobile_number,
        })
    }

    async fn get_text(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, ResyError> {
        let (api_key, auth_token) = self.credentials()?;
        let url = format!("{}{endpoint}", self.base_url);
        let authorization = format!("ResyAPI api_key=\"{api_key}\"");
        self.limiter.acquire().await;
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Authorization", authorization)
            .header("X-Resy-Auth-Token", auth_token)
            .send()
            .await?;
        Self::require_success(response, &url).await
    }

    async fn post_text(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<String, ResyError> {
        let (api_key, auth_token) = self.credentials()?;
        let url = format!("{}{endpoint}", self.base_url);
        let authorization = format!("ResyAPI api_key=\"{api_key}\"");
        self.limiter.acquire().await;
        let response = self
            .client
            .post(&url)
            .json(body)
            .header("Authorization", authorization)
            .header("X-Resy-Auth-Token", auth_token)
            .send()
            .await?;
        Self::require_success(response, &url).await
    }

    async fn require_success(
        response: reqwest::Response,
        url: &str,
    ) -> Result<String, ResyError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            Err(ResyError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

impl ReservationApi for ResyClient {
    fn has_credentials(&self) -> bool {
        self.has_credentials_configured()
    }

    async fn search_venue(
        &self,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<Option<String>, CapabilityError> {
        Self::search_venue(self, name, lat, lng)
            .await
            .map_err(to_capability)
    }

    async fn list_slots(
        &self,
        venue_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Vec<Slot>, CapabilityError> {
        self.get_availability(venue_id, date, party_size)
            .await
            .map_err(to_capability)
    }

    async fn confirm_token(
        &self,
        config_id: &str,
        date: &str,
        party_size: u32,
    ) -> Result<Option<String>, CapabilityError> {
        self.get_booking_details(config_id, date, party_size)
            .await
            .map_err(to_capability)
    }

    async fn submit_confirm(&self, book_token: &str) -> Result<String, CapabilityError> {
        let confirmation = self
            .confirm_booking(book_token)
            .await
            .map_err(to_capability)?;
        Ok(confirmation.reservation_id)
    }

    async fn cancel_reservation(&self, platform_ref: &str) -> Result<(), CapabilityError> {
        self.cancel_booking(platform_ref)
            .await
            .map_err(to_capability)
    }
}

fn to_capability(err: ResyError) -> CapabilityError {
    match err {
        ResyError::Http(_) | ResyError::UnexpectedStatus { .. } => {
            CapabilityError::Transport(err.to_string())
        }
        ResyError::MissingCredentials | ResyError::Deserialize { .. } => {
            CapabilityError::Platform(err.to_string())
        }
    }
}
