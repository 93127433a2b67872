//! HTTP client for the Google Places API (New).

use std::time::Duration;

use reqwest::Client;
use tablescout_core::app_config::CacheTtls;
use tablescout_core::capabilities::{CapabilityError, PlaceDirectory, PlaceQuery};
use tablescout_core::types::PlaceRecord;
use tablescout_core::{AppConfig, FileCache, RateLimiter};

use crate::error::PlacesError;
use crate::types::{normalize_place, Place, SearchResponse};

// Field masks control response size and billing tier; the details mask adds
// reviews, location, and the editorial summary.
const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.rating,places.userRatingCount,places.priceLevel,places.googleMapsUri,\
places.websiteUri,places.internationalPhoneNumber,places.currentOpeningHours,\
places.primaryType,places.location";

const DETAILS_FIELD_MASK: &str = "id,displayName,formattedAddress,rating,userRatingCount,\
priceLevel,googleMapsUri,websiteUri,internationalPhoneNumber,currentOpeningHours,\
primaryType,reviews,location,editorialSummary,shortFormattedAddress";

/// Client for the Places API (New) with on-disk caching and rate limiting.
///
/// Construct via [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    cache: FileCache,
    limiter: RateLimiter,
    ttls: CacheTtls,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, PlacesError> {
        let base_url = config.places_base_url.clone();
        Self::with_base_url(config, &base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tablescout/0.1 (restaurant-bookings)")
            .build()?;

        Ok(Self {
            client,
            api_key: config.google_api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: FileCache::new(&config.cache_dir(), "google_places"),
            limiter: RateLimiter::new(
                config.google_rate_limit_calls,
                Duration::from_secs(config.google_rate_limit_period_secs),
            ),
            ttls: config.cache_ttls,
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, PlacesError> {
        self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)
    }

    /// Searches for restaurants via Places Text Search with a location-bias
    /// circle. Results are cached; the `min_rating` filter is applied after
    /// the cache so the cached entry stays filter-independent.
    ///
    /// On transport failure the last cached value is returned regardless of
    /// its age; only when no cached value exists does the error surface.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::MissingApiKey`] if no key is configured.
    /// - [`PlacesError::Http`] / [`PlacesError::UnexpectedStatus`] on a
    ///   transport failure with no cached fallback.
    /// - [`PlacesError::Deserialize`] if the response body does not parse.
    pub async fn search_restaurants(
        &self,
        query: &PlaceQuery,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let cache_key = format!(
            "search_{}_{}_{}_{}_{:?}_{}",
            query.query, query.lat, query.lng, query.radius_m, query.price_levels, query.max_results
        );
        if let Some(cached) = self
            .cache
            .get::<Vec<PlaceRecord>>(&cache_key, Duration::from_secs(self.ttls.search_secs))
        {
            return Ok(filter_min_rating(cached, query.min_rating));
        }

        let key = self.api_key()?.to_string();
        let mut body = serde_json::json!({
            "textQuery": query.query,
            "locationBias": {
                "circle": {
                    "center": { "latitude": query.lat, "longitude": query.lng },
                    "radius": f64::from(query.radius_m),
                }
            },
            "includedType": "restaurant",
            "maxResultCount": query.max_results,
            "languageCode": "en",
        });
        if let Some(levels) = &query.price_levels {
            body["priceLevels"] = serde_json::json!(levels);
        }

        let url = format!("{}/places:searchText", self.base_url);
        self.limiter.acquire().await;
        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &key)
            .header("X-Goog-FieldMask", SEARCH_FIELD_MASK)
            .json(&body)
            .send()
            .await;

        let body = match self.read_ok_body(response, &url, &cache_key).await? {
            FetchOutcome::Fresh(text) => text,
            FetchOutcome::Stale(value) => {
                let records: Vec<PlaceRecord> =
                    serde_json::from_value(value).unwrap_or_default();
                return Ok(filter_min_rating(records, query.min_rating));
            }
        };

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: format!("searchText(query={})", query.query),
                source: e,
            })?;
        let records: Vec<PlaceRecord> = parsed.places.into_iter().map(normalize_place).collect();
        self.cache.set(&cache_key, &records);
        Ok(filter_min_rating(records, query.min_rating))
    }

    /// Fetches full details for one place, including up to five reviews.
    /// Returns `Ok(None)` if the place id is unknown (HTTP 404).
    ///
    /// # Errors
    ///
    /// Same failure surface as [`PlacesClient::search_restaurants`].
    pub async fn get_details(&self, place_id: &str) -> Result<Option<PlaceRecord>, PlacesError> {
        let cache_key = format!("details_{place_id}");
        if let Some(cached) = self
            .cache
            .get::<PlaceRecord>(&cache_key, Duration::from_secs(self.ttls.details_secs))
        {
            return Ok(Some(cached));
        }

        let key = self.api_key()?.to_string();
        let url = format!("{}/places/{place_id}", self.base_url);
        self.limiter.acquire().await;
        let response = self
            .client
            .get(&url)
            .header("X-Goog-Api-Key", &key)
            .header("X-Goog-FieldMask", DETAILS_FIELD_MASK)
            .send()
            .await;

        if let Ok(resp) = &response {
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
        }

        let body = match self.read_ok_body(response, &url, &cache_key).await? {
            FetchOutcome::Fresh(text) => text,
            FetchOutcome::Stale(value) => {
                return Ok(serde_json::from_value(value).ok());
            }
        };

        let place: Place = serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: format!("placeDetails(id={place_id})"),
            source: e,
        })?;
        let record = normalize_place(place);
        self.cache.set(&cache_key, &record);
        Ok(Some(record))
    }

    /// Probes connectivity with a minimal one-result search.
    ///
    /// # Errors
    ///
    /// Returns the same failure surface as a search, without cache fallback.
    pub async fn test_connection(&self) -> Result<(), PlacesError> {
        let key = self.api_key()?.to_string();
        let url = format!("{}/places:searchText", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &key)
            .header("X-Goog-FieldMask", "places.id")
            .json(&serde_json::json!({ "textQuery": "restaurant Sydney", "maxResultCount": 1 }))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            })
        }
    }

    /// Resolves a response into its body text, falling back to the stale
    /// cache entry on any transport failure.
    async fn read_ok_body(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
        url: &str,
        cache_key: &str,
    ) -> Result<FetchOutcome, PlacesError> {
        let err = match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return Ok(FetchOutcome::Fresh(resp.text().await?));
                }
                PlacesError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                }
            }
            Err(e) => PlacesError::Http(e),
        };

        if let Some(stale) = self.cache.get_stale::<serde_json::Value>(cache_key) {
            tracing::warn!(url, error = %err, "places request failed — serving stale cache");
            return Ok(FetchOutcome::Stale(stale));
        }
        Err(err)
    }
}

enum FetchOutcome {
    Fresh(String),
    Stale(serde_json::Value),
}

fn filter_min_rating(records: Vec<PlaceRecord>, min_rating: Option<f64>) -> Vec<PlaceRecord> {
    match min_rating {
        None => records,
        Some(min) => records
            .into_iter()
            .filter(|r| r.rating.is_some_and(|v| v >= min))
            .collect(),
    }
}

impl PlaceDirectory for PlacesClient {
    async fn search_places(&self, query: &PlaceQuery) -> Result<Vec<PlaceRecord>, CapabilityError> {
        self.search_restaurants(query).await.map_err(to_capability)
    }

    async fn place_details(
        &self,
        place_id: &str,
    ) -> Result<Option<PlaceRecord>, CapabilityError> {
        self.get_details(place_id).await.map_err(to_capability)
    }
}

fn to_capability(err: PlacesError) -> CapabilityError {
    match err {
        PlacesError::Http(_) | PlacesError::UnexpectedStatus { .. } => {
            CapabilityError::Transport(err.to_string())
        }
        PlacesError::MissingApiKey | PlacesError::Deserialize { .. } => {
            CapabilityError::Platform(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rating: Option<f64>) -> PlaceRecord {
        PlaceRecord {
            rating,
            ..PlaceRecord::default()
        }
    }

    #[test]
    fn min_rating_filter_drops_unrated_places() {
        let records = vec![record(Some(4.6)), record(None), record(Some(3.9))];
        let filtered = filter_min_rating(records, Some(4.0));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].rating, Some(4.6));
    }

    #[test]
    fn absent_min_rating_keeps_everything() {
        let records = vec![record(Some(4.6)), record(None)];
        assert_eq!(filter_min_rating(records, None).len(), 2);
    }
}
