//! Search orchestration: place directory query, per-candidate platform
//! resolution, and composite ranking.

use tablescout_core::capabilities::{
    CapabilityError, PlaceDirectory, PlaceQuery, ReservationApi,
};
use tablescout_core::types::{PlaceRecord, Platform};

use crate::platform::resolve_platform;

/// Platform resolution is the expensive part of a search; only this many
/// leading candidates get resolved.
const RESOLVE_LIMIT: usize = 8;

/// Parameters for a ranked restaurant search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    pub date: Option<String>,
    pub time: Option<String>,
    pub party_size: u32,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    pub sort_by: SortKey,
    pub max_results: u32,
}

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Descending composite score (the default).
    #[default]
    Rating,
    /// Ascending distance from the search origin.
    Distance,
    /// Descending booking ease.
    BookingEase,
}

impl SortKey {
    /// Parses a user-supplied sort key; anything unrecognized falls back
    /// to the composite-score default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "distance" => SortKey::Distance,
            "booking_ease" => SortKey::BookingEase,
            _ => SortKey::Rating,
        }
    }
}

/// One search result with its resolved platform and rank inputs.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub place: PlaceRecord,
    pub platform: Platform,
    pub platform_id: Option<String>,
    pub platform_confidence: f64,
    pub available_times: Vec<String>,
    pub distance_km: f64,
    pub booking_ease: f64,
    pub score: f64,
}

/// Searches the place directory and resolves each leading candidate's
/// booking platform, returning a ranked list.
///
/// Candidates are processed in the directory's order and reassembled in
/// that order before ranking, since the composite score normalizes review
/// volume across the whole batch. Availability lookups for Resy matches
/// are best-effort; their failures never fail the search.
///
/// # Errors
///
/// Returns the directory's [`CapabilityError`] if the underlying place
/// search fails with no cached fallback.
pub async fn search<R, D>(
    directory: &D,
    reservations: Option<&R>,
    params: &SearchParams,
) -> Result<Vec<RankedCandidate>, CapabilityError>
where
    R: ReservationApi,
    D: PlaceDirectory,
{
    let query = PlaceQuery {
        query: params.query.clone(),
        lat: params.lat,
        lng: params.lng,
        radius_m: params.radius_m,
        price_levels: map_price_range(params.price_range.as_deref()),
        min_rating: params.min_rating,
        max_results: params.max_results,
    };
    let places = directory.search_places(&query).await?;
    if places.is_empty() {
        return Ok(Vec::new());
    }

    let lookup = reservations.filter(|api| api.has_credentials());
    let mut candidates = Vec::with_capacity(places.len().min(RESOLVE_LIMIT));

    for place in places.into_iter().take(RESOLVE_LIMIT) {
        let place_lat = place.lat.unwrap_or(params.lat);
        let place_lng = place.lng.unwrap_or(params.lng);

        let info = resolve_platform(
            &place.name,
            place_lat,
            place_lng,
            place.website.as_deref(),
            lookup,
        )
        .await;

        let mut available_times = Vec::new();
        if info.platform == Platform::Resy {
            if let (Some(venue_id), Some(date), Some(api)) =
                (&info.platform_id, params.date.as_deref(), lookup)
            {
                match api.list_slots(venue_id, date, params.party_size).await {
                    Ok(slots) => {
                        available_times = slots
                            .into_iter()
                            .map(|s| s.time)
                            .filter(|t| !t.is_empty())
                            .collect();
                    }
                    Err(e) => {
                        tracing::debug!(venue_id, error = %e, "availability probe failed during search");
                    }
                }
            }
        }

        let distance_km = haversine_km(params.lat, params.lng, place_lat, place_lng);
        candidates.push(RankedCandidate {
            booking_ease: info.platform.booking_ease(),
            platform: info.platform,
            platform_id: info.platform_id,
            platform_confidence: info.confidence,
            available_times,
            distance_km: (distance_km * 10.0).round() / 10.0,
            score: 0.0,
            place,
        });
    }

    rank_results(&mut candidates, params.sort_by);
    Ok(candidates)
}

/// Computes composite scores for the batch and sorts it by `sort_by`.
/// All sorts are stable; review volume is normalized against the batch
/// maximum, so scores are only comparable within one batch.
pub fn rank_results(candidates: &mut [RankedCandidate], sort_by: SortKey) {
    if candidates.is_empty() {
        return;
    }

    let max_reviews = candidates
        .iter()
        .map(|c| c.place.review_count.unwrap_or(0))
        .max()
        .unwrap_or(0)
        .max(1);

    for candidate in candidates.iter_mut() {
        let rating = candidate.place.rating.unwrap_or(0.0);
        #[allow(clippy::cast_precision_loss)]
        let reviews_norm =
            candidate.place.review_count.unwrap_or(0) as f64 / max_reviews as f64;
        let proximity = (1.0 - candidate.distance_km / 10.0).max(0.0);
        candidate.score = (rating / 5.0) * 0.4
            + reviews_norm * 0.2
            + proximity * 0.2
            + candidate.booking_ease * 0.2;
    }

    match sort_by {
        SortKey::Distance => {
            candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        }
        SortKey::BookingEase => {
            candidates.sort_by(|a, b| b.booking_ease.total_cmp(&a.booking_ease));
        }
        SortKey::Rating => {
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
    }
}

fn map_price_range(price_range: Option<&str>) -> Option<Vec<String>> {
    let level = match price_range?.to_lowercase().as_str() {
        "low" => "PRICE_LEVEL_INEXPENSIVE",
        "mid" => "PRICE_LEVEL_MODERATE",
        "high" => "PRICE_LEVEL_EXPENSIVE",
        "luxury" => "PRICE_LEVEL_VERY_EXPENSIVE",
        _ => return None,
    };
    Some(vec![level.to_string()])
}

fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        name: &str,
        rating: Option<f64>,
        reviews: Option<i64>,
        distance_km: f64,
        platform: Platform,
    ) -> RankedCandidate {
        RankedCandidate {
            place: PlaceRecord {
                name: name.to_string(),
                rating,
                review_count: reviews,
                ..PlaceRecord::default()
            },
            platform,
            platform_id: None,
            platform_confidence: 1.0,
            available_times: Vec::new(),
            distance_km,
            booking_ease: platform.booking_ease(),
            score: 0.0,
        }
    }

    #[test]
    fn composite_score_blends_all_four_signals() {
        let mut batch = vec![candidate("a", Some(4.0), Some(100), 2.0, Platform::Resy)];
        rank_results(&mut batch, SortKey::Rating);
        // rating 4/5*0.4 + reviews 1.0*0.2 + proximity 0.8*0.2 + ease 1.0*0.2
        let expected = 0.32 + 0.2 + 0.16 + 0.2;
        assert!((batch[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn score_is_monotone_in_each_signal() {
        let base = candidate("base", Some(4.0), Some(100), 2.0, Platform::Quandoo);
        let better_rating = candidate("r", Some(4.5), Some(100), 2.0, Platform::Quandoo);
        let closer = candidate("c", Some(4.0), Some(100), 1.0, Platform::Quandoo);
        let easier = candidate("e", Some(4.0), Some(100), 2.0, Platform::Resy);
        let mut batch = vec![base, better_rating, closer, easier];
        rank_results(&mut batch, SortKey::Rating);
        let score_of = |name: &str| {
            batch
                .iter()
                .find(|c| c.place.name == name)
                .map(|c| c.score)
                .unwrap()
        };
        assert!(score_of("r") > score_of("base"));
        assert!(score_of("c") > score_of("base"));
        assert!(score_of("e") > score_of("base"));
    }

    #[test]
    fn missing_signals_score_zero_not_panic() {
        let mut batch = vec![
            candidate("rated", Some(4.0), Some(10), 1.0, Platform::PhoneOnly),
            candidate("bare", None, None, 1.0, Platform::PhoneOnly),
        ];
        rank_results(&mut batch, SortKey::Rating);
        assert_eq!(batch[0].place.name, "rated");
        assert!(batch[1].score > 0.0); // proximity and ease still count
    }

    #[test]
    fn sorting_never_changes_the_member_set() {
        let names = ["a", "b", "c"];
        let mut batch: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                candidate(
                    n,
                    Some(3.0 + i as f64 * 0.5),
                    Some(50),
                    i as f64,
                    Platform::PhoneOnly,
                )
            })
            .collect();
        rank_results(&mut batch, SortKey::Distance);
        let mut sorted_names: Vec<&str> = batch.iter().map(|c| c.place.name.as_str()).collect();
        sorted_names.sort_unstable();
        assert_eq!(sorted_names, names);
    }

    #[test]
    fn distance_sort_is_ascending() {
        let mut batch = vec![
            candidate("far", Some(5.0), Some(999), 8.0, Platform::Resy),
            candidate("near", Some(3.0), Some(1), 0.5, Platform::PhoneOnly),
        ];
        rank_results(&mut batch, SortKey::Distance);
        assert_eq!(batch[0].place.name, "near");
    }

    #[test]
    fn booking_ease_sort_is_descending() {
        let mut batch = vec![
            candidate("phone", Some(5.0), Some(999), 0.1, Platform::PhoneOnly),
            candidate("resy", Some(3.0), Some(1), 9.0, Platform::Resy),
        ];
        rank_results(&mut batch, SortKey::BookingEase);
        assert_eq!(batch[0].place.name, "resy");
    }

    #[test]
    fn price_range_maps_to_directory_levels() {
        assert_eq!(
            map_price_range(Some("luxury")),
            Some(vec!["PRICE_LEVEL_VERY_EXPENSIVE".to_string()])
        );
        assert_eq!(
            map_price_range(Some("LOW")),
            Some(vec!["PRICE_LEVEL_INEXPENSIVE".to_string()])
        );
        assert_eq!(map_price_range(Some("bananas")), None);
        assert_eq!(map_price_range(None), None);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Sydney Opera House to Sydney Tower, roughly 1.4 km.
        let d = haversine_km(-33.8568, 151.2153, -33.8704, 151.2088);
        assert!((d - 1.4).abs() < 0.2, "got {d}");
    }

    #[test]
    fn sort_key_parse_defaults_to_rating() {
        assert_eq!(SortKey::parse("distance"), SortKey::Distance);
        assert_eq!(SortKey::parse("booking_ease"), SortKey::BookingEase);
        assert_eq!(SortKey::parse("rating"), SortKey::Rating);
        assert_eq!(SortKey::parse("whatever"), SortKey::Rating);
    }
}
