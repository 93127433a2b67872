//! Wire types for the Places API (New) and normalization into
//! [`PlaceRecord`].

use serde::Deserialize;
use tablescout_core::types::{PlaceRecord, PlaceReview};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub places: Vec<Place>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Place {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub short_formatted_address: String,
    pub rating: Option<f64>,
    pub user_rating_count: Option<i64>,
    pub price_level: Option<String>,
    #[serde(default)]
    pub google_maps_uri: String,
    pub website_uri: Option<String>,
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub primary_type: String,
    pub current_opening_hours: Option<OpeningHours>,
    pub location: Option<LatLng>,
    pub editorial_summary: Option<LocalizedText>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LocalizedText {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpeningHours {
    pub open_now: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Review {
    pub author_attribution: Option<AuthorAttribution>,
    pub rating: Option<f64>,
    pub text: Option<LocalizedText>,
    #[serde(default)]
    pub publish_time: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorAttribution {
    #[serde(default)]
    pub display_name: String,
}

/// Flattens a Places API place object into the shared [`PlaceRecord`].
/// At most five reviews are kept.
pub(crate) fn normalize_place(place: Place) -> PlaceRecord {
    let (lat, lng) = place
        .location
        .map_or((None, None), |l| (Some(l.latitude), Some(l.longitude)));

    PlaceRecord {
        place_id: place.id,
        name: place
            .display_name
            .map_or_else(|| "Unknown".to_string(), |d| d.text),
        address: place.formatted_address,
        short_address: place.short_formatted_address,
        rating: place.rating,
        review_count: place.user_rating_count,
        price_level: place.price_level,
        maps_url: place.google_maps_uri,
        website: place.website_uri,
        phone: place.international_phone_number,
        primary_type: place.primary_type,
        open_now: place.current_opening_hours.and_then(|h| h.open_now),
        lat,
        lng,
        editorial_summary: place.editorial_summary.map(|e| e.text),
        reviews: place
            .reviews
            .into_iter()
            .take(5)
            .map(|r| PlaceReview {
                author: r
                    .author_attribution
                    .map_or_else(String::new, |a| a.display_name),
                rating: r.rating,
                text: r.text.map_or_else(String::new, |t| t.text),
                published_at: r.publish_time,
            })
            .collect(),
    }
}
