//! Platform resolution and deep-link generation.
//!
//! Resolution walks a strict priority chain: OpenTable URL markers, then
//! Quandoo URL markers, then a Resy venue lookup, then the phone-only
//! floor. The first match wins; a failed Resy lookup falls through rather
//! than surfacing, since resolution must always produce an answer.

use regex::Regex;
use tablescout_core::capabilities::ReservationApi;
use tablescout_core::types::{Platform, PlatformInfo};

/// Resolves which booking platform applies to a restaurant.
///
/// `venue_lookup` is the optional Resy capability; pass `None` when no
/// credentials are configured. Lookup failures are logged and swallowed;
/// the chain falls through to phone-only instead.
pub async fn resolve_platform<R: ReservationApi>(
    name: &str,
    lat: f64,
    lng: f64,
    website_url: Option<&str>,
    venue_lookup: Option<&R>,
) -> PlatformInfo {
    if let Some(url) = website_url {
        let url_lower = url.to_lowercase();

        if url_lower.contains("opentable") {
            let rid = extract_opentable_rid(url);
            let confidence = if rid.is_some() { 0.9 } else { 0.7 };
            return PlatformInfo {
                platform: Platform::Opentable,
                platform_id: rid,
                confidence,
            };
        }

        if url_lower.contains("quandoo") {
            let slug = extract_quandoo_slug(url);
            let confidence = if slug.is_some() { 0.9 } else { 0.7 };
            return PlatformInfo {
                platform: Platform::Quandoo,
                platform_id: slug,
                confidence,
            };
        }
    }

    if let Some(api) = venue_lookup {
        if api.has_credentials() {
            match api.search_venue(name, lat, lng).await {
                Ok(Some(venue_id)) => {
                    return PlatformInfo {
                        platform: Platform::Resy,
                        platform_id: Some(venue_id),
                        confidence: 0.8,
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(name, error = %e, "venue lookup failed during resolution");
                }
            }
        }
    }

    PlatformInfo::phone_only()
}

/// Builds a booking deep link, or `None` where no link applies.
///
/// Resy bookings go through the API and never get a link; phone-only has
/// nothing to link to. The link platforms require a resolved platform id.
#[must_use]
pub fn deep_link(
    platform: Platform,
    platform_id: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
    party_size: u32,
) -> Option<String> {
    match (platform, platform_id) {
        (Platform::Opentable, Some(rid)) => Some(opentable_link(rid, date, time, party_size)),
        (Platform::Quandoo, Some(slug)) => Some(quandoo_link(slug, date, time, party_size)),
        (
            Platform::Resy
            | Platform::GoogleReserve
            | Platform::PhoneOnly
            | Platform::Opentable
            | Platform::Quandoo,
            _,
        ) => None,
    }
}

fn extract_opentable_rid(url: &str) -> Option<String> {
    // Query form: ?rid=12345. Path form: opentable.com.au/r/name-city.
    let rid_re = Regex::new(r"rid[=:](\d+)").expect("valid rid regex");
    if let Some(caps) = rid_re.captures(url) {
        return Some(caps[1].to_string());
    }
    let path_re =
        Regex::new(r"opentable\.com(?:\.\w+)?/r/([\w-]+)").expect("valid opentable path regex");
    path_re.captures(url).map(|caps| caps[1].to_string())
}

fn extract_quandoo_slug(url: &str) -> Option<String> {
    let re = Regex::new(r"quandoo\.com(?:\.\w+)?/place/([\w-]+)").expect("valid quandoo regex");
    re.captures(url).map(|caps| caps[1].to_string())
}

fn opentable_link(rid: &str, date: Option<&str>, time: Option<&str>, party_size: u32) -> String {
    let mut link =
        format!("https://www.opentable.com.au/restref/client/?rid={rid}&covers={party_size}");
    // A partial datetime would be malformed; append only when both halves
    // are present.
    if let (Some(date), Some(time)) = (date, time) {
        link.push_str(&format!("&datetime={date}T{time}"));
    }
    link
}

fn quandoo_link(slug: &str, date: Option<&str>, time: Option<&str>, party_size: u32) -> String {
    let mut link = format!("https://www.quandoo.com.au/place/{slug}");
    let mut params = Vec::new();
    if let Some(date) = date {
        params.push(format!("date={date}"));
    }
    if let Some(time) = time {
        params.push(format!("time={time}"));
    }
    if party_size > 0 {
        params.push(format!("guests={party_size}"));
    }
    if !params.is_empty() {
        link.push('?');
        link.push_str(&params.join("&"));
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::capabilities::CapabilityError;
    use tablescout_core::types::Slot;

    /// Minimal reservation double for resolver tests.
    struct FakeResy {
        venue: Result<Option<String>, CapabilityError>,
        credentialed: bool,
    }

    impl ReservationApi for FakeResy {
        fn has_credentials(&self) -> bool {
            self.credentialed
        }

        async fn search_venue(
            &self,
            _name: &str,
            _lat: f64,
            _lng: f64,
        ) -> Result<Option<String>, CapabilityError> {
            self.venue.clone()
        }

        async fn list_slots(
            &self,
            _venue_id: &str,
            _date: &str,
            _party_size: u32,
        ) -> Result<Vec<Slot>, CapabilityError> {
            Ok(Vec::new())
        }

        async fn confirm_token(
            &self,
            _config_id: &str,
            _date: &str,
            _party_size: u32,
        ) -> Result<Option<String>, CapabilityError> {
            Ok(None)
        }

        async fn submit_confirm(&self, _book_token: &str) -> Result<String, CapabilityError> {
            Err(CapabilityError::Platform("not implemented".to_string()))
        }

        async fn cancel_reservation(&self, _platform_ref: &str) -> Result<(), CapabilityError> {
            Ok(())
        }
    }

    const NO_LOOKUP: Option<&FakeResy> = None;

    #[tokio::test]
    async fn opentable_path_slug_resolves_at_high_confidence() {
        let info = resolve_platform(
            "Bistro X",
            -33.8,
            151.2,
            Some("https://opentable.com.au/r/bistro-x"),
            NO_LOOKUP,
        )
        .await;
        assert_eq!(info.platform, Platform::Opentable);
        assert_eq!(info.platform_id.as_deref(), Some("bistro-x"));
        assert!((info.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn opentable_rid_parameter_resolves() {
        let info = resolve_platform(
            "Bistro X",
            -33.8,
            151.2,
            Some("https://www.opentable.com/restref/client/?rid=12345"),
            NO_LOOKUP,
        )
        .await;
        assert_eq!(info.platform, Platform::Opentable);
        assert_eq!(info.platform_id.as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn opentable_marker_without_id_drops_confidence() {
        let info = resolve_platform(
            "Bistro X",
            -33.8,
            151.2,
            Some("https://www.opentable.com.au/"),
            NO_LOOKUP,
        )
        .await;
        assert_eq!(info.platform, Platform::Opentable);
        assert!(info.platform_id.is_none());
        assert!((info.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn quandoo_place_slug_resolves() {
        let info = resolve_platform(
            "Noodle Bar",
            -33.8,
            151.2,
            Some("https://www.quandoo.com.au/place/noodle-bar-1234"),
            NO_LOOKUP,
        )
        .await;
        assert_eq!(info.platform, Platform::Quandoo);
        assert_eq!(info.platform_id.as_deref(), Some("noodle-bar-1234"));
        assert!((info.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn url_markers_win_over_resy_lookup() {
        let resy = FakeResy {
            venue: Ok(Some("101".to_string())),
            credentialed: true,
        };
        let info = resolve_platform(
            "Bistro X",
            -33.8,
            151.2,
            Some("https://opentable.com.au/r/bistro-x"),
            Some(&resy),
        )
        .await;
        assert_eq!(info.platform, Platform::Opentable);
    }

    #[tokio::test]
    async fn resy_lookup_resolves_when_no_url_marker() {
        let resy = FakeResy {
            venue: Ok(Some("101".to_string())),
            credentialed: true,
        };
        let info = resolve_platform(
            "Quay",
            -33.8,
            151.2,
            Some("https://www.quay.com.au"),
            Some(&resy),
        )
        .await;
        assert_eq!(info.platform, Platform::Resy);
        assert_eq!(info.platform_id.as_deref(), Some("101"));
        assert!((info.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn failed_resy_lookup_falls_through_to_phone_only() {
        let resy = FakeResy {
            venue: Err(CapabilityError::Transport("connection refused".to_string())),
            credentialed: true,
        };
        let info = resolve_platform("Quay", -33.8, 151.2, None, Some(&resy)).await;
        assert_eq!(info, PlatformInfo::phone_only());
    }

    #[tokio::test]
    async fn uncredentialed_lookup_is_never_invoked() {
        let resy = FakeResy {
            venue: Ok(Some("101".to_string())),
            credentialed: false,
        };
        let info = resolve_platform("Quay", -33.8, 151.2, None, Some(&resy)).await;
        assert_eq!(info, PlatformInfo::phone_only());
    }

    #[test]
    fn opentable_link_includes_datetime_only_when_complete() {
        let full = deep_link(
            Platform::Opentable,
            Some("12345"),
            Some("2026-09-01"),
            Some("19:00"),
            2,
        );
        assert_eq!(
            full.as_deref(),
            Some("https://www.opentable.com.au/restref/client/?rid=12345&covers=2&datetime=2026-09-01T19:00")
        );

        let date_only = deep_link(Platform::Opentable, Some("12345"), Some("2026-09-01"), None, 2);
        assert_eq!(
            date_only.as_deref(),
            Some("https://www.opentable.com.au/restref/client/?rid=12345&covers=2")
        );
    }

    #[test]
    fn quandoo_link_appends_each_parameter_independently() {
        let full = deep_link(
            Platform::Quandoo,
            Some("noodle-bar-1234"),
            Some("2026-09-01"),
            Some("19:00"),
            4,
        );
        assert_eq!(
            full.as_deref(),
            Some("https://www.quandoo.com.au/place/noodle-bar-1234?date=2026-09-01&time=19:00&guests=4")
        );

        let time_only = deep_link(Platform::Quandoo, Some("noodle-bar-1234"), None, Some("19:00"), 4);
        assert_eq!(
            time_only.as_deref(),
            Some("https://www.quandoo.com.au/place/noodle-bar-1234?time=19:00&guests=4")
        );
    }

    #[test]
    fn api_and_phone_platforms_never_link() {
        assert!(deep_link(Platform::Resy, Some("101"), None, None, 2).is_none());
        assert!(deep_link(Platform::PhoneOnly, None, None, None, 2).is_none());
        assert!(deep_link(Platform::GoogleReserve, Some("x"), None, None, 2).is_none());
        // Link platforms without an id degrade to none as well.
        assert!(deep_link(Platform::Opentable, None, None, None, 2).is_none());
        assert!(deep_link(Platform::Quandoo, None, None, None, 2).is_none());
    }

    #[test]
    fn deep_link_is_deterministic() {
        let a = deep_link(Platform::Opentable, Some("1"), Some("2026-09-01"), Some("19:00"), 2);
        let b = deep_link(Platform::Opentable, Some("1"), Some("2026-09-01"), Some("19:00"), 2);
        assert_eq!(a, b);
    }
}
