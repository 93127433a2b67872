//! Discovery command handlers: search, details, and suggestions.

use tablescout_core::{AppConfig, PlaceDirectory, PlaceQuery, Platform};
use tablescout_engine::{resolve_platform, search, SearchParams, SortKey};
use tablescout_places::PlacesClient;
use tablescout_resy::ResyClient;

use crate::format::{format_price_level, format_rating, section_header, truncate_output};

fn platform_badge(platform: Platform) -> &'static str {
    match platform {
        Platform::Resy => "RESY",
        Platform::Opentable => "OpenTable",
        Platform::Quandoo => "Quandoo",
        Platform::GoogleReserve => "Google Reserve",
        Platform::PhoneOnly => "Phone",
    }
}

fn require_google_key(config: &AppConfig) -> anyhow::Result<()> {
    if config.has_google_key() {
        Ok(())
    } else {
        anyhow::bail!(
            "Google Places API key is not configured. Set TABLESCOUT_GOOGLE_API_KEY."
        )
    }
}

pub(crate) async fn run_search(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    params: &SearchParams,
) -> anyhow::Result<()> {
    require_google_key(config)?;

    let results = search(places, Some(resy), params).await?;
    if results.is_empty() {
        println!("No restaurants found matching your search.");
        return Ok(());
    }

    let mut lines = vec![
        section_header(&format!("Restaurant Search ({} results)", results.len())),
        String::new(),
    ];
    for (i, candidate) in results.iter().enumerate() {
        let place = &candidate.place;
        lines.push(format!("{}. {}", i + 1, place.name));
        lines.push(format!(
            "   {} | {} | {:.1}km | {}",
            format_rating(place.rating, place.review_count),
            format_price_level(place.price_level.as_deref()),
            candidate.distance_km,
            platform_badge(candidate.platform)
        ));
        if !place.address.is_empty() {
            lines.push(format!("   {}", place.address));
        }
        if !candidate.available_times.is_empty() {
            let shown: Vec<&str> = candidate
                .available_times
                .iter()
                .map(String::as_str)
                .take(6)
                .collect();
            lines.push(format!("   Available: {}", shown.join(", ")));
        }
        lines.push(format!("   ID: {}", place.place_id));
        lines.push(String::new());
    }

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

pub(crate) async fn run_details(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    place_id: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    require_google_key(config)?;

    let place_id = match (place_id, name) {
        (Some(id), _) => id.to_string(),
        (None, Some(name)) => {
            let query = PlaceQuery {
                query: name.to_string(),
                lat: config.default_lat,
                lng: config.default_lng,
                radius_m: config.default_radius_m,
                price_levels: None,
                min_rating: None,
                max_results: 1,
            };
            let hits = places.search_places(&query).await?;
            match hits.into_iter().next() {
                Some(hit) => hit.place_id,
                None => anyhow::bail!("Restaurant not found: {name}"),
            }
        }
        (None, None) => anyhow::bail!("Provide --place-id or --name."),
    };

    let Some(place) = places.get_details(&place_id).await? else {
        anyhow::bail!("Restaurant not found: {place_id}");
    };

    let info = resolve_platform(
        &place.name,
        place.lat.unwrap_or(config.default_lat),
        place.lng.unwrap_or(config.default_lng),
        place.website.as_deref(),
        Some(resy),
    )
    .await;

    let mut lines = vec![section_header(&place.name), String::new()];
    lines.push(format!(
        "Rating: {}",
        format_rating(place.rating, place.review_count)
    ));
    lines.push(format!(
        "Price: {}",
        format_price_level(place.price_level.as_deref())
    ));
    if let Some(summary) = &place.editorial_summary {
        lines.push(format!("Summary: {summary}"));
    }
    if !place.address.is_empty() {
        lines.push(format!("Address: {}", place.address));
    }
    if let Some(phone) = &place.phone {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(website) = &place.website {
        lines.push(format!("Website: {website}"));
    }
    if !place.maps_url.is_empty() {
        lines.push(format!("Maps: {}", place.maps_url));
    }

    let booking_label = match info.platform {
        Platform::Resy => "Resy (automated booking)",
        Platform::Opentable => "OpenTable (deep link)",
        Platform::Quandoo => "Quandoo (deep link)",
        Platform::GoogleReserve => "Google Reserve",
        Platform::PhoneOnly => "Phone/walk-in",
    };
    lines.push(format!("Booking: {booking_label}"));

    if let Some(open_now) = place.open_now {
        lines.push(format!(
            "Open now: {}",
            if open_now { "Yes" } else { "No" }
        ));
    }

    if !place.reviews.is_empty() {
        lines.push(String::new());
        lines.push(section_header("Recent Reviews"));
        for review in place.reviews.iter().take(3) {
            let rating = review
                .rating
                .map_or_else(|| "?".to_string(), |r| format!("{r:.0}"));
            let text: String = review.text.chars().take(120).collect();
            lines.push(format!("  {} ({rating}/5): {text}", review.author));
        }
    }

    lines.push(String::new());
    lines.push(format!("Place ID: {}", place.place_id));

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

pub(crate) async fn run_suggest(
    config: &AppConfig,
    pool: &sqlx::SqlitePool,
    places: &PlacesClient,
    resy: &ResyClient,
    cuisine: Option<&str>,
    occasion: Option<&str>,
) -> anyhow::Result<()> {
    let mut lines = vec![section_header("Restaurant Suggestions"), String::new()];

    let top = tablescout_db::get_top_restaurants(pool, 5).await?;
    if !top.is_empty() {
        lines.push("Your favourites:".to_string());
        for visit in &top {
            let rating = visit
                .avg_rating
                .map_or_else(String::new, |avg| format!(" ({avg:.1}/5)"));
            lines.push(format!(
                "  {}{rating} — visited {}x",
                visit.restaurant_name, visit.visit_count
            ));
        }
        lines.push(String::new());
    }

    if config.has_google_key() {
        let base = cuisine.unwrap_or("popular restaurant");
        let query = match occasion {
            Some(occasion) => format!("{occasion} {base}"),
            None => base.to_string(),
        };
        let params = SearchParams {
            query,
            lat: config.default_lat,
            lng: config.default_lng,
            radius_m: config.default_radius_m,
            date: None,
            time: None,
            party_size: config.default_party_size,
            price_range: None,
            min_rating: Some(4.0),
            sort_by: SortKey::Rating,
            max_results: 5,
        };
        match search(places, Some(resy), &params).await {
            Ok(results) if !results.is_empty() => {
                lines.push("Suggestions:".to_string());
                for (i, candidate) in results.iter().enumerate() {
                    lines.push(format!(
                        "  {}. {} — {}",
                        i + 1,
                        candidate.place.name,
                        format_rating(candidate.place.rating, candidate.place.review_count)
                    ));
                    if !candidate.place.address.is_empty() {
                        lines.push(format!("     {}", candidate.place.address));
                    }
                    lines.push(format!("     ID: {}", candidate.place.place_id));
                }
                lines.push(String::new());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "suggestion search failed");
            }
        }
    }

    if top.is_empty() && lines.len() == 2 {
        lines.push("No suggestions available. Search for restaurants first!".to_string());
    }

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}
