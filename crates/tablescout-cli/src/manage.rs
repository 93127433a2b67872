//! Booking lifecycle command handlers: check, book, list, cancel, modify,
//! rate, the cron-driven reminders, and the status probe.

use chrono::Timelike;
use tablescout_core::{AppConfig, BookingRecord, BookingStatus};
use tablescout_db::{BookingFilter, Store};
use tablescout_engine::{BookingEngine, BookingResult, CancelResult, CheckOutcome, ModifyResult};
use tablescout_places::PlacesClient;
use tablescout_resy::ResyClient;

use crate::format::{parse_hhmm, section_header, truncate_output};

/// Minutes ahead within which the remind command reports a booking.
const REMIND_WINDOW_MINUTES: i32 = 240;

fn engine<'a>(
    config: &AppConfig,
    places: &'a PlacesClient,
    resy: &'a ResyClient,
    store: &'a Store,
) -> BookingEngine<'a, ResyClient, PlacesClient, Store> {
    BookingEngine::new(
        Some(resy),
        Some(places),
        store,
        config.default_lat,
        config.default_lng,
    )
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_check(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    store: &Store,
    place_id: &str,
    date: &str,
    time: &str,
    party_size: u32,
) -> anyhow::Result<()> {
    let outcome = engine(config, places, resy, store)
        .check_availability(place_id, date, time, party_size)
        .await;

    let lines = match outcome {
        CheckOutcome::Slots {
            restaurant_name,
            matched,
            message,
            ..
        } => {
            let mut lines = vec![
                section_header(&format!("Availability: {restaurant_name}")),
                String::new(),
                "Platform: resy".to_string(),
                format!("Available slots ({}):", matched.len()),
            ];
            for slot in matched.iter().take(8) {
                lines.push(format!("  {} ({})", slot.time, slot.seating_type));
            }
            lines.push(String::new());
            lines.push(message);
            lines
        }
        CheckOutcome::NoAvailability {
            restaurant_name,
            message,
        } => vec![
            section_header(&format!("Availability: {restaurant_name}")),
            String::new(),
            message,
        ],
        CheckOutcome::Fallback {
            restaurant_name,
            platform,
            deep_link,
            phone,
            message,
        } => {
            let mut lines = vec![
                section_header(&format!("Availability: {restaurant_name}")),
                String::new(),
                format!("Platform: {platform}"),
            ];
            if let Some(link) = deep_link {
                lines.push(format!("Check here: {link}"));
            } else if let Some(phone) = phone {
                lines.push(format!("Call: {phone}"));
            }
            lines.push(String::new());
            lines.push(message);
            lines
        }
        CheckOutcome::Failed { reason } => anyhow::bail!("Availability check failed: {reason}"),
    };

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_book(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    store: &Store,
    place_id: &str,
    date: &str,
    time: &str,
    party_size: u32,
    confirm: bool,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let result = engine(config, places, resy, store)
        .book(place_id, date, time, party_size, confirm, notes)
        .await;

    let lines = match result {
        BookingResult::Preview {
            restaurant_name,
            date,
            time,
            party_size,
            platform,
            deep_link,
            message,
            ..
        } => {
            let mut lines = vec![
                section_header("Booking Preview"),
                String::new(),
                format!("Restaurant: {restaurant_name}"),
                format!("Date: {date}"),
                format!("Time: {time}"),
                format!("Party size: {party_size}"),
                format!("Platform: {platform}"),
            ];
            if let Some(link) = deep_link {
                lines.push(format!("Book here: {link}"));
            }
            lines.push(String::new());
            lines.push("Add --confirm to book.".to_string());
            lines.push(String::new());
            lines.push(message);
            lines
        }
        BookingResult::Booked {
            booking_id,
            restaurant_name,
            date,
            time,
            party_size,
            platform_ref,
            message,
        } => vec![
            section_header("BOOKED"),
            String::new(),
            format!("Booking ID: {booking_id}"),
            format!("Restaurant: {restaurant_name}"),
            format!("Date: {date}"),
            format!("Time: {time}"),
            format!("Party size: {party_size}"),
            "Platform: resy".to_string(),
            format!("Confirmation: {platform_ref}"),
            String::new(),
            message,
        ],
        BookingResult::Recorded {
            booking_id,
            restaurant_name,
            date,
            time,
            party_size,
            platform,
            deep_link,
            message,
        } => {
            let mut lines = vec![
                section_header("BOOKING RECORDED"),
                String::new(),
                format!("Booking ID: {booking_id}"),
                format!("Restaurant: {restaurant_name}"),
                format!("Date: {date}"),
                format!("Time: {time}"),
                format!("Party size: {party_size}"),
                format!("Platform: {platform}"),
            ];
            if let Some(link) = deep_link {
                lines.push(format!("Complete booking: {link}"));
            }
            lines.push(String::new());
            lines.push(message);
            lines
        }
        BookingResult::Failed { reason } => anyhow::bail!("Booking failed: {reason}"),
    };

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

pub(crate) async fn run_bookings(
    config: &AppConfig,
    pool: &sqlx::SqlitePool,
    upcoming: bool,
    past: bool,
    status: Option<&str>,
) -> anyhow::Result<()> {
    let status = match status {
        Some(raw) => match BookingStatus::parse(raw) {
            Some(status) => Some(status),
            None => anyhow::bail!("Unknown status: {raw}"),
        },
        None => None,
    };

    let filter = BookingFilter {
        status,
        upcoming,
        past,
        limit: None,
    };
    let rows = tablescout_db::list_bookings(pool, &filter).await?;
    if rows.is_empty() {
        println!("No bookings found.");
        return Ok(());
    }

    let label = if upcoming {
        "Upcoming"
    } else if past {
        "Past"
    } else {
        "All"
    };
    let mut lines = vec![
        section_header(&format!("Bookings — {label} ({})", rows.len())),
        String::new(),
    ];
    for row in rows {
        let booking = row.into_record();
        lines.push(format!(
            "{}{}",
            booking.restaurant_name,
            status_badge(booking.status)
        ));
        lines.push(format!(
            "  {} at {} | {}p | {}",
            booking.date, booking.time, booking.party_size, booking.platform
        ));
        if let Some(notes) = &booking.notes {
            lines.push(format!("  Note: {notes}"));
        }
        lines.push(format!("  ID: {}", booking.booking_id));
        lines.push(String::new());
    }

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

fn status_badge(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "",
        BookingStatus::Cancelled => " [CANCELLED]",
        BookingStatus::Completed => " [COMPLETED]",
        BookingStatus::Modified => " [MODIFIED]",
    }
}

pub(crate) async fn run_cancel(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    store: &Store,
    booking_id: &str,
    confirm: bool,
) -> anyhow::Result<()> {
    let result = engine(config, places, resy, store)
        .cancel(booking_id, confirm)
        .await;

    let lines = match result {
        CancelResult::Preview {
            restaurant_name,
            date,
            time,
            party_size,
            ..
        } => vec![
            section_header("Cancel Preview"),
            String::new(),
            format!("Restaurant: {restaurant_name}"),
            format!("Date: {date}"),
            format!("Time: {time}"),
            format!("Party size: {party_size}"),
            String::new(),
            "Add --confirm to cancel.".to_string(),
        ],
        CancelResult::Cancelled { message, .. } => vec![message],
        CancelResult::Failed { reason } => anyhow::bail!("Cancel failed: {reason}"),
    };

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_modify(
    config: &AppConfig,
    places: &PlacesClient,
    resy: &ResyClient,
    store: &Store,
    booking_id: &str,
    date: Option<&str>,
    time: Option<&str>,
    party_size: Option<u32>,
    confirm: bool,
) -> anyhow::Result<()> {
    let result = engine(config, places, resy, store)
        .modify(booking_id, date, time, party_size, confirm)
        .await;

    let lines = match result {
        ModifyResult::Preview {
            restaurant_name,
            original,
            proposed,
            ..
        } => vec![
            section_header("Modify Preview"),
            String::new(),
            format!("Restaurant: {restaurant_name}"),
            format!(
                "From: {} at {} ({}p)",
                original.date, original.time, original.party_size
            ),
            format!(
                "To:   {} at {} ({}p)",
                proposed.date, proposed.time, proposed.party_size
            ),
            String::new(),
            "Add --confirm to modify.".to_string(),
        ],
        ModifyResult::Rebooked { message, .. } => vec![message],
        ModifyResult::Updated {
            deep_link, message, ..
        } => {
            let mut lines = vec![message];
            if let Some(link) = deep_link {
                lines.push(format!("Update here: {link}"));
            }
            lines
        }
        ModifyResult::Failed { reason } => anyhow::bail!("Modify failed: {reason}"),
    };

    println!(
        "{}",
        truncate_output(&lines.join("\n"), config.max_output_chars)
    );
    Ok(())
}

pub(crate) async fn run_rate(
    pool: &sqlx::SqlitePool,
    booking_id: &str,
    rating: i64,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    if !(1..=5).contains(&rating) {
        anyhow::bail!("Rating must be 1-5.");
    }
    let Some(row) = tablescout_db::get_booking(pool, booking_id).await? else {
        anyhow::bail!("Booking not found: {booking_id}");
    };
    let booking = row.into_record();

    tablescout_db::save_rating(pool, booking_id, rating, notes).await?;
    println!("Rated {}: {rating}/5", booking.restaurant_name);
    if let Some(notes) = notes {
        println!("Note: {notes}");
    }
    Ok(())
}

/// Prints reminders for confirmed bookings starting within the next four
/// hours. Silent when there is nothing to report; intended for cron.
pub(crate) async fn run_remind(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let now = chrono::Local::now();
    let today = now.format("%Y-%m-%d").to_string();
    let current_minutes =
        i32::try_from(now.hour() * 60 + now.minute()).unwrap_or(i32::MAX);

    let filter = BookingFilter {
        status: Some(BookingStatus::Confirmed),
        upcoming: false,
        past: false,
        limit: None,
    };
    let rows = tablescout_db::list_bookings(pool, &filter).await?;

    let mut due: Vec<(i32, BookingRecord)> = Vec::new();
    for row in rows {
        let booking = row.into_record();
        if booking.date != today {
            continue;
        }
        let Some(start) = parse_hhmm(&booking.time) else {
            continue;
        };
        let diff = start - current_minutes;
        if diff > 0 && diff <= REMIND_WINDOW_MINUTES {
            due.push((diff, booking));
        }
    }
    if due.is_empty() {
        return Ok(());
    }
    due.sort_by_key(|(diff, _)| *diff);

    let mut lines = Vec::new();
    for (diff, booking) in due {
        let hours = diff / 60;
        let mins = diff % 60;
        let lead = if hours > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{mins}m")
        };
        lines.push(format!(
            "Reminder: {} in {lead}",
            booking.restaurant_name
        ));
        lines.push(format!(
            "  Time: {} | Party: {}p",
            booking.time, booking.party_size
        ));
        if let Some(addr) = &booking.restaurant_addr {
            lines.push(format!("  Address: {addr}"));
        }
        if let Some(maps_url) = &booking.maps_url {
            lines.push(format!("  Maps: {maps_url}"));
        }
        if let Some(phone) = &booking.phone {
            lines.push(format!("  Phone: {phone}"));
        }
        lines.push(String::new());
    }

    println!("{}", lines.join("\n").trim_end());
    Ok(())
}

/// Prints a rating prompt for yesterday's unrated visits. Silent when there
/// are none; intended for cron.
pub(crate) async fn run_rate_prompt(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let rows = tablescout_db::get_unrated_past_bookings(pool).await?;
    if rows.is_empty() {
        return Ok(());
    }

    let mut lines = vec!["How was dinner? Rate your recent visits:".to_string(), String::new()];
    for row in rows {
        let booking = row.into_record();
        lines.push(format!(
            "  {} ({} at {})",
            booking.restaurant_name, booking.date, booking.time
        ));
        lines.push(format!(
            "  Rate: tablescout rate --booking-id {} --rating N",
            booking.booking_id
        ));
        lines.push(String::new());
    }

    println!("{}", lines.join("\n").trim_end());
    Ok(())
}

pub(crate) async fn run_status(
    config: &AppConfig,
    pool: &sqlx::SqlitePool,
    places: &PlacesClient,
    resy: &ResyClient,
) -> anyhow::Result<()> {
    let mut lines = vec![
        format!("tablescout v{}", env!("CARGO_PKG_VERSION")),
        format!("Time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    if config.has_google_key() {
        match places.test_connection().await {
            Ok(()) => lines.push("Google Places: connected".to_string()),
            Err(e) => lines.push(format!("Google Places: DISCONNECTED ({e})")),
        }
    } else {
        lines.push("Google Places: NOT CONFIGURED".to_string());
        lines.push("  Set TABLESCOUT_GOOGLE_API_KEY".to_string());
    }

    if config.has_resy_credentials() {
        match resy.get_user_info().await {
            Ok(user) => lines.push(format!("Resy: connected as {}", user.email)),
            Err(e) => lines.push(format!("Resy: DISCONNECTED ({e})")),
        }
    } else {
        lines.push("Resy: not configured (optional)".to_string());
    }

    let total = tablescout_db::count_bookings(pool, None).await?;
    let confirmed =
        tablescout_db::count_bookings(pool, Some(BookingStatus::Confirmed)).await?;
    lines.push(String::new());
    lines.push(format!("Total bookings: {total}"));
    lines.push(format!("Confirmed: {confirmed}"));

    lines.push(String::new());
    lines.push(format!("Data directory: {}", config.data_dir.display()));

    println!("{}", lines.join("\n"));
    Ok(())
}
