//! Integration tests against an in-memory SQLite database.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tablescout_core::capabilities::BookingStore;
use tablescout_core::types::{
    BookingRecord, BookingStatus, BookingUpdate, Platform, RestaurantRecord,
};
use tablescout_db::{BookingFilter, Store};

async fn test_pool() -> SqlitePool {
    // One connection: each in-memory SQLite connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    tablescout_db::run_migrations(&pool).await.expect("migrations");
    pool
}

fn booking(booking_id: &str, date: &str, status: BookingStatus) -> BookingRecord {
    BookingRecord {
        booking_id: booking_id.to_string(),
        restaurant_name: "Quay".to_string(),
        restaurant_addr: Some("Upper Level, Overseas Passenger Terminal".to_string()),
        place_id: Some("pl_quay".to_string()),
        date: date.to_string(),
        time: "19:00".to_string(),
        party_size: 2,
        platform: Platform::Resy,
        platform_ref: Some("55443".to_string()),
        status,
        maps_url: Some("https://maps.google.com/?cid=1".to_string()),
        phone: Some("+61 2 9251 5600".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn migrations_apply_and_pool_pings() {
    let pool = test_pool().await;
    tablescout_db::ping(&pool).await.expect("ping");
}

#[tokio::test]
async fn booking_round_trips_through_upsert() {
    let pool = test_pool().await;
    let record = booking("BK_1", "2026-09-01", BookingStatus::Confirmed);
    tablescout_db::save_booking(&pool, &record).await.unwrap();

    let row = tablescout_db::get_booking(&pool, "BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(row.restaurant_name, "Quay");
    assert_eq!(row.party_size, 2);
    assert_eq!(row.platform, "resy");
    assert_eq!(row.status, "confirmed");

    // Replaying the same booking_id overwrites instead of duplicating.
    let mut replay = record.clone();
    replay.party_size = 4;
    tablescout_db::save_booking(&pool, &replay).await.unwrap();
    let row = tablescout_db::get_booking(&pool, "BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(row.party_size, 4);
    assert_eq!(tablescout_db::count_bookings(&pool, None).await.unwrap(), 1);
}

#[tokio::test]
async fn list_bookings_filters_by_status_and_window() {
    let pool = test_pool().await;
    tablescout_db::save_booking(&pool, &booking("BK_future", "2099-01-01", BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_booking(&pool, &booking("BK_past", "1999-01-01", BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_booking(
        &pool,
        &booking("BK_cancelled", "2099-02-01", BookingStatus::Cancelled),
    )
    .await
    .unwrap();

    let upcoming = tablescout_db::list_bookings(
        &pool,
        &BookingFilter {
            upcoming: true,
            ..BookingFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].booking_id, "BK_future");

    let past = tablescout_db::list_bookings(
        &pool,
        &BookingFilter {
            past: true,
            ..BookingFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].booking_id, "BK_past");

    let cancelled = tablescout_db::list_bookings(
        &pool,
        &BookingFilter {
            status: Some(BookingStatus::Cancelled),
            ..BookingFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cancelled.len(), 1);

    let limited = tablescout_db::list_bookings(
        &pool,
        &BookingFilter {
            limit: Some(2),
            ..BookingFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn update_booking_status_overlays_only_set_fields() {
    let pool = test_pool().await;
    tablescout_db::save_booking(&pool, &booking("BK_1", "2026-09-01", BookingStatus::Confirmed))
        .await
        .unwrap();

    let updated = tablescout_db::update_booking_status(
        &pool,
        "BK_1",
        BookingStatus::Modified,
        &BookingUpdate {
            time: Some("20:30".to_string()),
            party_size: Some(4),
            ..BookingUpdate::default()
        },
    )
    .await
    .unwrap();
    assert!(updated);

    let row = tablescout_db::get_booking(&pool, "BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(row.status, "modified");
    assert_eq!(row.time, "20:30");
    assert_eq!(row.party_size, 4);
    // Unset fields keep their previous values.
    assert_eq!(row.date, "2026-09-01");
    assert_eq!(row.platform_ref.as_deref(), Some("55443"));

    let missing = tablescout_db::update_booking_status(
        &pool,
        "BK_unknown",
        BookingStatus::Cancelled,
        &BookingUpdate::default(),
    )
    .await
    .unwrap();
    assert!(!missing);
}

#[tokio::test]
async fn restaurant_upsert_round_trips() {
    let pool = test_pool().await;
    let record = RestaurantRecord {
        place_id: "pl_quay".to_string(),
        name: "Quay".to_string(),
        address: Some("Circular Quay W, Sydney".to_string()),
        lat: Some(-33.8578),
        lng: Some(151.2100),
        rating: Some(4.6),
        review_count: Some(2500),
        price_level: Some("PRICE_LEVEL_VERY_EXPENSIVE".to_string()),
        phone: Some("+61 2 9251 5600".to_string()),
        website: Some("https://www.quay.com.au".to_string()),
        maps_url: Some("https://maps.google.com/?cid=1".to_string()),
        platform: Platform::Resy,
        platform_id: Some("101".to_string()),
    };
    tablescout_db::upsert_restaurant(&pool, &record).await.unwrap();

    let row = tablescout_db::get_restaurant(&pool, "pl_quay")
        .await
        .unwrap()
        .expect("restaurant exists");
    assert_eq!(row.name, "Quay");
    assert_eq!(row.platform.as_deref(), Some("resy"));
    assert_eq!(row.platform_id.as_deref(), Some("101"));

    let mut refreshed = record.clone();
    refreshed.rating = Some(4.7);
    tablescout_db::upsert_restaurant(&pool, &refreshed).await.unwrap();
    let row = tablescout_db::get_restaurant(&pool, "pl_quay")
        .await
        .unwrap()
        .expect("restaurant exists");
    assert_eq!(row.rating, Some(4.7));
}

#[tokio::test]
async fn save_rating_marks_booking_completed() {
    let pool = test_pool().await;
    tablescout_db::save_booking(&pool, &booking("BK_1", "2026-09-01", BookingStatus::Confirmed))
        .await
        .unwrap();

    tablescout_db::save_rating(&pool, "BK_1", 9, Some("outstanding tasting menu"))
        .await
        .unwrap();

    let row = tablescout_db::get_booking(&pool, "BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(row.status, "completed");

    let ratings = tablescout_db::get_ratings(&pool, Some("pl_quay")).await.unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].rating, 9);
    assert_eq!(ratings[0].restaurant_name, "Quay");

    let all = tablescout_db::get_ratings(&pool, None).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn unrated_past_bookings_targets_yesterday_only() {
    let pool = test_pool().await;
    let yesterday: String = sqlx::query_scalar("SELECT date('now', '-1 day')")
        .fetch_one(&pool)
        .await
        .unwrap();

    tablescout_db::save_booking(&pool, &booking("BK_yday", &yesterday, BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_booking(&pool, &booking("BK_old", "1999-01-01", BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_booking(
        &pool,
        &booking("BK_yday_rated", &yesterday, BookingStatus::Confirmed),
    )
    .await
    .unwrap();
    tablescout_db::save_rating(&pool, "BK_yday_rated", 8, None).await.unwrap();

    let unrated = tablescout_db::get_unrated_past_bookings(&pool).await.unwrap();
    assert_eq!(unrated.len(), 1);
    assert_eq!(unrated[0].booking_id, "BK_yday");
}

#[tokio::test]
async fn top_restaurants_counts_visits_with_average_rating() {
    let pool = test_pool().await;
    tablescout_db::save_booking(&pool, &booking("BK_1", "2026-01-01", BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_booking(&pool, &booking("BK_2", "2026-02-01", BookingStatus::Confirmed))
        .await
        .unwrap();
    tablescout_db::save_rating(&pool, "BK_1", 8, None).await.unwrap();
    tablescout_db::save_rating(&pool, "BK_2", 10, None).await.unwrap();

    let top = tablescout_db::get_top_restaurants(&pool, 5).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].restaurant_name, "Quay");
    assert_eq!(top[0].visit_count, 2);
    assert_eq!(top[0].avg_rating, Some(9.0));
}

#[tokio::test]
async fn preferences_upsert_and_list() {
    let pool = test_pool().await;
    tablescout_db::set_preference(&pool, "default_party_size", "2").await.unwrap();
    tablescout_db::set_preference(&pool, "default_party_size", "4").await.unwrap();
    tablescout_db::set_preference(&pool, "cuisine", "japanese").await.unwrap();

    let prefs = tablescout_db::get_preferences(&pool).await.unwrap();
    assert_eq!(prefs.len(), 2);
    assert_eq!(prefs[0], ("cuisine".to_string(), "japanese".to_string()));
    assert_eq!(prefs[1], ("default_party_size".to_string(), "4".to_string()));
}

#[tokio::test]
async fn store_trait_round_trips_domain_records() {
    let pool = test_pool().await;
    let store = Store::new(pool);

    let record = booking("BK_1", "2026-09-01", BookingStatus::Confirmed);
    store.save_booking(&record).await.unwrap();

    let loaded = store
        .get_booking("BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(loaded.platform, Platform::Resy);
    assert_eq!(loaded.status, BookingStatus::Confirmed);
    assert_eq!(loaded.party_size, 2);

    let updated = store
        .update_booking_status("BK_1", BookingStatus::Cancelled, &BookingUpdate::default())
        .await
        .unwrap();
    assert!(updated);
    let loaded = store
        .get_booking("BK_1")
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(loaded.status, BookingStatus::Cancelled);

    assert!(store.get_restaurant("pl_missing").await.unwrap().is_none());
}
