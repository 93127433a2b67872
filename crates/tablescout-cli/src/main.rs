mod discover;
mod format;
mod manage;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tablescout")]
#[command(about = "Restaurant discovery and booking via Google Places + Resy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for restaurants
    Search {
        /// Search text (cuisine, name, area)
        #[arg(long)]
        query: String,
        /// Date YYYY-MM-DD (enables availability lookups)
        #[arg(long)]
        date: Option<String>,
        /// Time HH:MM (for availability)
        #[arg(long)]
        time: Option<String>,
        /// Number of diners
        #[arg(long)]
        party_size: Option<u32>,
        /// low|mid|high|luxury
        #[arg(long)]
        price_range: Option<String>,
        /// Minimum Google rating (e.g. 4.0)
        #[arg(long)]
        min_rating: Option<f64>,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,
        /// Sort by: rating|distance|booking_ease
        #[arg(long, default_value = "rating")]
        sort: String,
    },
    /// Get restaurant details
    Details {
        /// Google Places ID
        #[arg(long)]
        place_id: Option<String>,
        /// Restaurant name (if no place-id)
        #[arg(long)]
        name: Option<String>,
    },
    /// Check table availability
    Check {
        #[arg(long)]
        place_id: String,
        /// Date YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Time HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        party_size: Option<u32>,
    },
    /// Book a table
    Book {
        #[arg(long)]
        place_id: String,
        /// Date YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Time HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        party_size: Option<u32>,
        /// Actually book (default: preview only)
        #[arg(long)]
        confirm: bool,
        /// Booking notes (e.g. birthday dinner)
        #[arg(long)]
        notes: Option<String>,
    },
    /// List bookings
    Bookings {
        /// Show upcoming bookings only
        #[arg(long)]
        upcoming: bool,
        /// Show past bookings only
        #[arg(long)]
        past: bool,
        /// Filter by status: confirmed|cancelled|completed|modified
        #[arg(long)]
        status: Option<String>,
    },
    /// Cancel a booking
    Cancel {
        #[arg(long)]
        booking_id: String,
        /// Actually cancel (default: preview only)
        #[arg(long)]
        confirm: bool,
    },
    /// Modify a booking
    Modify {
        #[arg(long)]
        booking_id: String,
        /// New date YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// New time HH:MM
        #[arg(long)]
        time: Option<String>,
        /// New party size
        #[arg(long)]
        party_size: Option<u32>,
        /// Actually modify (default: preview only)
        #[arg(long)]
        confirm: bool,
    },
    /// Rate a restaurant visit
    Rate {
        #[arg(long)]
        booking_id: String,
        /// Rating 1-5
        #[arg(long)]
        rating: i64,
        /// Optional review notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Check for upcoming bookings (cron; silent when nothing is due)
    Remind,
    /// Prompt for ratings on yesterday's visits (cron; silent when none)
    RatePrompt,
    /// Get restaurant suggestions
    Suggest {
        /// Cuisine type (e.g. Italian, Japanese)
        #[arg(long)]
        cuisine: Option<String>,
        /// Occasion (e.g. date night, birthday)
        #[arg(long)]
        occasion: Option<String>,
    },
    /// Show version, API connectivity, and booking stats
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = tablescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    std::fs::create_dir_all(config.cache_dir())?;
    let pool = tablescout_db::connect_pool(&config.database_url()).await?;
    tablescout_db::run_migrations(&pool).await?;

    let places = tablescout_places::PlacesClient::new(&config)?;
    let resy = tablescout_resy::ResyClient::new(&config)?;
    let store = tablescout_db::Store::new(pool.clone());

    match cli.command {
        Commands::Search {
            query,
            date,
            time,
            party_size,
            price_range,
            min_rating,
            radius,
            sort,
        } => {
            let params = tablescout_engine::SearchParams {
                query,
                lat: config.default_lat,
                lng: config.default_lng,
                radius_m: radius.unwrap_or(config.default_radius_m),
                date,
                time,
                party_size: party_size.unwrap_or(config.default_party_size),
                price_range,
                min_rating,
                sort_by: tablescout_engine::SortKey::parse(&sort),
                max_results: 10,
            };
            discover::run_search(&config, &places, &resy, &params).await
        }
        Commands::Details { place_id, name } => {
            discover::run_details(
                &config,
                &places,
                &resy,
                place_id.as_deref(),
                name.as_deref(),
            )
            .await
        }
        Commands::Check {
            place_id,
            date,
            time,
            party_size,
        } => {
            manage::run_check(
                &config,
                &places,
                &resy,
                &store,
                &place_id,
                &date,
                &time,
                party_size.unwrap_or(config.default_party_size),
            )
            .await
        }
        Commands::Book {
            place_id,
            date,
            time,
            party_size,
            confirm,
            notes,
        } => {
            manage::run_book(
                &config,
                &places,
                &resy,
                &store,
                &place_id,
                &date,
                &time,
                party_size.unwrap_or(config.default_party_size),
                confirm,
                notes.as_deref(),
            )
            .await
        }
        Commands::Bookings {
            upcoming,
            past,
            status,
        } => manage::run_bookings(&config, &pool, upcoming, past, status.as_deref()).await,
        Commands::Cancel {
            booking_id,
            confirm,
        } => manage::run_cancel(&config, &places, &resy, &store, &booking_id, confirm).await,
        Commands::Modify {
            booking_id,
            date,
            time,
            party_size,
            confirm,
        } => {
            manage::run_modify(
                &config,
                &places,
                &resy,
                &store,
                &booking_id,
                date.as_deref(),
                time.as_deref(),
                party_size,
                confirm,
            )
            .await
        }
        Commands::Rate {
            booking_id,
            rating,
            notes,
        } => manage::run_rate(&pool, &booking_id, rating, notes.as_deref()).await,
        Commands::Remind => manage::run_remind(&pool).await,
        Commands::RatePrompt => manage::run_rate_prompt(&pool).await,
        Commands::Suggest { cuisine, occasion } => {
            discover::run_suggest(
                &config,
                &pool,
                &places,
                &resy,
                cuisine.as_deref(),
                occasion.as_deref(),
            )
            .await
        }
        Commands::Status => manage::run_status(&config, &pool, &places, &resy).await,
    }
}
