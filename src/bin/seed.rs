//! Sample data bootstrap: one route, one bus, one scheduled trip. The route
//! and bus are skipped when already present; a fresh trip is added each run.

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_tracking_api::config::Config;
use bus_tracking_api::constants::API_NAME;
use bus_tracking_api::models::{Bus, BusStatus, GeoPoint, Route, TripStatus};
use bus_tracking_api::repository::{BusRepository, RouteRepository, TripRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let routes = RouteRepository::new(pool.clone());
    let buses = BusRepository::new(pool.clone());
    let trips = TripRepository::new(pool);

    if routes.find_one(1).await?.is_none() {
        routes
            .create(&Route {
                route_id: 1,
                name: "Colombo – Kandy".to_string(),
            })
            .await
            .context("Failed to seed route")?;
        tracing::info!("{} Seeded route 1", API_NAME);
    }

    if buses.find_one(1001).await?.is_none() {
        buses
            .create(&Bus {
                bus_id: 1001,
                route_id: 1,
                status: BusStatus::OnTime,
                current_location: GeoPoint {
                    latitude: 6.9271,
                    longitude: 79.8612,
                },
                last_updated: Utc::now(),
                daily_locations: Vec::new(),
            })
            .await
            .context("Failed to seed bus")?;
        tracing::info!("{} Seeded bus 1001", API_NAME);
    }

    let start = Utc::now() + Duration::hours(1);
    trips
        .create(1, 1001, start, TripStatus::Scheduled)
        .await
        .context("Failed to seed trip")?;
    tracing::info!("{} Seeded a scheduled trip departing {}", API_NAME, start);

    Ok(())
}
