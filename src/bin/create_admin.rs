//! One-time creation of the default admin account.
//!
//! Usage: `create-admin [username] [password] [name]`; falls back to the
//! ADMIN_USERNAME / ADMIN_PASSWORD / ADMIN_NAME environment variables, then
//! to built-in defaults. Refuses to overwrite an existing username.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_tracking_api::config::Config;
use bus_tracking_api::constants::API_NAME;
use bus_tracking_api::repository::AdminRepository;

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

    let args: Vec<String> = env::args().collect();
    let username = args
        .get(1)
        .cloned()
        .or_else(|| env::var("ADMIN_USERNAME").ok())
        .unwrap_or_else(|| "admin".to_string());
    let password = args
        .get(2)
        .cloned()
        .or_else(|| env::var("ADMIN_PASSWORD").ok())
        .unwrap_or_else(|| "admin123".to_string());
    let name = args
        .get(3)
        .cloned()
        .or_else(|| env::var("ADMIN_NAME").ok())
        .unwrap_or_else(|| "Default Admin".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let admins = AdminRepository::new(pool);

    if admins.exists_by_username(&username).await? {
        anyhow::bail!("Username '{}' already exists", username);
    }

    let password_hash =
        bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Password hashing failed")?;
    let admin = admins
        .create(&username, &password_hash, &name, "admin")
        .await
        .context("Failed to create admin")?;

    tracing::info!("{} Admin created: {}", API_NAME, admin.username);
    tracing::warn!("{} Change the default password after first login", API_NAME);

    Ok(())
}
