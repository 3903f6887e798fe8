use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{GeoPoint, LocationPing};
use crate::service::resolution::BoundingBox;

const PING_COLUMNS: &str =
    "id, bus_id, latitude, longitude, speed_kph, heading_deg, is_active, recorded_at";

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one ping to the stream. Pings are never updated or deleted.
    pub async fn append(
        &self,
        bus_id: i64,
        coordinate: GeoPoint,
        speed_kph: f64,
        heading_deg: f64,
        is_active: bool,
        recorded_at: DateTime<Utc>,
    ) -> Result<LocationPing, sqlx::Error> {
        sqlx::query_as::<_, LocationPing>(&format!(
            "INSERT INTO locations (bus_id, latitude, longitude, speed_kph, heading_deg, is_active, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PING_COLUMNS
        ))
        .bind(bus_id)
        .bind(coordinate.latitude)
        .bind(coordinate.longitude)
        .bind(speed_kph)
        .bind(heading_deg)
        .bind(is_active)
        .bind(recorded_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn latest_for_bus(&self, bus_id: i64) -> Result<Option<LocationPing>, sqlx::Error> {
        sqlx::query_as::<_, LocationPing>(&format!(
            "SELECT {} FROM locations WHERE bus_id = $1 ORDER BY recorded_at DESC LIMIT 1",
            PING_COLUMNS
        ))
        .bind(bus_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn history_for_bus(
        &self,
        bus_id: i64,
        limit: i64,
    ) -> Result<Vec<LocationPing>, sqlx::Error> {
        sqlx::query_as::<_, LocationPing>(&format!(
            "SELECT {} FROM locations WHERE bus_id = $1 ORDER BY recorded_at DESC LIMIT $2",
            PING_COLUMNS
        ))
        .bind(bus_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Every ping inside the box regardless of recency: stale pings from the
    /// same bus all match. Callers treat results as unordered candidates.
    pub async fn find_in_box(
        &self,
        bounds: &BoundingBox,
        limit: i64,
    ) -> Result<Vec<LocationPing>, sqlx::Error> {
        sqlx::query_as::<_, LocationPing>(&format!(
            "SELECT {} FROM locations \
             WHERE latitude >= $1 AND latitude <= $2 AND longitude >= $3 AND longitude <= $4 \
             LIMIT $5",
            PING_COLUMNS
        ))
        .bind(bounds.min_lat)
        .bind(bounds.max_lat)
        .bind(bounds.min_lng)
        .bind(bounds.max_lng)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_active(&self, limit: i64) -> Result<Vec<LocationPing>, sqlx::Error> {
        sqlx::query_as::<_, LocationPing>(&format!(
            "SELECT {} FROM locations WHERE is_active = TRUE ORDER BY recorded_at DESC LIMIT $1",
            PING_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
