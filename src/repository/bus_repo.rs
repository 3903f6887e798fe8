use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{Bus, BusStatus, GeoPoint};

const BUS_COLUMNS: &str =
    "bus_id, route_id, latitude, longitude, status, last_updated, daily_locations";

#[derive(Clone)]
pub struct BusRepository {
    pool: PgPool,
}

impl BusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_one(&self, bus_id: i64) -> Result<Option<Bus>, sqlx::Error> {
        sqlx::query_as::<_, Bus>(&format!(
            "SELECT {} FROM buses WHERE bus_id = $1",
            BUS_COLUMNS
        ))
        .bind(bus_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists(&self, bus_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM buses WHERE bus_id = $1)")
            .bind(bus_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Fleet listing in store order, optionally restricted to one route.
    pub async fn find(&self, route_id: Option<i64>) -> Result<Vec<Bus>, sqlx::Error> {
        match route_id {
            Some(route_id) => {
                sqlx::query_as::<_, Bus>(&format!(
                    "SELECT {} FROM buses WHERE route_id = $1",
                    BUS_COLUMNS
                ))
                .bind(route_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Bus>(&format!("SELECT {} FROM buses", BUS_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
    }

    pub async fn create(&self, bus: &Bus) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO buses (bus_id, route_id, latitude, longitude, status, last_updated, daily_locations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(bus.bus_id)
        .bind(bus.route_id)
        .bind(bus.current_location.latitude)
        .bind(bus.current_location.longitude)
        .bind(bus.status.as_str())
        .bind(bus.last_updated)
        .bind(Json(&bus.daily_locations))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Full-record save used by the admin update path: the handler reads the
    /// bus, applies the patch, and writes everything back.
    pub async fn save(&self, bus: &Bus) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE buses SET route_id = $1, latitude = $2, longitude = $3, status = $4, \
             last_updated = $5, daily_locations = $6 WHERE bus_id = $7",
        )
        .bind(bus.route_id)
        .bind(bus.current_location.latitude)
        .bind(bus.current_location.longitude)
        .bind(bus.status.as_str())
        .bind(bus.last_updated)
        .bind(Json(&bus.daily_locations))
        .bind(bus.bus_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_location(
        &self,
        bus_id: i64,
        location: GeoPoint,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE buses SET latitude = $1, longitude = $2, last_updated = $3 WHERE bus_id = $4",
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(updated_at)
        .bind(bus_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_status(
        &self,
        bus_id: i64,
        status: BusStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE buses SET status = $1, last_updated = $2 WHERE bus_id = $3")
                .bind(status.as_str())
                .bind(updated_at)
                .bind(bus_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, bus_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buses WHERE bus_id = $1")
            .bind(bus_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
