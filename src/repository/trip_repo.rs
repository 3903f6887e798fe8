use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{Trip, TripStatus};

const TRIP_COLUMNS: &str = "id, route_id, bus_id, start_time, end_time, status";

#[derive(Clone)]
pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(
        &self,
        route_id: i64,
        bus_id: i64,
        start_time: DateTime<Utc>,
        status: TripStatus,
    ) -> Result<Trip, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "INSERT INTO trips (route_id, bus_id, start_time, status) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            TRIP_COLUMNS
        ))
        .bind(route_id)
        .bind(bus_id)
        .bind(start_time)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Scheduled trips departing at or after `now`, soonest first.
    pub async fn find_upcoming(
        &self,
        route_id: i64,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "SELECT {} FROM trips WHERE route_id = $1 AND start_time >= $2 AND status = 'scheduled' \
             ORDER BY start_time ASC LIMIT $3",
            TRIP_COLUMNS
        ))
        .bind(route_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_active(&self, limit: i64) -> Result<Vec<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "SELECT {} FROM trips WHERE status = 'active' ORDER BY start_time DESC LIMIT $1",
            TRIP_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Status transitions are not validated against prior state.
    pub async fn update_status(
        &self,
        id: i64,
        status: TripStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Option<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "UPDATE trips SET status = $1, end_time = COALESCE($2, end_time) \
             WHERE id = $3 RETURNING {}",
            TRIP_COLUMNS
        ))
        .bind(status.as_str())
        .bind(end_time)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
