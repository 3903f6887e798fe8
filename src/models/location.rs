use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::bus::GeoPoint;

/// One immutable ping from a device. The stream is append-only and entirely
/// independent of the denormalized position on the bus record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationPing {
    pub id: i64,
    pub bus_id: i64,
    pub coordinate: GeoPoint,
    #[serde(rename = "speedKph")]
    pub speed_kph: f64,
    #[serde(rename = "headingDeg")]
    pub heading_deg: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for LocationPing {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(LocationPing {
            id: row.try_get("id")?,
            bus_id: row.try_get("bus_id")?,
            coordinate: GeoPoint {
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
            },
            speed_kph: row.try_get("speed_kph")?,
            heading_deg: row.try_get("heading_deg")?,
            is_active: row.try_get("is_active")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}
