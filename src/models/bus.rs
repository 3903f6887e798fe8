use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};

// Day-bucket dates arrive either as a bare calendar date ("2024-06-01") or
// as a full ISO 8601 timestamp, depending on which client wrote the entry.
fn deserialize_day_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(D::Error::custom(format!("Invalid date format: {}", s)))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusStatus {
    #[serde(rename = "On Time")]
    OnTime,
    #[serde(rename = "Delayed")]
    Delayed,
}

impl BusStatus {
    pub fn parse(s: &str) -> Option<BusStatus> {
        match s {
            "On Time" => Some(BusStatus::OnTime),
            "Delayed" => Some(BusStatus::Delayed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusStatus::OnTime => "On Time",
            BusStatus::Delayed => "Delayed",
        }
    }
}

/// One per-day history entry. Duplicate dates for the same bus are allowed;
/// resolution takes the first match in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLocation {
    #[serde(deserialize_with = "deserialize_day_date")]
    pub date: DateTime<Utc>,
    pub location: GeoPoint,
    pub status: BusStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bus {
    pub bus_id: i64,
    pub route_id: i64,
    pub status: BusStatus,
    pub current_location: GeoPoint,
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "dailyLocations")]
    pub daily_locations: Vec<DailyLocation>,
}

impl FromRow<'_, PgRow> for Bus {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = BusStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown bus status '{}'", status).into(),
        })?;
        let daily: Json<Vec<DailyLocation>> = row.try_get("daily_locations")?;

        Ok(Bus {
            bus_id: row.try_get("bus_id")?,
            route_id: row.try_get("route_id")?,
            status,
            current_location: GeoPoint {
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
            },
            last_updated: row.try_get("last_updated")?,
            daily_locations: daily.0,
        })
    }
}
