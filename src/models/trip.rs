use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn parse(s: &str) -> Option<TripStatus> {
        match s {
            "scheduled" => Some(TripStatus::Scheduled),
            "active" => Some(TripStatus::Active),
            "completed" => Some(TripStatus::Completed),
            "cancelled" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Active => "active",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

/// Lifecycle is scheduled -> active -> completed/cancelled, driven entirely
/// by external callers; transitions are not validated against prior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub route_id: i64,
    pub bus_id: i64,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: TripStatus,
}

impl FromRow<'_, PgRow> for Trip {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = TripStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown trip status '{}'", status).into(),
        })?;

        Ok(Trip {
            id: row.try_get("id")?,
            route_id: row.try_get("route_id")?,
            bus_id: row.try_get("bus_id")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            status,
        })
    }
}
