//! Location resolution.
//!
//! Produces the authoritative (status, location, timestamp) snapshot for a
//! bus, either live or as of a calendar day, and answers proximity queries
//! over the independent ping stream. The two position sources (the
//! denormalized bus record and the append-only ping stream) are never
//! reconciled here or anywhere else.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::constants::API_NAME;
use crate::models::{Bus, BusStatus, GeoPoint, LocationPing};
use crate::repository::{BusRepository, LocationRepository};

/// Hard cap on bounding-box matches.
pub const NEARBY_RESULT_CAP: i64 = 200;

/// Default search radius in kilometres when the caller gives none.
pub const DEFAULT_RADIUS_KM: f64 = 1.0;

// 1 degree of latitude ~ 111 km. Planar approximation; good enough for a
// country-scale service area, increasingly wrong near the poles.
const KM_PER_DEGREE: f64 = 111.0;

/// The resolved snapshot of one bus, shaped for listing responses.
#[derive(Debug, Clone, Serialize)]
pub struct BusStateView {
    pub bus_id: i64,
    pub route_id: i64,
    pub status: BusStatus,
    pub current_location: GeoPoint,
    pub last_updated: DateTime<Utc>,
}

/// Resolves the snapshot for `bus` on `target_date`, or the live view when
/// no date is given.
///
/// Day matching is calendar-day equality (year, month, day; time-of-day
/// ignored) against the stored entry's date. Entries are scanned in
/// insertion order and the first match wins, so on duplicate dates the
/// earliest-inserted entry is authoritative. A date with no matching entry
/// falls back to the live view: best available data beats no data.
pub fn resolve_bus_state(bus: &Bus, target_date: Option<NaiveDate>) -> BusStateView {
    if let Some(day) = target_date {
        if let Some(entry) = bus
            .daily_locations
            .iter()
            .find(|e| e.date.date_naive() == day)
        {
            return BusStateView {
                bus_id: bus.bus_id,
                route_id: bus.route_id,
                status: entry.status,
                current_location: entry.location,
                last_updated: entry.date,
            };
        }
    }

    BusStateView {
        bus_id: bus.bus_id,
        route_id: bus.route_id,
        status: bus.status,
        current_location: bus.current_location,
        last_updated: bus.last_updated,
    }
}

/// Axis-aligned box used as a coarse spatial filter. Not a great-circle
/// radius query: callers needing exact distances must refine the candidates
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let delta = radius_km / KM_PER_DEGREE;
        BoundingBox {
            min_lat: center.latitude - delta,
            max_lat: center.latitude + delta,
            min_lng: center.longitude - delta,
            max_lng: center.longitude + delta,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

#[derive(Clone)]
pub struct ResolutionService {
    bus_repo: BusRepository,
    location_repo: LocationRepository,
}

impl ResolutionService {
    pub fn new(bus_repo: BusRepository, location_repo: LocationRepository) -> Self {
        Self {
            bus_repo,
            location_repo,
        }
    }

    /// Shapes the fleet for one day in a single pass: each bus resolved
    /// independently, output in store iteration order.
    pub async fn shape_fleet(
        &self,
        route_id: Option<i64>,
        target_date: Option<NaiveDate>,
    ) -> Result<Vec<BusStateView>, sqlx::Error> {
        let buses = self.bus_repo.find(route_id).await?;
        Ok(buses
            .iter()
            .map(|bus| resolve_bus_state(bus, target_date))
            .collect())
    }

    /// Bounding-box candidates around `center`, capped at
    /// [`NEARBY_RESULT_CAP`], unordered, recency ignored.
    pub async fn find_buses_nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<LocationPing>, sqlx::Error> {
        let bounds = BoundingBox::around(center, radius_km);
        tracing::debug!(
            "{} Nearby query around ({}, {}) radius {}km",
            API_NAME,
            center.latitude,
            center.longitude,
            radius_km
        );
        self.location_repo
            .find_in_box(&bounds, NEARBY_RESULT_CAP)
            .await
    }

    /// The max-timestamp ping for a bus, or none when it has no pings yet.
    /// Distinct from the denormalized position on the bus record.
    pub async fn latest_location(
        &self,
        bus_id: i64,
    ) -> Result<Option<LocationPing>, sqlx::Error> {
        self.location_repo.latest_for_bus(bus_id).await
    }
}
