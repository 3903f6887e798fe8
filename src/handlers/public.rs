use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::GeoPoint;
use crate::service::resolution::DEFAULT_RADIUS_KM;
use crate::state::AppState;

const HISTORY_DEFAULT_LIMIT: i64 = 50;
const HISTORY_MAX_LIMIT: i64 = 500;
const UPCOMING_TRIPS_LIMIT: i64 = 50;
const ACTIVE_TRIPS_LIMIT: i64 = 100;
const ACTIVE_LOCATIONS_LIMIT: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/routes", get(list_routes))
        .route("/routes/:route_id/trips/upcoming", get(upcoming_trips))
        .route("/trips/active", get(active_trips))
        .route("/trips/:id", get(get_trip))
        .route("/buses/nearby", get(buses_nearby))
        .route("/buses/:bus_id", get(bus_summary))
        .route("/buses/:bus_id/location", get(latest_bus_location))
        .route("/buses/:bus_id/location/history", get(bus_location_history))
        .route("/locations/active", get(active_locations))
}

#[derive(Debug, Deserialize)]
struct ListRoutesQuery {
    from: Option<String>,
    to: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

// GET /public/routes?from=&to=&page=&limit=
async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<ListRoutesQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    // routes only carry a name, so both endpoints filter against it; `to`
    // takes precedence when both are given
    let name_filter = query.to.as_deref().or(query.from.as_deref());
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).max(1);
    let skip = (page - 1) * limit;

    let items = state.routes.find(name_filter, skip, limit).await?;
    let total = state.routes.count(name_filter).await?;

    Ok(Json(json!({
        "status": "success",
        "data": items,
        "meta": { "total": total, "page": page, "limit": limit }
    })))
}

// GET /public/routes/:route_id/trips/upcoming
async fn upcoming_trips(
    State(state): State<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let trips = state
        .trips
        .find_upcoming(route_id, Utc::now(), UPCOMING_TRIPS_LIMIT)
        .await?;
    Ok(Json(json!({ "status": "success", "data": trips })))
}

// GET /public/trips/active
async fn active_trips(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let trips = state.trips.find_active(ACTIVE_TRIPS_LIMIT).await?;
    Ok(Json(json!({ "status": "success", "data": trips })))
}

// GET /public/trips/:id
async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let trip = state
        .trips
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
    Ok(Json(json!({ "status": "success", "data": trip })))
}

// GET /public/buses/:bus_id: the bus record plus its latest ping; the two
// position sources are reported side by side, never merged.
async fn bus_summary(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let bus = state
        .buses
        .find_one(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;
    let latest = state.resolution.latest_location(bus_id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "bus": bus, "latestLocation": latest }
    })))
}

// GET /public/buses/:bus_id/location
async fn latest_bus_location(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let latest = state
        .resolution
        .latest_location(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No location yet".to_string()))?;
    Ok(Json(json!({ "status": "success", "data": latest })))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

// GET /public/buses/:bus_id/location/history?limit=
async fn bus_location_history(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let limit = query
        .limit
        .unwrap_or(HISTORY_DEFAULT_LIMIT)
        .clamp(1, HISTORY_MAX_LIMIT);
    let points = state.locations.history_for_bus(bus_id, limit).await?;
    Ok(Json(json!({ "status": "success", "data": points })))
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    lat: Option<String>,
    lng: Option<String>,
    #[serde(rename = "radiusKm")]
    radius_km: Option<String>,
}

// GET /public/buses/nearby?lat=&lng=&radiusKm=
async fn buses_nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (lat, lng) = match (query.lat.as_deref(), query.lng.as_deref()) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(AppError::Validation("lat & lng required".to_string())),
    };
    let latitude: f64 = lat
        .parse()
        .map_err(|_| AppError::Validation("lat & lng must be numbers".to_string()))?;
    let longitude: f64 = lng
        .parse()
        .map_err(|_| AppError::Validation("lat & lng must be numbers".to_string()))?;
    let radius_km: f64 = match query.radius_km.as_deref() {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Validation("radiusKm must be a number".to_string()))?,
        None => DEFAULT_RADIUS_KM,
    };

    let points = state
        .resolution
        .find_buses_nearby(GeoPoint { latitude, longitude }, radius_km)
        .await?;

    Ok(Json(json!({ "status": "success", "data": points })))
}

// GET /public/locations/active
async fn active_locations(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let points = state.locations.find_active(ACTIVE_LOCATIONS_LIMIT).await?;
    Ok(Json(json!({ "status": "success", "data": points })))
}
