use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::middleware::api_key;
use crate::models::{Bus, BusStatus, GeoPoint};
use crate::service::BusStateView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buses", get(list_buses))
        .route("/buses/:bus_id", get(get_bus))
        .route("/buses/:bus_id/location", get(get_bus_location))
        .route("/buses/:bus_id/status", get(get_bus_status))
}

/// Device-facing endpoints, guarded by the shared `x-api-key`.
pub fn device_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/buses/:bus_id/location", patch(update_bus_location))
        .route("/buses/:bus_id/status", patch(update_bus_status))
        .route("/locations", post(append_ping))
        .layer(middleware::from_fn_with_state(
            state,
            api_key::require_api_key,
        ))
}

#[derive(Debug, Deserialize)]
struct ListBusesQuery {
    route_id: Option<i64>,
    date: Option<String>,
}

// GET /buses?route_id=&date=YYYY-MM-DD
async fn list_buses(
    State(state): State<AppState>,
    Query(query): Query<ListBusesQuery>,
) -> Result<Json<Vec<BusStateView>>, AppError> {
    let target_date = match query.date.as_deref() {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::Validation("Invalid date format. Use YYYY-MM-DD.".to_string())
        })?),
        None => None,
    };

    let shaped = state.resolution.shape_fleet(query.route_id, target_date).await?;
    Ok(Json(shaped))
}

async fn get_bus(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<Bus>, AppError> {
    let bus = state
        .buses
        .find_one(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;
    Ok(Json(bus))
}

async fn get_bus_location(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<GeoPoint>, AppError> {
    let bus = state
        .buses
        .find_one(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;
    Ok(Json(bus.current_location))
}

async fn get_bus_status(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let bus = state
        .buses
        .find_one(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;
    Ok(Json(json!({ "status": bus.status })))
}

#[derive(Debug, Deserialize)]
struct UpdateLocationRequest {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

// PATCH /buses/:bus_id/location
async fn update_bus_location(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
    Json(body): Json<UpdateLocationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (latitude, longitude) = match (body.latitude, body.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(AppError::Validation(
                "latitude and longitude (numbers) required".to_string(),
            ))
        }
    };

    let location = GeoPoint { latitude, longitude };
    let now = Utc::now();
    let updated = state.buses.update_location(bus_id, location, now).await?;
    if !updated {
        return Err(AppError::NotFound("Bus not found".to_string()));
    }

    tracing::info!("{} Bus {} location updated", API_NAME, bus_id);

    Ok(Json(json!({
        "message": "Location updated",
        "bus_id": bus_id,
        "current_location": location,
        "last_updated": now
    })))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: Option<String>,
}

// PATCH /buses/:bus_id/status
async fn update_bus_status(
    State(state): State<AppState>,
    Path(bus_id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = body
        .status
        .as_deref()
        .and_then(BusStatus::parse)
        .ok_or_else(|| {
            AppError::Validation("status must be \"On Time\" or \"Delayed\"".to_string())
        })?;

    let now = Utc::now();
    let updated = state.buses.update_status(bus_id, status, now).await?;
    if !updated {
        return Err(AppError::NotFound("Bus not found".to_string()));
    }

    tracing::info!("{} Bus {} status set to {}", API_NAME, bus_id, status.as_str());

    Ok(Json(json!({
        "message": "Status updated",
        "bus_id": bus_id,
        "status": status,
        "last_updated": now
    })))
}

#[derive(Debug, Deserialize)]
struct AppendPingRequest {
    bus_id: Option<i64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(rename = "speedKph", default)]
    speed_kph: Option<f64>,
    #[serde(rename = "headingDeg", default)]
    heading_deg: Option<f64>,
    #[serde(rename = "isActive", default)]
    is_active: Option<bool>,
}

// POST /locations: appends to the ping stream; deliberately does not touch
// the denormalized position on the bus record.
async fn append_ping(
    State(state): State<AppState>,
    Json(body): Json<AppendPingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let bus_id = body
        .bus_id
        .ok_or_else(|| AppError::Validation("bus_id is required".to_string()))?;
    let (latitude, longitude) = match (body.latitude, body.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(AppError::Validation(
                "latitude and longitude (numbers) required".to_string(),
            ))
        }
    };

    let ping = state
        .locations
        .append(
            bus_id,
            GeoPoint { latitude, longitude },
            body.speed_kph.unwrap_or(0.0),
            body.heading_deg.unwrap_or(0.0),
            body.is_active.unwrap_or(true),
            Utc::now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": ping })),
    ))
}
