use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, patch, post, put},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::middleware::auth::{authorize, require_bearer};
use crate::middleware::Claims;
use crate::models::{Bus, BusStatus, DailyLocation, GeoPoint, Route, TripStatus};
use crate::policy::{Action, Role};
use crate::repository::check_duplicate_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/routes", post(create_route))
        .route("/routes/:route_id", put(rename_route))
        .route("/routes/:route_id", delete(delete_route))
        .route("/buses", post(create_bus))
        .route("/buses/:bus_id", put(update_bus))
        .route("/buses/:bus_id", delete(delete_bus))
        .route("/trips", post(create_trip))
        .route("/trips/:id/status", patch(update_trip_status))
        .route("/trips/:id", delete(delete_trip))
        .route("/users", post(create_admin_user))
        .route("/users/:id", delete(delete_admin_user))
        .layer(middleware::from_fn_with_state(state, require_bearer))
}

fn parse_iso_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::Validation(format!("{} must be an ISO 8601 timestamp", field))
        })
}

#[derive(Debug, Deserialize)]
struct CreateRouteRequest {
    route_id: Option<i64>,
    name: Option<String>,
}

// POST /admin/routes
async fn create_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    authorize(&claims, Action::RouteCreate)?;

    let (route_id, name) = match (body.route_id, body.name) {
        (Some(id), Some(name)) if !name.is_empty() => (id, name),
        _ => {
            return Err(AppError::Validation(
                "route_id and name are required".to_string(),
            ))
        }
    };

    // pre-check is an optimization; the primary key is the real guard
    if state.routes.exists(route_id).await? {
        return Err(AppError::Conflict("route_id already exists".to_string()));
    }

    let route = Route { route_id, name };
    state.routes.create(&route).await.map_err(|e| {
        if check_duplicate_error(&e).is_some() {
            AppError::Conflict("route_id already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!("{} Route {} created", API_NAME, route.route_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": route })),
    ))
}

#[derive(Debug, Deserialize)]
struct RenameRouteRequest {
    name: Option<String>,
}

// PUT /admin/routes/:route_id; routes are immutable except for rename
async fn rename_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(route_id): Path<i64>,
    Json(body): Json<RenameRouteRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::RouteUpdate)?;

    let name = body
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    let renamed = state.routes.rename(route_id, &name).await?;
    if !renamed {
        return Err(AppError::NotFound("Route not found".to_string()));
    }

    Ok(Json(json!({
        "status": "success",
        "data": { "route_id": route_id, "name": name }
    })))
}

// DELETE /admin/routes/:route_id
async fn delete_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(route_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::RouteDelete)?;

    let deleted = state.routes.delete(route_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Route not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Route deleted successfully",
        "deletedRouteId": route_id
    })))
}

#[derive(Debug, Deserialize)]
struct CreateBusRequest {
    bus_id: Option<i64>,
    route_id: Option<i64>,
    current_location: Option<GeoPoint>,
    status: Option<String>,
    #[serde(rename = "dailyLocations")]
    daily_locations: Option<Vec<DailyLocation>>,
}

// POST /admin/buses
async fn create_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateBusRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    authorize(&claims, Action::BusCreate)?;

    let (bus_id, route_id) = match (body.bus_id, body.route_id) {
        (Some(bus_id), Some(route_id)) => (bus_id, route_id),
        _ => {
            return Err(AppError::Validation(
                "bus_id and route_id are required".to_string(),
            ))
        }
    };

    let status = match body.status.as_deref() {
        Some(raw) => BusStatus::parse(raw).ok_or_else(|| {
            AppError::Validation("status must be \"On Time\" or \"Delayed\"".to_string())
        })?,
        None => BusStatus::OnTime,
    };

    if state.buses.exists(bus_id).await? {
        return Err(AppError::Conflict("bus_id already exists".to_string()));
    }

    let bus = Bus {
        bus_id,
        route_id,
        status,
        current_location: body.current_location.unwrap_or(GeoPoint {
            latitude: 0.0,
            longitude: 0.0,
        }),
        last_updated: Utc::now(),
        daily_locations: body.daily_locations.unwrap_or_default(),
    };

    state.buses.create(&bus).await.map_err(|e| {
        if check_duplicate_error(&e).is_some() {
            AppError::Conflict("bus_id already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!("{} Bus {} created on route {}", API_NAME, bus_id, route_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Bus created successfully", "bus": bus })),
    ))
}

#[derive(Debug, Deserialize)]
struct UpdateBusRequest {
    route_id: Option<i64>,
    current_location: Option<GeoPoint>,
    status: Option<String>,
    #[serde(rename = "dailyLocations")]
    daily_locations: Option<Vec<DailyLocation>>,
}

// PUT /admin/buses/:bus_id: read, apply the patch, write the whole record
async fn update_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bus_id): Path<i64>,
    Json(body): Json<UpdateBusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::BusUpdate)?;

    let mut bus = state
        .buses
        .find_one(bus_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    if let Some(route_id) = body.route_id {
        bus.route_id = route_id;
    }
    if let Some(location) = body.current_location {
        bus.current_location = location;
    }
    if let Some(raw) = body.status.as_deref() {
        bus.status = BusStatus::parse(raw).ok_or_else(|| {
            AppError::Validation("status must be \"On Time\" or \"Delayed\"".to_string())
        })?;
    }
    if let Some(daily) = body.daily_locations {
        bus.daily_locations = daily;
    }
    bus.last_updated = Utc::now();

    state.buses.save(&bus).await?;

    Ok(Json(json!({ "message": "Bus updated successfully", "bus": bus })))
}

// DELETE /admin/buses/:bus_id
async fn delete_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bus_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::BusDelete)?;

    let deleted = state.buses.delete(bus_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Bus not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Bus deleted successfully",
        "deletedBusId": bus_id
    })))
}

#[derive(Debug, Deserialize)]
struct CreateTripRequest {
    route_id: Option<i64>,
    bus_id: Option<i64>,
    #[serde(rename = "startTime")]
    start_time: Option<String>,
    status: Option<String>,
}

// POST /admin/trips
async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    authorize(&claims, Action::TripCreate)?;

    let (route_id, bus_id, raw_start) = match (body.route_id, body.bus_id, body.start_time) {
        (Some(route_id), Some(bus_id), Some(start)) => (route_id, bus_id, start),
        _ => {
            return Err(AppError::Validation(
                "route_id, bus_id and startTime are required".to_string(),
            ))
        }
    };
    let start_time = parse_iso_timestamp(&raw_start, "startTime")?;

    let status = match body.status.as_deref() {
        Some(raw) => TripStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(
                "status must be one of scheduled, active, completed, cancelled".to_string(),
            )
        })?,
        None => TripStatus::Scheduled,
    };

    let trip = state
        .trips
        .create(route_id, bus_id, start_time, status)
        .await?;

    tracing::info!("{} Trip {} created for bus {}", API_NAME, trip.id, bus_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": trip })),
    ))
}

#[derive(Debug, Deserialize)]
struct UpdateTripStatusRequest {
    status: Option<String>,
    #[serde(rename = "endTime")]
    end_time: Option<String>,
}

// PATCH /admin/trips/:id/status: the lifecycle is driven externally, so
// any of the four states is accepted regardless of the current one
async fn update_trip_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTripStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::TripUpdate)?;

    let status = body
        .status
        .as_deref()
        .and_then(TripStatus::parse)
        .ok_or_else(|| {
            AppError::Validation(
                "status must be one of scheduled, active, completed, cancelled".to_string(),
            )
        })?;
    let end_time = match body.end_time.as_deref() {
        Some(raw) => Some(parse_iso_timestamp(raw, "endTime")?),
        None => None,
    };

    let trip = state
        .trips
        .update_status(id, status, end_time)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    Ok(Json(json!({ "status": "success", "data": trip })))
}

// DELETE /admin/trips/:id
async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::TripDelete)?;

    let deleted = state.trips.delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Trip not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Trip deleted successfully",
        "deletedTripId": id
    })))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateAdminRequest {
    #[validate(length(min = 1, message = "username is required"))]
    username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    password: String,
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    role: Option<String>,
}

// POST /admin/users
async fn create_admin_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    authorize(&claims, Action::UserCreate)?;

    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let role = match body.role.as_deref() {
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| {
                AppError::Validation("role must be one of viewer, operator, admin".to_string())
            })?
            .as_str(),
        None => Role::Admin.as_str(),
    };

    if state.admins.exists_by_username(&body.username).await? {
        return Err(AppError::Conflict("username already exists".to_string()));
    }

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;

    let admin = state
        .admins
        .create(&body.username, &password_hash, &body.name, role)
        .await
        .map_err(|e| {
            if check_duplicate_error(&e).is_some() {
                AppError::Conflict("username already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!("{} Admin account '{}' created", API_NAME, admin.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": admin })),
    ))
}

// DELETE /admin/users/:id: an authenticated account cannot remove itself
async fn delete_admin_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&claims, Action::UserDelete)?;

    if claims.admin_id() == Some(id) {
        return Err(AppError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = state.admins.delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Admin not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Admin deleted successfully",
        "deletedAdminId": id
    })))
}
