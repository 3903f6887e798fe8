use axum::{extract::State, response::Json, routing::post, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::middleware::auth::issue_token;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

// Unknown username, wrong password and disabled account all answer with the
// same 401 so the status code never leaks whether an account exists.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(AppError::Validation(
                "username & password required".to_string(),
            ))
        }
    };

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let admin = state
        .admins
        .find_by_username(&username)
        .await?
        .ok_or_else(invalid)?;

    if !admin.is_active {
        return Err(invalid());
    }

    let ok = bcrypt::verify(&password, &admin.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))?;
    if !ok {
        return Err(invalid());
    }

    state.admins.touch_last_login(admin.id, Utc::now()).await?;

    let token = issue_token(
        &admin,
        &state.config.jwt_secret,
        state.config.jwt_expire_hours,
    )?;

    tracing::info!("{} Login: {}", API_NAME, admin.username);

    Ok(Json(json!({
        "status": "success",
        "token": token,
        "admin": {
            "id": admin.id,
            "username": admin.username,
            "name": admin.name,
            "role": admin.role
        }
    })))
}
