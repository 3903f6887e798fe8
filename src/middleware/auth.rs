//! Bearer-token verification.
//!
//! Tokens are HS256-signed and carry the subject admin id plus its role;
//! verification failure of any kind maps to 401.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Admin;
use crate::policy::{self, Action, Role};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject admin id.
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn admin_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub fn issue_token(admin: &Admin, secret: &str, expire_hours: u64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin.id.to_string(),
        role: admin.role.clone(),
        iat: now.timestamp() as u64,
        exp: (now + Duration::hours(expire_hours as i64)).timestamp() as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Not authorized. Invalid token.".to_string()))
}

/// Extracts and verifies the `Authorization: Bearer` token, making the
/// claims available to handlers through request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authorized. Missing token.".to_string()))?;

    let claims = verify_token(token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Policy check for a verified caller. A role the policy table does not
/// allow for `action` is a 403, never a silent pass.
pub fn authorize(claims: &Claims, action: Action) -> Result<Role, AppError> {
    let role = Role::parse(&claims.role)
        .ok_or_else(|| AppError::Forbidden("Role not permitted".to_string()))?;
    if !policy::is_allowed(role, action) {
        return Err(AppError::Forbidden("Role not permitted".to_string()));
    }
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_admin() -> Admin {
        Admin {
            id: 7,
            username: "admin".to_string(),
            password_hash: "x".to_string(),
            name: "Test Admin".to_string(),
            role: "admin".to_string(),
            is_active: true,
            last_login: None,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let admin = test_admin();
        let token = issue_token(&admin, "test-secret", 24).unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.admin_id(), Some(7));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let admin = test_admin();
        let token = issue_token(&admin, "test-secret", 24).unwrap();

        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("not-a-token", "test-secret").is_err());
    }

    #[test]
    fn authorize_rejects_unknown_and_insufficient_roles() {
        let mut claims = Claims {
            sub: "7".to_string(),
            role: "ghost".to_string(),
            iat: 0,
            exp: u64::MAX,
        };
        assert!(authorize(&claims, Action::BusCreate).is_err());

        claims.role = "operator".to_string();
        assert!(authorize(&claims, Action::BusCreate).is_err());
        assert!(authorize(&claims, Action::TripUpdate).is_ok());
    }
}
