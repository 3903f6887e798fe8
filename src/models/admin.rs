use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An admin-console account. The password hash is write-only: it is never
/// serialized into a response body.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<DateTime<Utc>>,
}
