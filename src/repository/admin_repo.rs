use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::Admin;

const ADMIN_COLUMNS: &str = "id, username, password_hash, name, role, is_active, last_login";

#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE username = $1",
            ADMIN_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE id = $1",
            ADMIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
        role: &str,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (username, password_hash, name, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn touch_last_login(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE admins SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
