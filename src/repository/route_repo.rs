use sqlx::PgPool;

use crate::models::Route;

#[derive(Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_one(&self, route_id: i64) -> Result<Option<Route>, sqlx::Error> {
        sqlx::query_as::<_, Route>("SELECT route_id, name FROM routes WHERE route_id = $1")
            .bind(route_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn exists(&self, route_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM routes WHERE route_id = $1)")
            .bind(route_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Paginated listing with an optional case-insensitive name filter.
    pub async fn find(
        &self,
        name_filter: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Route>, sqlx::Error> {
        match name_filter {
            Some(pattern) => {
                sqlx::query_as::<_, Route>(
                    "SELECT route_id, name FROM routes WHERE name ILIKE $1 \
                     ORDER BY route_id OFFSET $2 LIMIT $3",
                )
                .bind(format!("%{}%", pattern))
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Route>(
                    "SELECT route_id, name FROM routes ORDER BY route_id OFFSET $1 LIMIT $2",
                )
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    pub async fn count(&self, name_filter: Option<&str>) -> Result<i64, sqlx::Error> {
        match name_filter {
            Some(pattern) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM routes WHERE name ILIKE $1")
                    .bind(format!("%{}%", pattern))
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM routes")
                    .fetch_one(&self.pool)
                    .await
            }
        }
    }

    pub async fn create(&self, route: &Route) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO routes (route_id, name) VALUES ($1, $2)")
            .bind(route.route_id)
            .bind(&route.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Routes referenced by buses or trips are immutable except for rename.
    pub async fn rename(&self, route_id: i64, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE routes SET name = $1 WHERE route_id = $2")
            .bind(name)
            .bind(route_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, route_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routes WHERE route_id = $1")
            .bind(route_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
