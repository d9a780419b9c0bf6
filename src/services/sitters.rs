use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{SitterSpec, UpdateSitterSpecRequest};

/// Sitter listings backed by the `sitter_spec` table.
#[derive(Clone)]
pub struct SitterService {
    pool: PgPool,
}

impl SitterService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a default-valued listing for a username. Idempotent: an
    /// existing listing is returned unchanged.
    pub async fn create(&self, username: &str) -> Result<SitterSpec, ApiError> {
        let inserted = sqlx::query_as::<_, SitterSpec>(
            r#"
            INSERT INTO sitter_spec (username)
            VALUES ($1)
            ON CONFLICT (username) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(spec) => {
                tracing::info!("Created sitter listing for {}", username);
                Ok(spec)
            }
            None => self.find_by_username(username).await,
        }
    }

    pub async fn find_all(&self) -> Result<Vec<SitterSpec>, ApiError> {
        let specs = sqlx::query_as::<_, SitterSpec>("SELECT * FROM sitter_spec ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(specs)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<SitterSpec, ApiError> {
        sqlx::query_as::<_, SitterSpec>("SELECT * FROM sitter_spec WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Sitter spec not found for username: {}", username))
            })
    }

    /// Merge the supplied fields into the listing.
    pub async fn update(
        &self,
        username: &str,
        req: UpdateSitterSpecRequest,
    ) -> Result<SitterSpec, ApiError> {
        let existing = self.find_by_username(username).await?;

        let spec = sqlx::query_as::<_, SitterSpec>(
            r#"
            UPDATE sitter_spec
            SET price = $2, rating = $3, available = $4, description = $5,
                specialties = $6, pet_sat_count = $7, experience = $8, response_time = $9
            WHERE username = $1
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(req.price.unwrap_or(existing.price))
        .bind(req.rating.unwrap_or(existing.rating))
        .bind(req.available.unwrap_or(existing.available))
        .bind(req.description.unwrap_or(existing.description))
        .bind(req.specialties.unwrap_or(existing.specialties))
        .bind(req.pet_sat_count.unwrap_or(existing.pet_sat_count))
        .bind(req.experience.unwrap_or(existing.experience))
        .bind(req.response_time.unwrap_or(existing.response_time))
        .fetch_one(&self.pool)
        .await?;

        Ok(spec)
    }

    pub async fn delete(&self, username: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM sitter_spec WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Sitter spec not found for username: {}",
                username
            )));
        }

        Ok(())
    }
}
