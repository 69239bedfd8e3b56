use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::refresh_token_repository::RefreshTokenRepository;
use crate::models::refresh_token::RefreshTokenRecord;

pub struct PostgresRefreshTokenRepository {
    pub pool: PgPool,
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn upsert_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<RefreshTokenRecord, sqlx::Error> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET
                token_hash = EXCLUDED.token_hash,
                updated_at = now()
            RETURNING user_id, token_hash, updated_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, sqlx::Error> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT user_id, token_hash, updated_at FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
