use async_trait::async_trait;
use uuid::Uuid;

use crate::models::refresh_token::RefreshTokenRecord;

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert or overwrite the one stored token of `user_id`.
    async fn upsert_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<RefreshTokenRecord, sqlx::Error>;
    async fn find_by_hash(&self, token_hash: &str)
        -> Result<Option<RefreshTokenRecord>, sqlx::Error>;
    async fn delete_by_hash(&self, token_hash: &str) -> Result<u64, sqlx::Error>;
    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;
}
