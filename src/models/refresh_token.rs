use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The single stored refresh token of a user. Only the SHA-256 fingerprint
/// of the token is kept.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub token_hash: String,
    pub updated_at: OffsetDateTime,
}
