use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::db::refresh_token_repository::RefreshTokenRepository;
use crate::errors::ApiError;
use crate::models::{
    claims::{Claims, TokenUse},
    refresh_token::RefreshTokenRecord,
    user::Identity,
};
use crate::utils::{
    fingerprint::token_fingerprint,
    jwt::{create_jwt, decode_jwt, JwtKeys, TokenKeys},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and checks the access/refresh pair and keeps the one stored
/// refresh token per user.
pub struct TokenService {
    keys: TokenKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    repo: Arc<dyn RefreshTokenRepository>,
}

impl TokenService {
    pub fn new(
        keys: TokenKeys,
        settings: &JwtSettings,
        repo: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            keys,
            access_ttl: Duration::minutes(settings.access_ttl_minutes),
            refresh_ttl: Duration::days(settings.refresh_ttl_days),
            repo,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.sign(identity, TokenUse::Access)?,
            refresh_token: self.sign(identity, TokenUse::Refresh)?,
        })
    }

    fn sign(&self, identity: &Identity, token_use: TokenUse) -> Result<String, ApiError> {
        let (keys, ttl) = match token_use {
            TokenUse::Access => (&self.keys.access, self.access_ttl),
            TokenUse::Refresh => (&self.keys.refresh, self.refresh_ttl),
        };
        let now = Utc::now();
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            is_activated: identity.is_activated,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            token_use,
        };
        Ok(create_jwt(&claims, keys)?)
    }

    pub fn verify_access(&self, token: &str) -> Option<Identity> {
        verify(token, &self.keys.access, TokenUse::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Option<Identity> {
        verify(token, &self.keys.refresh, TokenUse::Refresh)
    }

    pub async fn persist(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<RefreshTokenRecord, ApiError> {
        Ok(self
            .repo
            .upsert_token(user_id, &token_fingerprint(refresh_token))
            .await?)
    }

    /// Returns how many stored tokens were deleted; zero is not an error.
    pub async fn revoke(&self, refresh_token: &str) -> Result<u64, ApiError> {
        Ok(self
            .repo
            .delete_by_hash(&token_fingerprint(refresh_token))
            .await?)
    }

    pub async fn revoke_for_user(&self, user_id: Uuid) -> Result<u64, ApiError> {
        Ok(self.repo.delete_for_user(user_id).await?)
    }

    pub async fn lookup(&self, refresh_token: &str) -> Result<Option<RefreshTokenRecord>, ApiError> {
        Ok(self
            .repo
            .find_by_hash(&token_fingerprint(refresh_token))
            .await?)
    }
}

fn verify(token: &str, keys: &JwtKeys, expected: TokenUse) -> Option<Identity> {
    let data = match decode_jwt(token, keys) {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!(?err, ?expected, "token rejected");
            return None;
        }
    };
    (data.claims.token_use == expected).then(|| data.claims.identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_db::MemoryDb;
    use crate::state::test_support::test_config;

    fn service() -> (TokenService, Arc<MemoryDb>) {
        let config = test_config();
        let db = Arc::new(MemoryDb::new());
        let keys = TokenKeys::from_settings(&config.jwt).unwrap();
        (TokenService::new(keys, &config.jwt, db.clone()), db)
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            is_activated: false,
        }
    }

    #[test]
    fn issued_tokens_verify_against_their_own_key_only() {
        let (tokens, _) = service();
        let who = identity();
        let pair = tokens.issue(&who).unwrap();

        assert_eq!(tokens.verify_access(&pair.access_token), Some(who.clone()));
        assert_eq!(tokens.verify_refresh(&pair.refresh_token), Some(who));
        assert_eq!(tokens.verify_access(&pair.refresh_token), None);
        assert_eq!(tokens.verify_refresh(&pair.access_token), None);
    }

    #[test]
    fn garbage_does_not_verify() {
        let (tokens, _) = service();
        assert_eq!(tokens.verify_access("not.a.token"), None);
        assert_eq!(tokens.verify_refresh(""), None);
    }

    #[test]
    fn two_issues_in_the_same_second_differ() {
        let (tokens, _) = service();
        let who = identity();
        let first = tokens.issue(&who).unwrap();
        let second = tokens.issue(&who).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);
    }

    #[tokio::test]
    async fn persist_overwrites_and_revoke_removes() {
        let (tokens, _) = service();
        let who = identity();
        let first = tokens.issue(&who).unwrap();
        let second = tokens.issue(&who).unwrap();

        tokens.persist(who.id, &first.refresh_token).await.unwrap();
        tokens.persist(who.id, &second.refresh_token).await.unwrap();

        assert!(tokens.lookup(&first.refresh_token).await.unwrap().is_none());
        let record = tokens.lookup(&second.refresh_token).await.unwrap().unwrap();
        assert_eq!(record.user_id, who.id);
        assert_ne!(record.token_hash, second.refresh_token);

        assert_eq!(tokens.revoke(&second.refresh_token).await.unwrap(), 1);
        assert_eq!(tokens.revoke(&second.refresh_token).await.unwrap(), 0);
        assert!(tokens.lookup(&second.refresh_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal_errors() {
        let (tokens, db) = service();
        db.set_should_fail(true);
        let err = tokens.lookup("anything").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
