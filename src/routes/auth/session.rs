use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{errors::ApiError, models::user::Identity, state::AppState};

/// The caller behind a valid `Authorization: Bearer <access token>`.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub Identity);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        state
            .tokens
            .verify_access(bearer.token())
            .map(AuthSession)
            .ok_or(ApiError::Unauthorized)
    }
}
