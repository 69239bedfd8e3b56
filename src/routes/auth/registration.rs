use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};

use crate::{
    errors::ApiError,
    models::registration::RegistrationPayload,
    routes::{auth::cookies::refresh_cookie, JsonBody},
    services::auth_service::AuthResponse,
    state::AppState,
};

pub async fn handle_registration(
    State(app_state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): JsonBody<RegistrationPayload>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let response = app_state.auth.register(payload).await?;
    let jar = jar.add(refresh_cookie(&app_state, response.refresh_token.clone()));
    Ok((StatusCode::CREATED, jar, Json(response)))
}
