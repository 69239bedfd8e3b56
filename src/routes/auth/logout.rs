use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    errors::ApiError,
    responses::JsonResponse,
    routes::auth::cookies::{clear_refresh_cookie, refresh_token_from},
    state::AppState,
};

pub async fn handle_logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let token = refresh_token_from(&jar);
    let revoked = app_state.auth.logout(token.as_deref()).await?;
    tracing::debug!(revoked, "logout");

    let jar = clear_refresh_cookie(jar);
    Ok((jar, JsonResponse::success("Logged out")).into_response())
}
