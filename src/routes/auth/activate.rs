use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{errors::ApiError, responses::JsonResponse, state::AppState};

pub async fn handle_activate(
    State(app_state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Response, ApiError> {
    app_state.auth.activate(&link).await?;
    Ok(JsonResponse::success("User successfully activated").into_response())
}
