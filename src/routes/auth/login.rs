use axum::extract::{Json, State};
use axum_extra::extract::{cookie::CookieJar, WithRejection};

use crate::{
    errors::ApiError,
    models::registration::LoginPayload,
    routes::{auth::cookies::refresh_cookie, JsonBody},
    services::auth_service::AuthResponse,
    state::AppState,
};

pub async fn handle_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): JsonBody<LoginPayload>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let response = app_state.auth.login(payload).await?;
    let jar = jar.add(refresh_cookie(&app_state, response.refresh_token.clone()));
    Ok((jar, Json(response)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::handle_login;
    use crate::state::test_support::test_state_with_db;

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let harness = test_state_with_db();
        harness.registered_user("ada@example.com").await;
        let app = Router::new()
            .route("/login", post(handle_login))
            .with_state(harness.state.clone());

        let res = app
            .oneshot(login_request("ada@example.com", "analytical"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::SET_COOKIE).is_some());

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["user"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let harness = test_state_with_db();
        harness.registered_user("ada@example.com").await;
        let app = Router::new()
            .route("/login", post(handle_login))
            .with_state(harness.state.clone());

        let res = app
            .oneshot(login_request("ada@example.com", "nope"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().get(header::SET_COOKIE).is_none());

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_db_failure_is_500() {
        let harness = test_state_with_db();
        harness.db.set_should_fail(true);
        let app = Router::new()
            .route("/login", post(handle_login))
            .with_state(harness.state.clone());

        let res = app
            .oneshot(login_request("ada@example.com", "analytical"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
