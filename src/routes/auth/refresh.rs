use axum::extract::{Json, State};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    errors::ApiError,
    routes::auth::cookies::{refresh_cookie, refresh_token_from},
    services::auth_service::AuthResponse,
    state::AppState,
};

pub async fn handle_refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let token = refresh_token_from(&jar);
    let response = app_state.auth.refresh(token.as_deref()).await?;
    let jar = jar.add(refresh_cookie(&app_state, response.refresh_token.clone()));
    Ok((jar, Json(response)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::handle_refresh;
    use crate::state::{test_support::test_state_with_db, AppState};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/refresh", get(handle_refresh))
            .with_state(state)
    }

    fn request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri("/refresh");
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("refreshToken={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn refresh_rotates_cookie() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;

        let res = app(harness.state.clone())
            .oneshot(request(Some(&pair.refresh_token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let rotated = json["refreshToken"].as_str().unwrap();
        assert_ne!(rotated, pair.refresh_token);
        assert!(cookie.contains(rotated));
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let harness = test_state_with_db();
        let res = app(harness.state).oneshot(request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn revoked_token_is_unauthorized() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;
        harness
            .state
            .auth
            .logout(Some(&pair.refresh_token))
            .await
            .unwrap();

        let res = app(harness.state.clone())
            .oneshot(request(Some(&pair.refresh_token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
