use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        address::{Address, AddressKind, AddressUpdate},
        user::{ProfileUpdate, User},
    },
    responses::JsonResponse,
    routes::{
        auth::{cookies::clear_refresh_cookie, session::AuthSession},
        JsonBody, PathParam,
    },
    state::AppState,
};

pub async fn get_user(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
) -> Result<Json<User>, ApiError> {
    Ok(Json(app_state.users.get_profile(identity.id).await?))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
    WithRejection(Json(update), _): JsonBody<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        app_state.users.update_profile(identity.id, update).await?,
    ))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    app_state.users.delete_account(identity.id).await?;
    Ok((clear_refresh_cookie(jar), JsonResponse::success("Account deleted")).into_response())
}

async fn list(
    app_state: &AppState,
    user_id: Uuid,
    kind: AddressKind,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(app_state.users.list_addresses(user_id, kind).await?))
}

async fn update(
    app_state: &AppState,
    user_id: Uuid,
    kind: AddressKind,
    updates: Vec<AddressUpdate>,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(
        app_state
            .users
            .update_addresses(user_id, kind, updates)
            .await?,
    ))
}

pub async fn get_billing_addresses(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
) -> Result<Json<Vec<Address>>, ApiError> {
    list(&app_state, identity.id, AddressKind::Billing).await
}

pub async fn get_shipping_addresses(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
) -> Result<Json<Vec<Address>>, ApiError> {
    list(&app_state, identity.id, AddressKind::Shipping).await
}

pub async fn update_billing_addresses(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
    WithRejection(Json(updates), _): JsonBody<Vec<AddressUpdate>>,
) -> Result<Json<Vec<Address>>, ApiError> {
    update(&app_state, identity.id, AddressKind::Billing, updates).await
}

pub async fn update_shipping_addresses(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
    WithRejection(Json(updates), _): JsonBody<Vec<AddressUpdate>>,
) -> Result<Json<Vec<Address>>, ApiError> {
    update(&app_state, identity.id, AddressKind::Shipping, updates).await
}

pub async fn delete_address(
    State(app_state): State<AppState>,
    AuthSession(identity): AuthSession,
    WithRejection(Path(address_id), _): PathParam<Uuid>,
) -> Result<Response, ApiError> {
    app_state
        .users
        .delete_address(identity.id, address_id)
        .await?;
    Ok(JsonResponse::success("Address deleted").into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::test_support::{test_state_with_db, TestHarness};

    async fn call(
        harness: &TestHarness,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app: Router = router(harness.state.clone());
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn profile_requires_bearer_token() {
        let harness = test_state_with_db();
        let (status, body) = call(&harness, Method::GET, "/api/user", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "User is not authorized");
    }

    #[tokio::test]
    async fn profile_hides_secrets() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;

        let (status, body) = call(
            &harness,
            Method::GET,
            "/api/user",
            Some(&pair.access_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("passwordHash").is_none());
        assert!(body.get("activationLink").is_none());
    }

    #[tokio::test]
    async fn profile_update_and_address_flow() {
        let harness = test_state_with_db();
        let (user, pair) = harness.registered_user("ada@example.com").await;
        let token = Some(pair.access_token.as_str());

        let (status, body) = call(
            &harness,
            Method::PUT,
            "/api/user",
            token,
            Some(json!({ "firstName": "Augusta" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["firstName"], "Augusta");

        let (status, body) = call(
            &harness,
            Method::GET,
            "/api/user/address/billing",
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["kind"], "billing");

        let mut address = body[0].clone();
        address["street"] = json!("Baker Street 221b");
        let (status, body) = call(
            &harness,
            Method::PUT,
            "/api/user/address/billing",
            token,
            Some(json!([address])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["street"], "Baker Street 221b");

        let uri = format!("/api/user/address/{}", user.shipping_address_ids[0]);
        let (status, _) = call(&harness, Method::DELETE, &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(
            &harness,
            Method::GET,
            "/api/user/address/shipping",
            token,
            None,
        )
        .await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn deleted_account_token_is_rejected() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;
        let token = Some(pair.access_token.as_str());

        let (status, _) = call(&harness, Method::DELETE, "/api/user", token, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&harness, Method::GET, "/api/user", token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_address_id_is_bad_request() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;
        let (status, body) = call(
            &harness,
            Method::DELETE,
            "/api/user/address/not-a-uuid",
            Some(&pair.access_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid path parameter");
    }
}
