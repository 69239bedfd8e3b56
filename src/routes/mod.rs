pub mod auth;
pub mod basket;
pub mod product;
pub mod user;

use axum::{
    extract::{Json, Path, Query},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, patch, post},
    Router,
};
use axum_extra::extract::WithRejection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{errors::ApiError, state::AppState};

/// Extractors whose rejections render as `ApiError` bodies instead of
/// axum's plain-text responses.
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;
pub type QueryParams<T> = WithRejection<Query<T>, ApiError>;
pub type PathParam<T> = WithRejection<Path<T>, ApiError>;

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(err) => {
            tracing::warn!(%err, %frontend_origin, "invalid FRONTEND_ORIGIN; cross-origin requests disabled");
            cors
        }
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(auth::handle_registration))
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .route("/activate/{link}", get(auth::handle_activate))
        .route("/refresh", get(auth::handle_refresh))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route(
            "/user/address/billing",
            get(user::get_billing_addresses).put(user::update_billing_addresses),
        )
        .route(
            "/user/address/shipping",
            get(user::get_shipping_addresses).put(user::update_shipping_addresses),
        )
        .route("/user/address/{id}", delete(user::delete_address))
}

fn basket_routes() -> Router<AppState> {
    Router::new()
        .route("/basket/create", post(basket::create_basket))
        .route("/basket/add-to-user", post(basket::add_to_user))
        .route("/basket/merge-baskets", post(basket::merge_baskets))
        .route("/basket/{id}/get-basket-items", get(basket::get_basket_items))
        .route("/basket/{id}/get-basket-full", get(basket::get_basket_full))
        .route("/basket/{id}/clear", delete(basket::clear_basket))
        .route("/basket/{id}/add-item", post(basket::add_item))
        .route("/basket/{id}/change-quantity", patch(basket::change_quantity))
        .route("/basket/{id}/remove-item", post(basket::remove_item))
        .route("/basket/{id}/add-promo", post(basket::add_promo))
        .route("/basket/{id}/delete-promo", delete(basket::delete_promo))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product/catalog", post(product::get_catalog))
        .route("/product/{title}", get(product::get_product))
        .route("/random-products", get(product::random_products))
        .route(
            "/random-products-discount",
            get(product::random_discounted_products),
        )
        .route("/categories", get(product::all_categories))
        .route("/top-categories", get(product::top_categories))
        .route("/top-genres", get(product::top_genres))
        .route("/top-themes", get(product::top_themes))
        .route("/search", get(product::search))
}

/// Every route under `/api`, with CORS and request tracing. Rate limiting
/// needs the peer address and is layered on in `main`.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_origin);

    let api = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(basket_routes())
        .merge(product_routes());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
