use axum::extract::{Json, Path, State};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::{Deserialize, Serialize};

use crate::{
    errors::ApiError,
    models::basket::{
        AddToUserPayload, Basket, BasketItems, ChangeQuantityPayload, ItemPayload,
        MergeBasketsPayload, PricedBasket, PromoPayload,
    },
    routes::{auth::cookies::refresh_token_from, JsonBody},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketIdResponse {
    pub basket_id: String,
}

type BasketIdResult = Result<Json<BasketIdResponse>, ApiError>;

fn basket_id(basket_id: String) -> Json<BasketIdResponse> {
    Json(BasketIdResponse { basket_id })
}

pub async fn create_basket(State(app_state): State<AppState>) -> BasketIdResult {
    Ok(basket_id(app_state.baskets.create().await?))
}

pub async fn add_to_user(
    State(app_state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): JsonBody<AddToUserPayload>,
) -> BasketIdResult {
    let token = refresh_token_from(&jar);
    Ok(basket_id(
        app_state
            .baskets
            .attach_to_user(&payload.basket_id, token.as_deref())
            .await?,
    ))
}

pub async fn merge_baskets(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<MergeBasketsPayload>,
) -> BasketIdResult {
    Ok(basket_id(
        app_state
            .baskets
            .merge(&payload.basket_anon_id, &payload.basket_user_id)
            .await?,
    ))
}

pub async fn get_basket_items(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BasketItems>, ApiError> {
    Ok(Json(app_state.baskets.get_items(&id).await?))
}

pub async fn get_basket_full(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PricedBasket>, ApiError> {
    Ok(Json(app_state.baskets.price_basket(&id).await?))
}

pub async fn clear_basket(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> BasketIdResult {
    Ok(basket_id(app_state.baskets.clear(&id).await?))
}

pub async fn add_item(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<ItemPayload>,
) -> BasketIdResult {
    Ok(basket_id(
        app_state.baskets.add_item(&id, &payload.game_title).await?,
    ))
}

pub async fn change_quantity(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<ChangeQuantityPayload>,
) -> BasketIdResult {
    Ok(basket_id(
        app_state
            .baskets
            .change_quantity(&id, &payload.item_updates)
            .await?,
    ))
}

pub async fn remove_item(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<ItemPayload>,
) -> BasketIdResult {
    Ok(basket_id(
        app_state
            .baskets
            .remove_item(&id, &payload.game_title)
            .await?,
    ))
}

pub async fn add_promo(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<PromoPayload>,
) -> BasketIdResult {
    Ok(basket_id(
        app_state.baskets.add_promo(&id, &payload.promo).await?,
    ))
}

pub async fn delete_promo(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Basket>, ApiError> {
    Ok(Json(app_state.baskets.delete_promo(&id).await?))
}
