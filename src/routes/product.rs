use axum::extract::{Json, Path, Query, State};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    errors::ApiError,
    models::product::{CatalogPage, CatalogQuery, Product, ProductSummary},
    routes::{JsonBody, QueryParams},
    state::AppState,
};

const DEFAULT_SAMPLE_SIZE: usize = 10;
const MAX_SAMPLE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub num: Option<usize>,
}

impl SampleQuery {
    fn size(&self) -> usize {
        self.num
            .unwrap_or(DEFAULT_SAMPLE_SIZE)
            .clamp(1, MAX_SAMPLE_SIZE)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

pub async fn get_product(
    State(app_state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(app_state.products.get_product(&title).await?))
}

pub async fn get_catalog(
    State(app_state): State<AppState>,
    WithRejection(Json(query), _): JsonBody<CatalogQuery>,
) -> Result<Json<CatalogPage>, ApiError> {
    Ok(Json(app_state.products.catalog(query).await?))
}

pub async fn random_products(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<SampleQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(app_state.products.random_products(query.size()).await?))
}

pub async fn random_discounted_products(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<SampleQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(
        app_state
            .products
            .random_discounted_products(query.size())
            .await?,
    ))
}

pub async fn all_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(app_state.products.all_categories().await?))
}

pub async fn top_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(app_state.products.top_categories().await?))
}

pub async fn top_genres(State(app_state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(app_state.products.top_first_genres().await?))
}

pub async fn top_themes(State(app_state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(app_state.products.top_first_themes().await?))
}

pub async fn search(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<SearchQuery>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    Ok(Json(app_state.products.search(&query.query).await?))
}
