use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub game_title: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub dev_company: String,
    pub header_img: Option<String>,
    pub game_genre: Vec<String>,
    pub game_theme: Vec<String>,
    pub category: Vec<String>,
}

impl Product {
    /// The price a shopper actually pays before promos.
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub game_title: String,
    pub header_img: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        ProductSummary {
            game_title: product.game_title.clone(),
            header_img: product.header_img.clone(),
            price: product.price,
            discount_price: product.discount_price,
        }
    }
}

/// Repository-level filter. Every listed tag/theme/genre must be present on
/// a product; the price bounds apply to the effective price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub tags: Vec<String>,
    pub themes: Vec<String>,
    pub genres: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let has_all = |wanted: &[String], present: &[String]| {
            wanted.iter().all(|value| present.contains(value))
        };
        let price = product.effective_price();
        has_all(&self.tags, &product.category)
            && has_all(&self.themes, &product.game_theme)
            && has_all(&self.genres, &product.game_genre)
            && self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    GameTitle,
    Price,
    DevCompany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Up,
    Down,
}

/// Body of `POST /product/catalog`. Sort fields stay strings so unknown
/// values surface as a 400 with a readable message instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub page_number: u32,
    pub page_limit: u32,
    pub sort_column: String,
    pub sort_direction: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogFilters {
    pub themes: Vec<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub filters: CatalogFilters,
    pub total_products: usize,
}
