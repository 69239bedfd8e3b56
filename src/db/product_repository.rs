use async_trait::async_trait;

use crate::models::product::{Product, ProductFilter, ProductSummary};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_product_by_title(&self, title: &str) -> Result<Option<Product>, sqlx::Error>;
    async fn sample_products(
        &self,
        count: usize,
        discounted_only: bool,
    ) -> Result<Vec<Product>, sqlx::Error>;
    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error>;
    /// Case-insensitive substring match on the title.
    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, sqlx::Error>;
}
