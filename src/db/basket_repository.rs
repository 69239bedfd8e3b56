use async_trait::async_trait;

use crate::models::basket::Basket;

#[async_trait]
pub trait BasketRepository: Send + Sync {
    async fn create_basket(&self, basket: &Basket) -> Result<(), sqlx::Error>;
    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>, sqlx::Error>;
    /// Overwrites items and promo. Returns `false` if the basket vanished.
    async fn save_basket(&self, basket: &Basket) -> Result<bool, sqlx::Error>;
    async fn delete_basket(&self, basket_id: &str) -> Result<bool, sqlx::Error>;
}
