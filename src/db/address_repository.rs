use async_trait::async_trait;
use uuid::Uuid;

use crate::models::address::Address;

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn create_address(&self, address: &Address) -> Result<(), sqlx::Error>;
    async fn find_addresses(&self, ids: &[Uuid]) -> Result<Vec<Address>, sqlx::Error>;
    async fn update_address(&self, address: &Address) -> Result<bool, sqlx::Error>;
    async fn delete_addresses(&self, ids: &[Uuid]) -> Result<u64, sqlx::Error>;
}
