pub mod address_repository;
pub mod basket_repository;
pub mod memory_db;
pub mod postgres_address_repository;
pub mod postgres_basket_repository;
pub mod postgres_product_repository;
pub mod postgres_refresh_token_repository;
pub mod postgres_user_repository;
pub mod product_repository;
pub mod refresh_token_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use self::{
    address_repository::AddressRepository, basket_repository::BasketRepository,
    memory_db::MemoryDb, postgres_address_repository::PostgresAddressRepository,
    postgres_basket_repository::PostgresBasketRepository,
    postgres_product_repository::PostgresProductRepository,
    postgres_refresh_token_repository::PostgresRefreshTokenRepository,
    postgres_user_repository::PostgresUserRepository, product_repository::ProductRepository,
    refresh_token_repository::RefreshTokenRepository, user_repository::UserRepository,
};

/// One handle per repository, all backed by the same store.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub baskets: Arc<dyn BasketRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl Database {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository { pool: pool.clone() }),
            baskets: Arc::new(PostgresBasketRepository { pool: pool.clone() }),
            products: Arc::new(PostgresProductRepository { pool: pool.clone() }),
            addresses: Arc::new(PostgresAddressRepository { pool: pool.clone() }),
            refresh_tokens: Arc::new(PostgresRefreshTokenRepository { pool }),
        }
    }

    pub fn in_memory(db: Arc<MemoryDb>) -> Self {
        Self {
            users: db.clone(),
            baskets: db.clone(),
            products: db.clone(),
            addresses: db.clone(),
            refresh_tokens: db,
        }
    }
}
