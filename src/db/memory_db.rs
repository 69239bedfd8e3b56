use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{
    address_repository::AddressRepository, basket_repository::BasketRepository,
    product_repository::ProductRepository, refresh_token_repository::RefreshTokenRepository,
    user_repository::UserRepository,
};
use crate::models::{
    address::Address,
    basket::Basket,
    product::{Product, ProductFilter, ProductSummary},
    refresh_token::RefreshTokenRecord,
    user::{NewUser, ProfileUpdate, User},
};

/// Process-local store implementing every repository. Used when no
/// `DATABASE_URL` is configured and as the backing store of the test suite.
#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<HashMap<Uuid, User>>,
    baskets: Mutex<HashMap<String, Basket>>,
    products: Mutex<BTreeMap<String, Product>>,
    addresses: Mutex<HashMap<Uuid, Address>>,
    refresh_tokens: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
    failing_titles: Mutex<HashSet<String>>,
    should_fail: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, sqlx::Error> {
    mutex
        .lock()
        .map_err(|_| sqlx::Error::Protocol("memory store lock poisoned".into()))
}

fn sample(candidates: &[Product], count: usize) -> Vec<Product> {
    let mut rng = rand::rng();
    candidates.choose_multiple(&mut rng, count).cloned().collect()
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let db = Self::default();
        if let Ok(mut stored) = db.products.lock() {
            for product in products {
                stored.insert(product.game_title.clone(), product);
            }
        }
        db
    }

    /// Makes every subsequent call fail the way a dropped connection would.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes product lookups for `title` fail while the rest of the store
    /// keeps working.
    pub fn fail_product_lookup(&self, title: &str) {
        if let Ok(mut failing) = self.failing_titles.lock() {
            failing.insert(title.to_string());
        }
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }

    fn find_user_where(
        &self,
        predicate: impl Fn(&User) -> bool,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.users)?.values().find(|u| predicate(u)).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.users)?.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.find_user_where(|user| user.email == email)
    }

    async fn find_user_by_activation_link(
        &self,
        activation_link: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.find_user_where(|user| user.activation_link == activation_link)
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find_user_where(|user| user.email == email)?.is_some())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        self.check()?;
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            ));
        }
        let user = new_user.into_user();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_user_activated(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.check()?;
        if let Some(user) = lock(&self.users)?.get_mut(&user_id) {
            user.is_activated = true;
        }
        Ok(())
    }

    async fn assign_basket(&self, user_id: Uuid, basket_id: &str) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut users = lock(&self.users)?;
        match users.get_mut(&user_id) {
            Some(user) if user.basket_id.is_none() => {
                user.basket_id = Some(basket_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        let mut users = lock(&self.users)?;
        Ok(users.get_mut(&user_id).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }

    async fn remove_address_reference(
        &self,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        self.check()?;
        if let Some(user) = lock(&self.users)?.get_mut(&user_id) {
            user.billing_address_ids.retain(|id| *id != address_id);
            user.shipping_address_ids.retain(|id| *id != address_id);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let removed = lock(&self.users)?.remove(&user_id).is_some();
        if removed {
            // Mirrors ON DELETE CASCADE on refresh_tokens.
            lock(&self.refresh_tokens)?.remove(&user_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl BasketRepository for MemoryDb {
    async fn create_basket(&self, basket: &Basket) -> Result<(), sqlx::Error> {
        self.check()?;
        let mut baskets = lock(&self.baskets)?;
        if baskets.contains_key(&basket.basket_id) {
            return Err(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint \"baskets_pkey\"".into(),
            ));
        }
        baskets.insert(basket.basket_id.clone(), basket.clone());
        Ok(())
    }

    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.baskets)?.get(basket_id).cloned())
    }

    async fn save_basket(&self, basket: &Basket) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut baskets = lock(&self.baskets)?;
        match baskets.get_mut(&basket.basket_id) {
            Some(stored) => {
                *stored = basket.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_basket(&self, basket_id: &str) -> Result<bool, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.baskets)?.remove(basket_id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryDb {
    async fn find_product_by_title(&self, title: &str) -> Result<Option<Product>, sqlx::Error> {
        self.check()?;
        if lock(&self.failing_titles)?.contains(title) {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(lock(&self.products)?.get(title).cloned())
    }

    async fn sample_products(
        &self,
        count: usize,
        discounted_only: bool,
    ) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        let candidates: Vec<Product> = lock(&self.products)?
            .values()
            .filter(|p| !discounted_only || p.discount_price.is_some())
            .cloned()
            .collect();
        Ok(sample(&candidates, count))
    }

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.products)?
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, sqlx::Error> {
        self.check()?;
        let needle = query.to_lowercase();
        Ok(lock(&self.products)?
            .values()
            .filter(|p| p.game_title.to_lowercase().contains(&needle))
            .take(limit)
            .map(ProductSummary::from)
            .collect())
    }
}

#[async_trait]
impl AddressRepository for MemoryDb {
    async fn create_address(&self, address: &Address) -> Result<(), sqlx::Error> {
        self.check()?;
        lock(&self.addresses)?.insert(address.id, address.clone());
        Ok(())
    }

    async fn find_addresses(&self, ids: &[Uuid]) -> Result<Vec<Address>, sqlx::Error> {
        self.check()?;
        let addresses = lock(&self.addresses)?;
        Ok(ids.iter().filter_map(|id| addresses.get(id).cloned()).collect())
    }

    async fn update_address(&self, address: &Address) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut addresses = lock(&self.addresses)?;
        match addresses.get_mut(&address.id) {
            Some(stored) if stored.kind == address.kind => {
                *stored = address.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_addresses(&self, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        self.check()?;
        let mut addresses = lock(&self.addresses)?;
        Ok(ids.iter().filter(|id| addresses.remove(id).is_some()).count() as u64)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryDb {
    async fn upsert_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<RefreshTokenRecord, sqlx::Error> {
        self.check()?;
        let record = RefreshTokenRecord {
            user_id,
            token_hash: token_hash.to_string(),
            updated_at: OffsetDateTime::now_utc(),
        };
        lock(&self.refresh_tokens)?.insert(user_id, record.clone());
        Ok(record)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, sqlx::Error> {
        self.check()?;
        Ok(lock(&self.refresh_tokens)?
            .values()
            .find(|record| record.token_hash == token_hash)
            .cloned())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<u64, sqlx::Error> {
        self.check()?;
        let mut tokens = lock(&self.refresh_tokens)?;
        let before = tokens.len();
        tokens.retain(|_, record| record.token_hash != token_hash);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        self.check()?;
        Ok(u64::from(lock(&self.refresh_tokens)?.remove(&user_id).is_some()))
    }
}
