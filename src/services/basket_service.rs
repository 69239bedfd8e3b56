use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::db::{
    basket_repository::BasketRepository, product_repository::ProductRepository,
    user_repository::UserRepository,
};
use crate::errors::ApiError;
use crate::models::basket::{Basket, BasketItems, PricedBasket};
use crate::services::{pricing::price_line, token_service::TokenService};

pub struct BasketService {
    baskets: Arc<dyn BasketRepository>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    tokens: Arc<TokenService>,
    config: Arc<Config>,
}

fn new_basket_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl BasketService {
    pub fn new(
        baskets: Arc<dyn BasketRepository>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        tokens: Arc<TokenService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            baskets,
            users,
            products,
            tokens,
            config,
        }
    }

    async fn load(&self, basket_id: &str) -> Result<Basket, ApiError> {
        self.baskets
            .find_basket(basket_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Basket not found"))
    }

    async fn store(&self, basket: &Basket) -> Result<(), ApiError> {
        if !self.baskets.save_basket(basket).await? {
            return Err(ApiError::bad_request("Basket not found"));
        }
        Ok(())
    }

    pub async fn create(&self) -> Result<String, ApiError> {
        let basket = Basket::empty(new_basket_id());
        self.baskets.create_basket(&basket).await?;
        tracing::info!(basket_id = %basket.basket_id, "basket created");
        Ok(basket.basket_id)
    }

    /// Binds an existing basket to the user behind `refresh_token`.
    pub async fn attach_to_user(
        &self,
        basket_id: &str,
        refresh_token: Option<&str>,
    ) -> Result<String, ApiError> {
        let identity = refresh_token
            .and_then(|token| self.tokens.verify_refresh(token))
            .ok_or(ApiError::Unauthorized)?;
        let user = self
            .users
            .find_user_by_id(identity.id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let basket = self.load(basket_id).await?;
        if user.basket_id.is_some() {
            return Err(ApiError::bad_request("User already has a basket."));
        }
        if !self.users.assign_basket(user.id, &basket.basket_id).await? {
            // Lost the race against a concurrent attach.
            return Err(ApiError::bad_request("User already has a basket."));
        }

        tracing::info!(%basket_id, user_id = %user.id, "basket attached to user");
        Ok(basket.basket_id)
    }

    /// Adds every quantity of `source_id` into `target_id`, then deletes
    /// the source basket.
    pub async fn merge(&self, source_id: &str, target_id: &str) -> Result<String, ApiError> {
        if source_id == target_id {
            return Err(ApiError::bad_request("Cannot merge a basket into itself"));
        }
        let source = self
            .baskets
            .find_basket(source_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Source basket not found"))?;
        let mut target = self
            .baskets
            .find_basket(target_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Target basket not found"))?;

        for (title, quantity) in source.items {
            let entry = target.items.entry(title.clone()).or_insert(0);
            *entry = entry.checked_add(quantity).ok_or_else(|| {
                ApiError::bad_request(format!("Quantity of \"{}\" is too large", title))
            })?;
        }

        self.store(&target).await?;
        self.baskets.delete_basket(source_id).await?;

        tracing::info!(%source_id, %target_id, "baskets merged");
        Ok(target.basket_id)
    }

    pub async fn clear(&self, basket_id: &str) -> Result<String, ApiError> {
        let mut basket = self.load(basket_id).await?;
        basket.items.clear();
        basket.promo.clear();
        self.store(&basket).await?;
        Ok(basket.basket_id)
    }

    pub async fn get_items(&self, basket_id: &str) -> Result<BasketItems, ApiError> {
        Ok(self.load(basket_id).await?.items)
    }

    pub async fn add_item(&self, basket_id: &str, title: &str) -> Result<String, ApiError> {
        if title.trim().is_empty() {
            return Err(ApiError::bad_request("Item title is required"));
        }
        let mut basket = self.load(basket_id).await?;
        if basket.items.contains_key(title) {
            return Err(ApiError::bad_request(format!(
                "Item \"{}\" is already in the basket",
                title
            )));
        }
        basket.items.insert(title.to_string(), 1);
        self.store(&basket).await?;
        Ok(basket.basket_id)
    }

    /// Sets absolute quantities. The whole call fails, and nothing is saved,
    /// on the first key (in ascending order) that is negative or absent.
    pub async fn change_quantity(
        &self,
        basket_id: &str,
        updates: &std::collections::BTreeMap<String, i64>,
    ) -> Result<String, ApiError> {
        let mut basket = self.load(basket_id).await?;

        for (title, requested) in updates {
            if *requested < 0 {
                return Err(ApiError::bad_request(format!(
                    "Quantity of \"{}\" cannot be negative",
                    title
                )));
            }
            let quantity = u32::try_from(*requested).map_err(|_| {
                ApiError::bad_request(format!("Quantity of \"{}\" is too large", title))
            })?;
            match basket.items.get_mut(title) {
                Some(current) => *current = quantity,
                None => {
                    return Err(ApiError::bad_request(format!(
                        "Item \"{}\" is not in the basket",
                        title
                    )))
                }
            }
        }

        self.store(&basket).await?;
        Ok(basket.basket_id)
    }

    pub async fn remove_item(&self, basket_id: &str, title: &str) -> Result<String, ApiError> {
        let mut basket = self.load(basket_id).await?;
        if basket.items.remove(title).is_none() {
            return Err(ApiError::bad_request(format!(
                "Item \"{}\" is not in the basket",
                title
            )));
        }
        self.store(&basket).await?;
        Ok(basket.basket_id)
    }

    pub async fn add_promo(&self, basket_id: &str, code: &str) -> Result<String, ApiError> {
        if !self.config.is_promo_allowed(code) {
            return Err(ApiError::bad_request("Promo code is not valid"));
        }
        let mut basket = self.load(basket_id).await?;
        basket.promo = code.to_string();
        self.store(&basket).await?;
        Ok(basket.basket_id)
    }

    pub async fn delete_promo(&self, basket_id: &str) -> Result<Basket, ApiError> {
        let mut basket = self.load(basket_id).await?;
        basket.promo.clear();
        self.store(&basket).await?;
        Ok(basket)
    }

    /// Prices each item against the catalog. Items whose product cannot be
    /// found, or whose lookup fails, are left out of the result.
    pub async fn price_basket(&self, basket_id: &str) -> Result<PricedBasket, ApiError> {
        let basket = self.load(basket_id).await?;
        let mut priced = PricedBasket::new();

        for (title, quantity) in &basket.items {
            match self.products.find_product_by_title(title).await {
                Ok(Some(product)) => {
                    priced.insert(title.clone(), price_line(&product, *quantity, &basket.promo));
                }
                Ok(None) => {
                    tracing::warn!(%basket_id, %title, "basket item has no matching product");
                }
                Err(err) => {
                    tracing::warn!(?err, %basket_id, %title, "product lookup failed while pricing");
                }
            }
        }

        Ok(priced)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::db::basket_repository::BasketRepository;
    use crate::models::user::Identity;
    use crate::state::test_support::{test_state_with_db, TestHarness};

    async fn basket_with(harness: &TestHarness, items: &[(&str, u32)]) -> String {
        let id = harness.state.baskets.create().await.unwrap();
        for (title, quantity) in items {
            harness.state.baskets.add_item(&id, title).await.unwrap();
            let updates = BTreeMap::from([(title.to_string(), i64::from(*quantity))]);
            harness
                .state
                .baskets
                .change_quantity(&id, &updates)
                .await
                .unwrap();
        }
        id
    }

    async fn items_of(harness: &TestHarness, id: &str) -> BasketItems {
        harness.state.baskets.get_items(id).await.unwrap()
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest { message, .. } => message,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn created_basket_is_empty_and_hyphen_free() {
        let harness = test_state_with_db();
        let id = harness.state.baskets.create().await.unwrap();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));

        let stored = harness.db.find_basket(&id).await.unwrap().unwrap();
        assert!(stored.items.is_empty());
        assert_eq!(stored.promo, "");
    }

    #[tokio::test]
    async fn adding_the_same_item_twice_fails_and_keeps_quantity_one() {
        let harness = test_state_with_db();
        let id = harness.state.baskets.create().await.unwrap();
        harness.state.baskets.add_item(&id, "Portal 2").await.unwrap();

        let err = harness
            .state
            .baskets
            .add_item(&id, "Portal 2")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
        assert_eq!(items_of(&harness, &id).await.get("Portal 2"), Some(&1));
    }

    #[tokio::test]
    async fn operations_on_missing_basket_are_bad_requests() {
        let harness = test_state_with_db();
        let baskets = &harness.state.baskets;
        assert_eq!(
            message(baskets.add_item("nope", "Portal 2").await.unwrap_err()),
            "Basket not found"
        );
        assert!(baskets.clear("nope").await.is_err());
        assert!(baskets.get_items("nope").await.is_err());
        assert!(baskets.price_basket("nope").await.is_err());
        assert!(baskets.delete_promo("nope").await.is_err());
    }

    #[tokio::test]
    async fn merge_sums_quantities_and_deletes_source() {
        let harness = test_state_with_db();
        let source = basket_with(&harness, &[("A", 2), ("B", 1)]).await;
        let target = basket_with(&harness, &[("A", 3), ("C", 4)]).await;

        let merged = harness.state.baskets.merge(&source, &target).await.unwrap();
        assert_eq!(merged, target);

        let expected: BasketItems = BTreeMap::from([
            ("A".to_string(), 5),
            ("B".to_string(), 1),
            ("C".to_string(), 4),
        ]);
        assert_eq!(items_of(&harness, &target).await, expected);
        assert!(harness.db.find_basket(&source).await.unwrap().is_none());

        let err = harness.state.baskets.merge(&source, &target).await.unwrap_err();
        assert_eq!(message(err), "Source basket not found");
    }

    #[tokio::test]
    async fn merge_requires_both_baskets() {
        let harness = test_state_with_db();
        let source = basket_with(&harness, &[("A", 2)]).await;

        let err = harness.state.baskets.merge(&source, "missing").await.unwrap_err();
        assert_eq!(message(err), "Target basket not found");
        assert_eq!(items_of(&harness, &source).await.get("A"), Some(&2));
    }

    #[tokio::test]
    async fn merge_into_itself_is_rejected() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("A", 2)]).await;
        assert!(harness.state.baskets.merge(&id, &id).await.is_err());
        assert_eq!(items_of(&harness, &id).await.get("A"), Some(&2));
    }

    #[tokio::test]
    async fn merge_overflow_is_rejected_and_keeps_both_baskets() {
        let harness = test_state_with_db();
        let source = basket_with(&harness, &[("Hundred", u32::MAX)]).await;
        let target = basket_with(&harness, &[("Hundred", 1)]).await;

        let err = harness.state.baskets.merge(&source, &target).await.unwrap_err();
        assert!(message(err).contains("too large"));
        assert_eq!(items_of(&harness, &source).await.get("Hundred"), Some(&u32::MAX));
        assert_eq!(items_of(&harness, &target).await.get("Hundred"), Some(&1));
    }

    #[tokio::test]
    async fn change_quantity_sets_values_and_keeps_zero() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("A", 1), ("B", 1)]).await;

        let updates = BTreeMap::from([("A".to_string(), 7), ("B".to_string(), 0)]);
        harness
            .state
            .baskets
            .change_quantity(&id, &updates)
            .await
            .unwrap();

        let items = items_of(&harness, &id).await;
        assert_eq!(items.get("A"), Some(&7));
        assert_eq!(items.get("B"), Some(&0));
    }

    #[tokio::test]
    async fn change_quantity_is_all_or_nothing() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("A", 1), ("B", 1)]).await;
        let before = items_of(&harness, &id).await;

        let negative = BTreeMap::from([("A".to_string(), 5), ("B".to_string(), -1)]);
        let err = harness
            .state
            .baskets
            .change_quantity(&id, &negative)
            .await
            .unwrap_err();
        assert!(message(err).contains("negative"));
        assert_eq!(items_of(&harness, &id).await, before);

        let absent = BTreeMap::from([("A".to_string(), 5), ("Z".to_string(), 1)]);
        let err = harness
            .state
            .baskets
            .change_quantity(&id, &absent)
            .await
            .unwrap_err();
        assert!(message(err).contains("not in the basket"));
        assert_eq!(items_of(&harness, &id).await, before);
    }

    #[tokio::test]
    async fn removing_an_absent_item_is_a_bad_request() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("A", 1)]).await;

        assert!(harness.state.baskets.remove_item(&id, "B").await.is_err());
        harness.state.baskets.remove_item(&id, "A").await.unwrap();
        assert!(items_of(&harness, &id).await.is_empty());
    }

    #[tokio::test]
    async fn clear_drops_items_and_promo() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("A", 3)]).await;
        harness.state.baskets.add_promo(&id, "SAVE10").await.unwrap();

        harness.state.baskets.clear(&id).await.unwrap();
        let stored = harness.db.find_basket(&id).await.unwrap().unwrap();
        assert!(stored.items.is_empty());
        assert!(!stored.has_promo());
    }

    #[tokio::test]
    async fn promo_round_trip_ends_empty() {
        let harness = test_state_with_db();
        let id = harness.state.baskets.create().await.unwrap();

        harness.state.baskets.add_promo(&id, "SAVE20").await.unwrap();
        harness.state.baskets.add_promo(&id, "FIRST ORDER").await.unwrap();
        assert_eq!(
            harness.db.find_basket(&id).await.unwrap().unwrap().promo,
            "FIRST ORDER"
        );

        let basket = harness.state.baskets.delete_promo(&id).await.unwrap();
        assert_eq!(basket.promo, "");
    }

    #[tokio::test]
    async fn unknown_promo_is_rejected() {
        let harness = test_state_with_db();
        let id = harness.state.baskets.create().await.unwrap();
        let err = harness.state.baskets.add_promo(&id, "FREE").await.unwrap_err();
        assert_eq!(message(err), "Promo code is not valid");
    }

    #[tokio::test]
    async fn price_basket_applies_promo_and_skips_unknown_items() {
        let harness = test_state_with_db();
        let id = basket_with(&harness, &[("Hundred", 2), ("Ghost", 1), ("Broken", 1)]).await;
        harness.state.baskets.add_promo(&id, "SAVE20").await.unwrap();
        harness.db.fail_product_lookup("Broken");

        let priced = harness.state.baskets.price_basket(&id).await.unwrap();
        assert_eq!(priced.len(), 1);
        let line = &priced["Hundred"];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.promo_price.to_string(), "80.00");
        assert_eq!(line.line_total.to_string(), "160.00");

        harness.state.baskets.add_promo(&id, "FIRST ORDER").await.unwrap();
        let priced = harness.state.baskets.price_basket(&id).await.unwrap();
        assert_eq!(priced["Hundred"].promo_price.to_string(), "75.00");
    }

    #[tokio::test]
    async fn attach_binds_basket_once_per_user() {
        let harness = test_state_with_db();
        let (user, pair) = harness.registered_user("ada@example.com").await;

        let first = harness.state.baskets.create().await.unwrap();
        let second = harness.state.baskets.create().await.unwrap();

        harness
            .state
            .baskets
            .attach_to_user(&first, Some(&pair.refresh_token))
            .await
            .unwrap();
        let err = harness
            .state
            .baskets
            .attach_to_user(&second, Some(&pair.refresh_token))
            .await
            .unwrap_err();
        assert_eq!(message(err), "User already has a basket.");

        let stored = harness.db.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.basket_id, Some(first));
    }

    #[tokio::test]
    async fn attach_requires_a_valid_refresh_token_and_basket() {
        let harness = test_state_with_db();
        let (_, pair) = harness.registered_user("ada@example.com").await;
        let id = harness.state.baskets.create().await.unwrap();

        let err = harness.state.baskets.attach_to_user(&id, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        let err = harness
            .state
            .baskets
            .attach_to_user(&id, Some(&pair.access_token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));

        let err = harness
            .state
            .baskets
            .attach_to_user("missing", Some(&pair.refresh_token))
            .await
            .unwrap_err();
        assert_eq!(message(err), "Basket not found");
    }

    #[tokio::test]
    async fn attach_for_vanished_user_is_unauthorized() {
        let harness = test_state_with_db();
        let ghost = Identity {
            id: Uuid::new_v4(),
            email: "ghost@example.com".into(),
            is_activated: true,
        };
        let pair = harness.state.tokens.issue(&ghost).unwrap();
        let id = harness.state.baskets.create().await.unwrap();

        let err = harness
            .state
            .baskets
            .attach_to_user(&id, Some(&pair.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
