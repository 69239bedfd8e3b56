use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::services::{
    auth_service::AuthService, basket_service::BasketService, product_service::ProductService,
    smtp_mailer::Mailer, token_service::TokenService, user_service::UserService,
};
use crate::utils::jwt::{JwtSecretError, TokenKeys};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub baskets: Arc<BasketService>,
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Wires every service against one store. Fails only on unusable JWT
    /// secrets.
    pub fn new(
        config: Config,
        db: Database,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, JwtSecretError> {
        let config = Arc::new(config);
        let keys = TokenKeys::from_settings(&config.jwt)?;
        let tokens = Arc::new(TokenService::new(
            keys,
            &config.jwt,
            db.refresh_tokens.clone(),
        ));

        Ok(Self {
            auth: Arc::new(AuthService::new(
                db.users.clone(),
                db.addresses.clone(),
                tokens.clone(),
                mailer,
                config.clone(),
            )),
            baskets: Arc::new(BasketService::new(
                db.baskets.clone(),
                db.users.clone(),
                db.products.clone(),
                tokens.clone(),
                config.clone(),
            )),
            users: Arc::new(UserService::new(
                db.users.clone(),
                db.addresses.clone(),
                tokens.clone(),
            )),
            products: Arc::new(ProductService::new(db.products.clone())),
            tokens,
            config,
        })
    }
}
