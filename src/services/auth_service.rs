use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::db::{address_repository::AddressRepository, user_repository::UserRepository};
use crate::errors::ApiError;
use crate::models::{
    address::{Address, AddressKind},
    registration::{normalize_email, LoginPayload, RegistrationPayload},
    user::{Identity, NewUser, User},
};
use crate::services::{smtp_mailer::Mailer, token_service::TokenService};
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Identity,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    addresses: Arc<dyn AddressRepository>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        addresses: Arc<dyn AddressRepository>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            users,
            addresses,
            tokens,
            mailer,
            config,
        }
    }

    /// Issues a fresh pair for `user` and stores its refresh half.
    async fn start_session(&self, user: &User) -> Result<AuthResponse, ApiError> {
        let identity = Identity::from(user);
        let pair = self.tokens.issue(&identity)?;
        self.tokens.persist(user.id, &pair.refresh_token).await?;
        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: identity,
        })
    }

    fn activation_url(&self, link: &str) -> String {
        format!(
            "{}/api/activate/{}",
            self.config.api_url.trim_end_matches('/'),
            link
        )
    }

    pub async fn register(&self, payload: RegistrationPayload) -> Result<AuthResponse, ApiError> {
        let errors = payload.validate();
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let email = normalize_email(&payload.email);
        if self.users.is_email_taken(&email).await? {
            return Err(ApiError::bad_request(format!(
                "User with email {} already exists",
                email
            )));
        }

        let password_hash = hash_password(&payload.password, &self.config.password_hash)?;

        let shipping = Address {
            id: Uuid::new_v4(),
            kind: AddressKind::Shipping,
            country: payload.ship_country.clone(),
            city: payload.ship_city.clone(),
            street: payload.ship_street.clone(),
            postal_code: payload.ship_postal_code.clone(),
            is_default: payload.default_shipping_check,
        };
        let or_shipping = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let billing = Address {
            id: Uuid::new_v4(),
            kind: AddressKind::Billing,
            country: or_shipping(&payload.bill_country, &shipping.country),
            city: or_shipping(&payload.bill_city, &shipping.city),
            street: or_shipping(&payload.bill_street, &shipping.street),
            postal_code: or_shipping(&payload.bill_postal_code, &shipping.postal_code),
            is_default: payload.default_billing_check,
        };
        self.addresses.create_address(&shipping).await?;
        self.addresses.create_address(&billing).await?;

        let activation_link = Uuid::new_v4().to_string();
        let user = self
            .users
            .create_user(NewUser {
                id: Uuid::new_v4(),
                email,
                password_hash,
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                birthday: payload.dob.clone().filter(|d| !d.trim().is_empty()),
                activation_link: activation_link.clone(),
                billing_address_ids: vec![billing.id],
                shipping_address_ids: vec![shipping.id],
            })
            .await?;

        let response = self.start_session(&user).await?;

        if let Err(err) = self
            .mailer
            .send_activation_email(&user.email, &self.activation_url(&activation_link))
            .await
        {
            tracing::warn!(%err, user_id = %user.id, "failed to send activation email");
        }

        tracing::info!(user_id = %user.id, "user registered");
        Ok(response)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, ApiError> {
        let errors = payload.validate();
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let email = normalize_email(&payload.email);
        let Some(user) = self.users.find_user_by_email(&email).await? else {
            return Err(ApiError::bad_request(INVALID_CREDENTIALS));
        };
        if !verify_password(&payload.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(ApiError::bad_request(INVALID_CREDENTIALS));
        }

        self.start_session(&user).await
    }

    /// Deletes the stored refresh token. A missing cookie or an already
    /// revoked token is not an error.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<u64, ApiError> {
        match refresh_token {
            Some(token) => self.tokens.revoke(token).await,
            None => Ok(0),
        }
    }

    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthResponse, ApiError> {
        let token = refresh_token.ok_or(ApiError::Unauthorized)?;
        let identity = self
            .tokens
            .verify_refresh(token)
            .ok_or(ApiError::Unauthorized)?;
        if self.tokens.lookup(token).await?.is_none() {
            tracing::info!(user_id = %identity.id, "refresh rejected: token not on record");
            return Err(ApiError::Unauthorized);
        }
        let user = self
            .users
            .find_user_by_id(identity.id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        self.start_session(&user).await
    }

    pub async fn activate(&self, activation_link: &str) -> Result<(), ApiError> {
        let user = self
            .users
            .find_user_by_activation_link(activation_link)
            .await?
            .ok_or_else(|| ApiError::bad_request("Incorrect activation link"))?;
        if !user.is_activated {
            self.users.set_user_activated(user.id).await?;
            tracing::info!(user_id = %user.id, "account activated");
        }
        Ok(())
    }
}
