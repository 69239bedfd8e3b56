use std::sync::Arc;

use uuid::Uuid;

use crate::db::{address_repository::AddressRepository, user_repository::UserRepository};
use crate::errors::ApiError;
use crate::models::{
    address::{Address, AddressKind, AddressUpdate},
    registration::{check_length, NAME_LENGTH},
    user::{ProfileUpdate, User},
};
use crate::services::token_service::TokenService;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    addresses: Arc<dyn AddressRepository>,
    tokens: Arc<TokenService>,
}

fn ids_of(user: &User, kind: AddressKind) -> &[Uuid] {
    match kind {
        AddressKind::Billing => &user.billing_address_ids,
        AddressKind::Shipping => &user.shipping_address_ids,
    }
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        addresses: Arc<dyn AddressRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            addresses,
            tokens,
        }
    }

    /// A bearer token can outlive its account; such sessions are rejected.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, ApiError> {
        let mut errors = Vec::new();
        if let Some(first_name) = &update.first_name {
            check_length(&mut errors, "firstName", first_name, NAME_LENGTH);
        }
        if let Some(last_name) = &update.last_name {
            check_length(&mut errors, "lastName", last_name, NAME_LENGTH);
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        self.users
            .update_profile(user_id, &update)
            .await?
            .ok_or(ApiError::Unauthorized)
    }

    /// Removes the user, their addresses and their stored refresh token.
    /// The basket stays, since it may still be shared with an anonymous session.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), ApiError> {
        let user = self.get_profile(user_id).await?;

        let address_ids: Vec<Uuid> = user
            .billing_address_ids
            .iter()
            .chain(&user.shipping_address_ids)
            .copied()
            .collect();
        self.addresses.delete_addresses(&address_ids).await?;
        self.tokens.revoke_for_user(user_id).await?;
        self.users.delete_user(user_id).await?;

        tracing::info!(%user_id, "account deleted");
        Ok(())
    }

    pub async fn list_addresses(
        &self,
        user_id: Uuid,
        kind: AddressKind,
    ) -> Result<Vec<Address>, ApiError> {
        let user = self.get_profile(user_id).await?;
        Ok(self.addresses.find_addresses(ids_of(&user, kind)).await?)
    }

    /// Overwrites the listed addresses. Every id must belong to the user
    /// under `kind`; otherwise nothing is written.
    pub async fn update_addresses(
        &self,
        user_id: Uuid,
        kind: AddressKind,
        updates: Vec<AddressUpdate>,
    ) -> Result<Vec<Address>, ApiError> {
        let user = self.get_profile(user_id).await?;
        let owned = ids_of(&user, kind);

        if let Some(foreign) = updates.iter().find(|u| !owned.contains(&u.id)) {
            return Err(ApiError::bad_request(format!(
                "Address {} is not a {} address of this user",
                foreign.id, kind
            )));
        }

        for update in updates {
            let address = update.into_address(kind);
            if !self.addresses.update_address(&address).await? {
                return Err(ApiError::bad_request(format!(
                    "Address {} not found",
                    address.id
                )));
            }
        }

        Ok(self.addresses.find_addresses(owned).await?)
    }

    pub async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> Result<(), ApiError> {
        let user = self.get_profile(user_id).await?;
        let owned = user.billing_address_ids.contains(&address_id)
            || user.shipping_address_ids.contains(&address_id);
        if !owned {
            return Err(ApiError::bad_request("Address not found"));
        }

        self.addresses.delete_addresses(&[address_id]).await?;
        self.users
            .remove_address_reference(user_id, address_id)
            .await?;
        Ok(())
    }
}
