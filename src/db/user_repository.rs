use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{NewUser, ProfileUpdate, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_activation_link(
        &self,
        activation_link: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, sqlx::Error>;
    async fn set_user_activated(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
    /// Sets the basket reference only while the user has none. Returns
    /// `false` when the user is missing or already holds a basket.
    async fn assign_basket(&self, user_id: Uuid, basket_id: &str) -> Result<bool, sqlx::Error>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn remove_address_reference(
        &self,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<(), sqlx::Error>;
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error>;
}
