use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub is_activated: bool,
    #[serde(skip_serializing)]
    pub activation_link: String,
    pub billing_address_ids: Vec<Uuid>,
    pub shipping_address_ids: Vec<Uuid>,
    pub basket_id: Option<String>,
}

/// Fields needed to insert a user; the store assigns nothing but the row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<String>,
    pub activation_link: String,
    pub billing_address_ids: Vec<Uuid>,
    pub shipping_address_ids: Vec<Uuid>,
}

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            birthday: self.birthday,
            is_activated: false,
            activation_link: self.activation_link,
            billing_address_ids: self.billing_address_ids,
            shipping_address_ids: self.shipping_address_ids,
            basket_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(birthday) = &self.birthday {
            user.birthday = Some(birthday.trim().to_string());
        }
    }
}

/// The identity payload carried inside both access and refresh tokens and
/// returned to clients next to a token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub is_activated: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id,
            email: user.email.clone(),
            is_activated: user.is_activated,
        }
    }
}
