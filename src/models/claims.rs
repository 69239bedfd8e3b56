use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Identity;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub is_activated: bool,
    pub exp: usize, // expiration (as UNIX timestamp)
    pub iat: usize,
    pub jti: String,
    pub token_use: TokenUse,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            is_activated: self.is_activated,
        }
    }
}
