use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Billing,
    Shipping,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Billing => "billing",
            AddressKind::Shipping => "shipping",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "billing" => Some(AddressKind::Billing),
            "shipping" => Some(AddressKind::Shipping),
            _ => None,
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub kind: AddressKind,
    pub country: String,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    pub is_default: bool,
}

/// Client-side shape for `PUT /user/address/{kind}`; `kind` is taken from
/// the route, never from the body.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdate {
    pub id: Uuid,
    pub country: String,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressUpdate {
    pub fn into_address(self, kind: AddressKind) -> Address {
        Address {
            id: self.id,
            kind,
            country: self.country,
            city: self.city,
            street: self.street,
            postal_code: self.postal_code,
            is_default: self.is_default,
        }
    }
}
