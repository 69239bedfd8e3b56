use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product title -> quantity. Ordered so that every walk over a basket is
/// deterministic.
pub type BasketItems = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub basket_id: String,
    #[serde(default)]
    pub items: BasketItems,
    /// Empty string means no promo is applied.
    #[serde(default)]
    pub promo: String,
}

impl Basket {
    pub fn empty(basket_id: impl Into<String>) -> Self {
        Self {
            basket_id: basket_id.into(),
            items: BasketItems::new(),
            promo: String::new(),
        }
    }

    pub fn has_promo(&self) -> bool {
        !self.promo.is_empty()
    }
}

/// One priced row of `get-basket-full`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLine {
    pub quantity: u32,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub promo_price: Decimal,
    pub line_total: Decimal,
    pub header_img: Option<String>,
}

pub type PricedBasket = BTreeMap<String, BasketLine>;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToUserPayload {
    pub basket_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBasketsPayload {
    pub basket_anon_id: String,
    pub basket_user_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub game_title: String,
}

/// Requested quantities are signed so that negative input reaches the
/// service and is rejected there with a proper message.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQuantityPayload {
    pub item_updates: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PromoPayload {
    pub promo: String,
}
