use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::basket::BasketLine;
use crate::models::product::Product;

/// Multiplier applied to the effective price under `promo`. Unknown codes,
/// including the empty string, leave prices unchanged.
pub fn promo_factor(promo: &str) -> Decimal {
    match promo {
        "SAVE10" => Decimal::new(90, 2),
        "SAVE20" => Decimal::new(80, 2),
        "FIRST ORDER" => Decimal::new(75, 2),
        _ => Decimal::ONE,
    }
}

/// Half away from zero to two places, always rendered with two decimals.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

pub fn price_line(product: &Product, quantity: u32, promo: &str) -> BasketLine {
    let promo_price = round2(product.effective_price() * promo_factor(promo));
    BasketLine {
        quantity,
        price: product.price,
        discount_price: product.discount_price,
        promo_price,
        line_total: round2(promo_price * Decimal::from(quantity)),
        header_img: product.header_img.clone(),
    }
}
