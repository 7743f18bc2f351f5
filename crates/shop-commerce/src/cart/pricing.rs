//! Checkout pricing derived from server data.
//!
//! Everything here is pure: the same cart and settings always produce the
//! same figures, and nothing is cached.

use crate::cart::{Cart, CartLineItem};
use crate::money::{Currency, Money};
use crate::settings::{SettingsState, ShippingSettings};
use serde::{Deserialize, Serialize};

/// Shipping charge for a subtotal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "fee", rename_all = "camelCase")]
pub enum ShippingQuote {
    /// Subtotal reached the free-shipping threshold.
    Free,
    /// Flat fee applies.
    Flat(Money),
    /// Settings not loaded yet; counted as zero until they are.
    Calculating,
    /// The cart is empty; nothing ships.
    NoItems,
}

impl ShippingQuote {
    /// Fee to add to the total.
    pub fn fee(&self, currency: Currency) -> Money {
        match self {
            Self::Flat(fee) => fee.with_currency(currency),
            Self::Free | Self::Calculating | Self::NoItems => Money::zero(currency),
        }
    }

    /// Check if the fee is still unknown.
    pub fn is_calculating(&self) -> bool {
        matches!(self, Self::Calculating)
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Free => "Free".to_string(),
            Self::Flat(fee) => fee.display(),
            Self::Calculating => "calculating".to_string(),
            Self::NoItems => "n/a".to_string(),
        }
    }
}

/// Shipping fee for a subtotal: free at or above the threshold, flat below it.
pub fn compute_shipping_fee(subtotal: Money, settings: &SettingsState) -> ShippingQuote {
    match settings {
        SettingsState::Loading => ShippingQuote::Calculating,
        SettingsState::Ready(settings) => quote(subtotal, settings),
    }
}

fn quote(subtotal: Money, settings: &ShippingSettings) -> ShippingQuote {
    if subtotal.amount_cents >= settings.free_shipping_threshold.amount_cents {
        ShippingQuote::Free
    } else {
        ShippingQuote::Flat(settings.flat_fee.with_currency(subtotal.currency))
    }
}

/// Subtotal − discount + shipping fee.
pub fn compute_grand_total(cart: &Cart, shipping_fee: Money) -> Money {
    cart.total()
        .saturating_add(&shipping_fee.with_currency(cart.currency))
}

/// Display prices for one cart line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineDisplay {
    /// Struck-through pre-sale price, only for genuine sales.
    pub original: Option<Money>,
    /// Price actually charged per unit.
    pub effective: Money,
    /// Effective price × quantity.
    pub line_total: Money,
}

/// Display prices for a line.
///
/// The original price is shown only when the line is on sale and the
/// original is higher than the current price.
pub fn compute_line_display(item: &CartLineItem) -> LineDisplay {
    let original = item
        .original_unit_price
        .filter(|orig| item.is_on_sale && orig.amount_cents > item.unit_price.amount_cents);

    LineDisplay {
        original,
        effective: item.unit_price,
        line_total: item.line_total(),
    }
}

/// Everything a checkout screen shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    /// Σ(unit price × quantity).
    pub subtotal: Money,
    /// Coupon discount.
    pub discount: Money,
    /// Shipping quote.
    pub shipping: ShippingQuote,
    /// Subtotal − discount + shipping.
    pub grand_total: Money,
    /// Applied coupon code.
    pub applied_coupon: Option<String>,
    /// Amount still needed for free shipping, when a flat fee applies.
    pub remaining_for_free_shipping: Option<Money>,
    /// Sum of quantities.
    pub item_count: i64,
}

/// Build the checkout summary for a cart.
///
/// An empty cart is quoted `NoItems` rather than charged the flat fee.
pub fn summarize(cart: &Cart, settings: &SettingsState) -> CheckoutSummary {
    let subtotal = cart.subtotal();
    let shipping = if cart.is_empty() {
        ShippingQuote::NoItems
    } else {
        compute_shipping_fee(subtotal, settings)
    };
    let grand_total = compute_grand_total(cart, shipping.fee(cart.currency));

    let remaining_for_free_shipping = match (shipping, settings.settings()) {
        (ShippingQuote::Flat(_), Some(s)) => Some(
            s.free_shipping_threshold
                .with_currency(cart.currency)
                .saturating_sub(&subtotal),
        ),
        _ => None,
    };

    CheckoutSummary {
        subtotal,
        discount: cart.discount(),
        shipping,
        grand_total,
        applied_coupon: cart.applied_coupon_code.clone(),
        remaining_for_free_shipping,
        item_count: cart.item_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn lira(amount: i64) -> Money {
        Money::from_major(amount, Currency::TRY)
    }

    fn ready() -> SettingsState {
        SettingsState::Ready(ShippingSettings::new(lira(50), lira(2000)))
    }

    fn cart_with_subtotal(subtotal: i64) -> Cart {
        Cart::empty(Currency::TRY).with_item(CartLineItem::new(
            ProductId::new(1),
            "Item",
            lira(subtotal),
            1,
        ))
    }

    #[test]
    fn test_shipping_threshold_is_inclusive() {
        assert_eq!(compute_shipping_fee(lira(2000), &ready()), ShippingQuote::Free);
        assert_eq!(compute_shipping_fee(lira(2500), &ready()), ShippingQuote::Free);
        assert_eq!(
            compute_shipping_fee(Money::new(199_999, Currency::TRY), &ready()),
            ShippingQuote::Flat(lira(50))
        );
    }

    #[test]
    fn test_shipping_while_loading() {
        let quote = compute_shipping_fee(lira(10), &SettingsState::Loading);
        assert!(quote.is_calculating());
        assert_eq!(quote.fee(Currency::TRY), Money::zero(Currency::TRY));
        assert_eq!(quote.label(), "calculating");
    }

    #[test]
    fn test_below_threshold_scenario() {
        let cart = cart_with_subtotal(1800);
        let summary = summarize(&cart, &ready());

        assert_eq!(summary.shipping, ShippingQuote::Flat(lira(50)));
        assert_eq!(summary.grand_total, lira(1850));
        assert_eq!(summary.remaining_for_free_shipping, Some(lira(200)));
    }

    #[test]
    fn test_free_shipping_with_discount() {
        let cart = cart_with_subtotal(2500).with_discount(lira(250), Some("SAVE10"));
        let summary = summarize(&cart, &ready());

        assert_eq!(summary.shipping, ShippingQuote::Free);
        assert_eq!(summary.grand_total, lira(2250));
        assert_eq!(summary.discount, lira(250));
        assert_eq!(summary.applied_coupon.as_deref(), Some("SAVE10"));
        assert_eq!(summary.remaining_for_free_shipping, None);
    }

    #[test]
    fn test_grand_total_is_pure() {
        let cart = cart_with_subtotal(700).with_discount(lira(100), None);
        let first = compute_grand_total(&cart, lira(50));
        let second = compute_grand_total(&cart, lira(50));
        assert_eq!(first, second);
        assert_eq!(first, lira(650));
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = summarize(&Cart::empty(Currency::TRY), &ready());
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.shipping, ShippingQuote::NoItems);
        assert_eq!(summary.grand_total, Money::zero(Currency::TRY));
        assert_eq!(summary.remaining_for_free_shipping, None);

        // The bare fee function still follows the threshold.
        assert_eq!(
            compute_shipping_fee(Money::zero(Currency::TRY), &ready()),
            ShippingQuote::Flat(lira(50))
        );
    }

    #[test]
    fn test_line_display() {
        let sale = CartLineItem::new(ProductId::new(1), "A", lira(80), 2).on_sale_from(lira(100));
        let display = compute_line_display(&sale);
        assert_eq!(display.original, Some(lira(100)));
        assert_eq!(display.effective, lira(80));
        assert_eq!(display.line_total, lira(160));

        // An "original" that is not higher is hidden.
        let bogus = CartLineItem::new(ProductId::new(2), "B", lira(80), 1).on_sale_from(lira(80));
        assert_eq!(compute_line_display(&bogus).original, None);

        let mut not_on_sale =
            CartLineItem::new(ProductId::new(3), "C", lira(80), 1).on_sale_from(lira(120));
        not_on_sale.is_on_sale = false;
        assert_eq!(compute_line_display(&not_on_sale).original, None);
    }
}
