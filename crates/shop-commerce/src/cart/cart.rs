//! Cart and line item types as returned by the backend.

use super::coupon::Coupon;
use crate::ids::{CartId, OwnerId, ProductId};
use crate::money::{decimal, Currency, Money};
use serde::{Deserialize, Serialize};

/// The server's authoritative cart.
///
/// `subtotal` and `total` are always derived from the lines and the
/// discount; the values the server reported are kept for diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Backend cart identifier.
    #[serde(default)]
    pub id: CartId,
    /// User id or guest id owning the cart.
    #[serde(default, alias = "userId")]
    pub owner_id: OwnerId,
    /// Lines in server order, unique by product.
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    /// Subtotal as reported on the wire.
    #[serde(rename = "subtotal", default, with = "decimal::option")]
    pub reported_subtotal: Option<Money>,
    /// Discount granted by the applied coupon.
    #[serde(default, with = "decimal")]
    pub discount_amount: Money,
    /// Total as reported on the wire.
    #[serde(rename = "total", default, with = "decimal::option")]
    pub reported_total: Option<Money>,
    /// Code of the applied coupon, if any.
    #[serde(default)]
    pub applied_coupon_code: Option<String>,
    /// Terms of the applied coupon, when the backend includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_coupon: Option<Coupon>,
    /// Display currency; not part of the wire format.
    #[serde(skip)]
    pub currency: Currency,
}

/// A disagreement between a reported wire total and the derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsMismatch {
    /// Which field disagreed ("subtotal" or "total").
    pub field: &'static str,
    /// Value the server sent.
    pub reported: Money,
    /// Value derived from lines and discount.
    pub derived: Money,
}

impl Cart {
    /// An empty cart in the given currency.
    pub fn empty(currency: Currency) -> Self {
        Self {
            id: CartId::default(),
            owner_id: OwnerId::default(),
            items: Vec::new(),
            reported_subtotal: None,
            discount_amount: Money::zero(currency),
            reported_total: None,
            applied_coupon_code: None,
            applied_coupon: None,
            currency,
        }
    }

    /// Append a line.
    pub fn with_item(mut self, item: CartLineItem) -> Self {
        self.items.push(item.with_currency(self.currency));
        self
    }

    /// Set the coupon discount.
    pub fn with_discount(mut self, amount: Money, code: Option<&str>) -> Self {
        self.discount_amount = amount.with_currency(self.currency);
        self.applied_coupon_code = code.map(str::to_string);
        self
    }

    /// Retag every amount with `currency`.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self.discount_amount = self.discount_amount.with_currency(currency);
        self.reported_subtotal = self.reported_subtotal.map(|m| m.with_currency(currency));
        self.reported_total = self.reported_total.map(|m| m.with_currency(currency));
        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .map(|item| item.with_currency(currency))
            .collect();
        self
    }

    /// Normalize a cart received from the server.
    ///
    /// Lines with quantity <= 0 are dropped and the discount is clamped
    /// into `[0, subtotal]`.
    pub fn normalize(mut self) -> Self {
        self.items.retain(|item| item.quantity > 0);
        self.discount_amount = self.discount();
        if let Some(code) = &self.applied_coupon_code {
            if code.trim().is_empty() {
                self.applied_coupon_code = None;
            }
        }
        if self.applied_coupon_code.is_none() {
            self.applied_coupon = None;
        }
        self
    }

    /// Description of the applied coupon's terms, e.g. "%10 off".
    pub fn coupon_terms(&self) -> Option<String> {
        self.applied_coupon
            .as_ref()
            .map(|coupon| coupon.describe(self.currency))
    }

    /// Σ(unit price × quantity) over all lines.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .filter(|item| item.quantity > 0)
            .fold(Money::zero(self.currency), |acc, item| {
                acc.saturating_add(&item.line_total())
            })
    }

    /// Discount clamped into `[0, subtotal]`.
    pub fn discount(&self) -> Money {
        self.discount_amount
            .with_currency(self.currency)
            .clamp(&Money::zero(self.currency), &self.subtotal())
    }

    /// Subtotal minus discount.
    pub fn total(&self) -> Money {
        self.subtotal().saturating_sub(&self.discount())
    }

    /// Reported wire totals that disagree with the derived ones.
    pub fn totals_mismatch(&self) -> Vec<TotalsMismatch> {
        let mut out = Vec::new();
        let checks = [
            ("subtotal", self.reported_subtotal, self.subtotal()),
            ("total", self.reported_total, self.total()),
        ];
        for (field, reported, derived) in checks {
            if let Some(reported) = reported {
                if reported.amount_cents != derived.amount_cents {
                    out.push(TotalsMismatch {
                        field,
                        reported,
                        derived,
                    });
                }
            }
        }
        out
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity.max(0)).sum()
    }

    /// Get number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Quantity of a product in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: ProductId) -> i64 {
        self.line(product_id).map(|i| i.quantity).unwrap_or(0)
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    #[serde(default, alias = "productName")]
    pub name: String,
    /// Current effective unit price.
    #[serde(alias = "price", with = "decimal")]
    pub unit_price: Money,
    /// Pre-sale unit price, when the product is on sale.
    #[serde(default, alias = "originalPrice", with = "decimal::option")]
    pub original_unit_price: Option<Money>,
    /// Whether the product is on sale.
    #[serde(default)]
    pub is_on_sale: bool,
    /// Product image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Quantity.
    pub quantity: i64,
}

impl CartLineItem {
    /// Create a new line item.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            original_unit_price: None,
            is_on_sale: false,
            image_url: None,
            quantity,
        }
    }

    /// Mark the line as on sale from `original`.
    pub fn on_sale_from(mut self, original: Money) -> Self {
        self.is_on_sale = true;
        self.original_unit_price = Some(original);
        self
    }

    /// Unit price × quantity, saturating.
    pub fn line_total(&self) -> Money {
        Money::new(
            self.unit_price
                .amount_cents
                .saturating_mul(self.quantity.max(0)),
            self.unit_price.currency,
        )
    }

    fn with_currency(mut self, currency: Currency) -> Self {
        self.unit_price = self.unit_price.with_currency(currency);
        self.original_unit_price = self.original_unit_price.map(|m| m.with_currency(currency));
        self
    }
}
