//! Storefront domain types and pricing logic.
//!
//! - **Money**: integer minor units with currency
//! - **Cart**: the server's cart model, normalized and with derived totals
//! - **Pricing**: shipping quote, grand total, line display, checkout summary
//! - **Coupons**: code normalization and descriptions
//! - **Settings**: flat shipping fee and free-shipping threshold
//!
//! # Example
//!
//! ```rust
//! use shop_commerce::prelude::*;
//!
//! let cart = Cart::empty(Currency::TRY).with_item(CartLineItem::new(
//!     ProductId::new(1),
//!     "Kettle",
//!     Money::from_major(1800, Currency::TRY),
//!     1,
//! ));
//! let settings = SettingsState::Ready(ShippingSettings::defaults(Currency::TRY));
//!
//! let summary = summarize(&cart, &settings);
//! assert_eq!(summary.grand_total, Money::from_major(1850, Currency::TRY));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod settings;

pub use cart::{Cart, CartLineItem};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::cart::{
        compute_grand_total, compute_line_display, compute_shipping_fee, normalize_code,
        summarize, Cart, CartLineItem, CheckoutSummary, Coupon, DiscountType, LineDisplay,
        ShippingQuote,
    };
    pub use crate::settings::{SettingEntry, SettingsState, ShippingSettings};
}
