//! Shopping cart module.
//!
//! Contains the server cart model, pricing calculator, and coupon types.

mod cart;
mod coupon;
mod pricing;

pub use cart::{Cart, CartLineItem, TotalsMismatch};
pub use coupon::{normalize_code, Coupon, DiscountType};
pub use pricing::{
    compute_grand_total, compute_line_display, compute_shipping_fee, summarize, CheckoutSummary,
    LineDisplay, ShippingQuote,
};
