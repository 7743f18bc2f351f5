//! Coupon types.
//!
//! Coupons are validated and priced by the backend. The client only
//! normalizes the code it submits and describes coupons it is shown.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Deserializer, Serialize};

/// Type of discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiscountType {
    /// Percentage off the subtotal.
    Percentage,
    /// Fixed amount off.
    Amount,
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Index(u8),
            Name(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Index(0) => Ok(Self::Percentage),
            Wire::Index(1) => Ok(Self::Amount),
            Wire::Name(name) if name.eq_ignore_ascii_case("percentage") => Ok(Self::Percentage),
            Wire::Name(name)
                if name.eq_ignore_ascii_case("amount") || name.eq_ignore_ascii_case("fixed") =>
            {
                Ok(Self::Amount)
            }
            _ => Err(serde::de::Error::custom("unknown discount type")),
        }
    }
}

/// A coupon as the backend describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Coupon code (e.g., "SAVE10").
    pub code: String,
    /// Percentage or fixed amount.
    pub discount_type: DiscountType,
    /// Percent (0-100) or amount in major units.
    pub discount_value: f64,
}

impl Coupon {
    /// Short description, e.g. "%10 off" or "₺100.00 off".
    pub fn describe(&self, currency: Currency) -> String {
        match self.discount_type {
            DiscountType::Percentage => format!("%{} off", self.discount_value),
            DiscountType::Amount => {
                format!("{} off", Money::from_decimal(self.discount_value, currency))
            }
        }
    }
}

/// Normalize a user-entered coupon code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> Result<String, CommerceError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CommerceError::EmptyCouponCode);
    }
    Ok(code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 ").unwrap(), "SAVE10");
        assert_eq!(normalize_code("   "), Err(CommerceError::EmptyCouponCode));
        assert_eq!(normalize_code(""), Err(CommerceError::EmptyCouponCode));
    }

    #[test]
    fn test_describe() {
        let pct = Coupon {
            code: "SAVE10".into(),
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
        };
        assert_eq!(pct.describe(Currency::TRY), "%10 off");

        let amount = Coupon {
            code: "TAKE100".into(),
            discount_type: DiscountType::Amount,
            discount_value: 100.0,
        };
        assert_eq!(amount.describe(Currency::TRY), "\u{20ba}100.00 off");
    }

    #[test]
    fn test_discount_type_wire_forms() {
        let c: Coupon =
            serde_json::from_str(r#"{"code":"X","discountType":1,"discountValue":25}"#).unwrap();
        assert_eq!(c.discount_type, DiscountType::Amount);

        let c: Coupon =
            serde_json::from_str(r#"{"code":"Y","discountType":"Percentage","discountValue":5}"#)
                .unwrap();
        assert_eq!(c.discount_type, DiscountType::Percentage);

        assert!(serde_json::from_str::<Coupon>(
            r#"{"code":"Z","discountType":"Bogus","discountValue":5}"#
        )
        .is_err());
    }
}
