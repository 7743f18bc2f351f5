//! Money type for representing monetary values.
//!
//! Uses integer minor units to avoid floating-point precision issues.
//! The storefront backend speaks decimals; [`decimal`] converts at the
//! serde boundary by rounding to minor units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    TRY,
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
}

impl Currency {
    /// Get the currency code (e.g., "TRY").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::TRY => "TRY",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
        }
    }

    /// Get the currency symbol (e.g., "₺").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::TRY => "\u{20ba}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "TRY" => Some(Currency::TRY),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            _ => None,
        }
    }

    fn multiplier(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., kuruş for TRY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use shop_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(49.99, Currency::TRY);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_cents = (amount * currency.multiplier() as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Create a Money value from whole major units (e.g., 50 lira).
    pub fn from_major(amount: i64, currency: Currency) -> Self {
        Self::new(amount.saturating_mul(currency.multiplier()), currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Same amount, tagged with another currency.
    pub fn with_currency(&self, currency: Currency) -> Self {
        Self::new(self.amount_cents, currency)
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / self.currency.multiplier() as f64
    }

    /// Format as a display string (e.g., "₺49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", self.to_decimal())
    }

    /// Saturating addition within one currency (the other amount is retagged).
    pub fn saturating_add(&self, other: &Money) -> Money {
        Money::new(
            self.amount_cents.saturating_add(other.amount_cents),
            self.currency,
        )
    }

    /// Saturating subtraction within one currency (the other amount is retagged).
    pub fn saturating_sub(&self, other: &Money) -> Money {
        Money::new(
            self.amount_cents.saturating_sub(other.amount_cents),
            self.currency,
        )
    }

    /// Clamp into `[min, max]`, keeping this value's currency.
    pub fn clamp(&self, min: &Money, max: &Money) -> Money {
        let upper = max.amount_cents.max(min.amount_cents);
        Money::new(
            self.amount_cents.clamp(min.amount_cents, upper),
            self.currency,
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Serde helpers for decimal amounts on the wire.
///
/// Accepts JSON numbers and numeric strings; values are tagged with the
/// default currency and retagged by the owning type.
pub mod decimal {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    fn parse(wire: Wire) -> Result<f64, String> {
        match wire {
            Wire::Number(n) => Ok(n),
            Wire::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid decimal amount: {:?}", s)),
        }
    }

    /// Parse a decimal string (e.g., "49.90") into Money.
    pub fn parse_str(value: &str, currency: Currency) -> Option<Money> {
        let n = value.trim().parse::<f64>().ok()?;
        n.is_finite().then(|| Money::from_decimal(n, currency))
    }

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let n = parse(Wire::deserialize(deserializer)?).map_err(serde::de::Error::custom)?;
        Ok(Money::from_decimal(n, Currency::default()))
    }

    /// Optional variant (`null` or missing → `None`).
    pub mod option {
        use super::{parse, Currency, Money, Wire};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            money: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match money {
                Some(m) => serializer.serialize_some(&m.to_decimal()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            match Option::<Wire>::deserialize(deserializer)? {
                Some(wire) => {
                    let n = parse(wire).map_err(serde::de::Error::custom)?;
                    Ok(Some(Money::from_decimal(n, Currency::default())))
                }
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(49.99, Currency::TRY);
        assert_eq!(m.amount_cents, 4999);

        let m = Money::from_decimal(100.0, Currency::JPY);
        assert_eq!(m.amount_cents, 100);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_major(1850, Currency::TRY).display(), "\u{20ba}1850.00");
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
    }

    #[test]
    fn test_clamp() {
        let zero = Money::zero(Currency::TRY);
        let cap = Money::new(1000, Currency::TRY);
        assert_eq!(Money::new(-5, Currency::TRY).clamp(&zero, &cap).amount_cents, 0);
        assert_eq!(Money::new(2000, Currency::TRY).clamp(&zero, &cap).amount_cents, 1000);
        assert_eq!(Money::new(300, Currency::TRY).clamp(&zero, &cap).amount_cents, 300);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("try"), Some(Currency::TRY));
        assert_eq!(Currency::from_code(" EUR "), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
        assert_eq!(Currency::default(), Currency::TRY);
    }

    #[derive(Deserialize)]
    struct Priced {
        #[serde(with = "decimal")]
        price: Money,
        #[serde(default, with = "decimal::option")]
        original: Option<Money>,
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        let p: Priced = serde_json::from_str(r#"{"price": 19.9, "original": "24.50"}"#).unwrap();
        assert_eq!(p.price.amount_cents, 1990);
        assert_eq!(p.original.map(|m| m.amount_cents), Some(2450));

        let p: Priced = serde_json::from_str(r#"{"price": "7", "original": null}"#).unwrap();
        assert_eq!(p.price.amount_cents, 700);
        assert!(p.original.is_none());

        assert!(serde_json::from_str::<Priced>(r#"{"price": "abc"}"#).is_err());
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(
            decimal::parse_str("50", Currency::TRY),
            Some(Money::from_major(50, Currency::TRY))
        );
        assert_eq!(decimal::parse_str("fifty", Currency::TRY), None);
        assert_eq!(decimal::parse_str("NaN", Currency::TRY), None);
    }
}
