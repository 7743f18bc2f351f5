//! Shipping settings published by the storefront.

use crate::money::{decimal, Currency, Money};
use serde::{Deserialize, Serialize};

/// Settings key holding the flat shipping fee.
pub const SHIPPING_FEE_KEY: &str = "ShippingFee";
/// Settings key holding the free-shipping threshold.
pub const FREE_SHIPPING_THRESHOLD_KEY: &str = "FreeShippingThreshold";

/// Flat fee used when the backend publishes none (major units).
pub const DEFAULT_SHIPPING_FEE: i64 = 50;
/// Threshold used when the backend publishes none (major units).
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 2000;

/// One `{key, value}` pair from the settings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingEntry {
    /// Setting name.
    pub key: String,
    /// Raw value; strings and numbers are both accepted.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl SettingEntry {
    /// Create an entry with a string value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    fn as_money(&self, currency: Currency) -> Option<Money> {
        match &self.value {
            serde_json::Value::String(s) => decimal::parse_str(s, currency),
            serde_json::Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| Money::from_decimal(f, currency)),
            _ => None,
        }
    }
}

/// Flat shipping fee and free-shipping threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSettings {
    /// Fee charged below the threshold.
    pub flat_fee: Money,
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Money,
}

impl ShippingSettings {
    /// Create settings from explicit amounts.
    pub fn new(flat_fee: Money, free_shipping_threshold: Money) -> Self {
        Self {
            flat_fee,
            free_shipping_threshold,
        }
    }

    /// Defaults (50 / 2000) in `currency`.
    pub fn defaults(currency: Currency) -> Self {
        Self::new(
            Money::from_major(DEFAULT_SHIPPING_FEE, currency),
            Money::from_major(DEFAULT_FREE_SHIPPING_THRESHOLD, currency),
        )
    }

    /// Parse from the settings list.
    ///
    /// Missing, unparseable and negative values fall back to the defaults
    /// individually. Key lookup is case-insensitive.
    pub fn from_entries(entries: &[SettingEntry], currency: Currency) -> Self {
        let defaults = Self::defaults(currency);
        let lookup = |key: &str| {
            entries
                .iter()
                .find(|e| e.key.eq_ignore_ascii_case(key))
                .and_then(|e| e.as_money(currency))
                .filter(|m| !m.is_negative())
        };

        Self {
            flat_fee: lookup(SHIPPING_FEE_KEY).unwrap_or(defaults.flat_fee),
            free_shipping_threshold: lookup(FREE_SHIPPING_THRESHOLD_KEY)
                .unwrap_or(defaults.free_shipping_threshold),
        }
    }
}

/// Load state of the shipping settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsState {
    /// Not fetched yet.
    #[default]
    Loading,
    /// Fetched (or fell back to defaults).
    Ready(ShippingSettings),
}

impl SettingsState {
    /// Settings, if loaded.
    pub fn settings(&self) -> Option<&ShippingSettings> {
        match self {
            Self::Loading => None,
            Self::Ready(settings) => Some(settings),
        }
    }

    /// Check if settings are available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
