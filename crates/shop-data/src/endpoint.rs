//! Endpoint tagging for semantic categorization of backend calls.

use std::time::Duration;

/// Backend call categories with semantic meaning.
///
/// Each tag carries a default timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Reading the current cart.
    Cart,
    /// Adding, decreasing or removing cart lines.
    CartMutation,
    /// Applying or removing a coupon.
    Coupon,
    /// Public store settings (shipping fee, threshold).
    Settings,
    /// Custom endpoint with name.
    Custom(&'static str),
}

impl Endpoint {
    /// Get the default total timeout for this endpoint.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Cart | Self::CartMutation | Self::Coupon => Duration::from_secs(10),
            Self::Settings => Duration::from_secs(5),
            Self::Custom(_) => Duration::from_secs(10),
        }
    }

    /// Get the default max retries for this endpoint.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Settings => 2,
            Self::Cart => 1,
            // Mutations are never retried
            Self::CartMutation | Self::Coupon | Self::Custom(_) => 0,
        }
    }

    /// Check whether calls to this endpoint change server state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::CartMutation | Self::Coupon)
    }

    /// Get the name of this endpoint.
    pub fn name(&self) -> &str {
        match self {
            Self::Cart => "cart",
            Self::CartMutation => "cart_mutation",
            Self::Coupon => "coupon",
            Self::Settings => "settings",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_are_not_retried() {
        assert_eq!(Endpoint::CartMutation.default_max_retries(), 0);
        assert_eq!(Endpoint::Coupon.default_max_retries(), 0);
        assert!(Endpoint::Coupon.is_mutation());
        assert!(!Endpoint::Settings.is_mutation());
    }

    #[test]
    fn test_cart_timeout() {
        assert_eq!(Endpoint::Cart.default_timeout(), Duration::from_secs(10));
        assert_eq!(Endpoint::Custom("x").name(), "x");
    }
}
