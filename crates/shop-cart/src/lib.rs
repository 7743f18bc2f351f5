//! Session-scoped cart client for the storefront backend.
//!
//! - [`CartStore`]: in-memory cache of the server cart; every mutation is a
//!   round trip whose response replaces local state
//! - [`SettingsStore`]: shipping settings fetched once per session
//! - [`CartApi`]: binding of the REST endpoints
//! - [`ShopSession`]: both stores over one client, built from config
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_cart::ShopSession;
//! use shop_core::ApiConfig;
//! use shop_observability::StructuredLogger;
//!
//! let config = ApiConfig::load("shop.toml")?.with_env_overrides();
//! let session = ShopSession::connect(&config, StructuredLogger::from_config(&config.log))?;
//! session.start().await;
//!
//! let outcome = session.cart().apply_coupon_code("save10").await;
//! println!("{} ({})", outcome.message, session.summary().grand_total);
//! ```

mod api;
mod identity;
mod session;
mod settings;
mod store;

pub use api::*;
pub use identity::*;
pub use session::*;
pub use settings::*;
pub use store::*;
