//! One shopping session: a cart store and a settings store sharing a client.

use std::sync::Arc;

use shop_commerce::cart::CheckoutSummary;
use shop_commerce::Currency;
use shop_core::{ApiConfig, ConfigError};
use shop_data::{FetchClient, FetchError, TimeoutConfig, Transport};
use shop_observability::StructuredLogger;
use thiserror::Error;

use crate::api::CartApi;
use crate::identity::{GuestId, Identity};
use crate::settings::SettingsStore;
use crate::store::CartStore;

/// Errors creating a session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Currency code not supported.
    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),

    /// Transport could not be built.
    #[error("Failed to create HTTP transport: {0}")]
    Transport(#[from] FetchError),
}

/// Identity described by a config: the signed-in user when a token and
/// user id are set, else the persisted guest, else a fresh guest.
pub fn identity_from_config(config: &ApiConfig) -> Identity {
    match (&config.token, &config.user_id, &config.guest_id) {
        (Some(token), Some(user_id), _) => Identity::user(user_id.as_str(), token.as_str()),
        (_, _, Some(guest_id)) if !guest_id.trim().is_empty() => {
            Identity::guest(GuestId::new(guest_id.trim()))
        }
        _ => Identity::fresh_guest(),
    }
}

/// A session-scoped pair of stores.
///
/// Created on start-up (or login) and torn down with [`ShopSession::teardown`].
#[derive(Debug)]
pub struct ShopSession {
    cart: CartStore,
    settings: SettingsStore,
}

impl ShopSession {
    /// Build a session over an explicit transport.
    pub fn new(
        config: &ApiConfig,
        transport: Arc<dyn Transport>,
        logger: StructuredLogger,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let currency = Currency::from_code(&config.currency)
            .ok_or_else(|| SessionError::UnknownCurrency(config.currency.clone()))?;

        let client = FetchClient::new(transport)
            .with_base_url(config.base_url.clone())
            .with_timeout(TimeoutConfig::from_total(config.timeout()))
            .with_read_retries(config.read_retries);
        let api = CartApi::new(client, currency);

        let identity = identity_from_config(config);
        Ok(Self {
            cart: CartStore::new(api.clone(), identity).with_logger(logger.clone()),
            settings: SettingsStore::new(api).with_logger(logger),
        })
    }

    /// Build a session over the native HTTP transport.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn connect(config: &ApiConfig, logger: StructuredLogger) -> Result<Self, SessionError> {
        let transport = shop_data::ReqwestTransport::new(TimeoutConfig::from_total(config.timeout()).connect)?;
        Self::new(config, Arc::new(transport), logger)
    }

    /// Load settings and cart concurrently. Returns the cart fetch result.
    pub async fn start(&self) -> bool {
        let (_, fetched) = futures::join!(self.settings.load(), self.cart.fetch_cart());
        fetched
    }

    /// The cart store.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The settings store.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Checkout summary from current cart and settings state.
    pub fn summary(&self) -> CheckoutSummary {
        self.cart.summary(&self.settings.state())
    }

    /// Tear the session down; in-flight responses are discarded.
    pub fn teardown(&self) {
        self.cart.logout();
    }
}
