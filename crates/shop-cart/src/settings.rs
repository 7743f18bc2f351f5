//! Session-scoped shipping settings.

use std::sync::RwLock;

use shop_commerce::settings::{SettingsState, ShippingSettings};
use shop_core::OperationContext;
use shop_observability::StructuredLogger;

use crate::api::CartApi;

/// Shipping settings fetched once per session.
///
/// The cart flow only reads this state; it is never mutated by cart
/// operations.
#[derive(Debug)]
pub struct SettingsStore {
    api: CartApi,
    logger: StructuredLogger,
    state: RwLock<SettingsState>,
    load_lock: tokio::sync::Mutex<()>,
}

impl SettingsStore {
    /// Create a store in the `Loading` state.
    pub fn new(api: CartApi) -> Self {
        Self {
            api,
            logger: StructuredLogger::default(),
            state: RwLock::new(SettingsState::Loading),
            load_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Use `logger` as the base for per-operation loggers.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Load settings, at most once per session.
    ///
    /// Any failure falls back to the defaults (50 / 2000) and logs a warning;
    /// the store always ends up `Ready`.
    pub async fn load(&self) -> ShippingSettings {
        let _guard = self.load_lock.lock().await;
        if let SettingsState::Ready(settings) = self.state() {
            return settings;
        }

        let ctx = OperationContext::new("load_settings");
        let log = self.logger.for_context(&ctx);
        let currency = self.api.currency();

        let settings = match self.api.get_settings().await {
            Ok(entries) => {
                let settings = ShippingSettings::from_entries(&entries, currency);
                log.info_builder("settings loaded")
                    .field_i64("entries", entries.len() as i64)
                    .field_i64("flat_fee_cents", settings.flat_fee.amount_cents)
                    .field_i64(
                        "threshold_cents",
                        settings.free_shipping_threshold.amount_cents,
                    )
                    .emit();
                settings
            }
            Err(error) => {
                log.warn_builder("settings unavailable, using defaults")
                    .field("error", error.to_string())
                    .field_bool("network", error.is_network())
                    .emit();
                ShippingSettings::defaults(currency)
            }
        };

        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = SettingsState::Ready(settings);
        settings
    }

    /// Current state.
    pub fn state(&self) -> SettingsState {
        *self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
