//! Session-scoped cart store.
//!
//! The store caches the server's cart for one identity. Every mutation is a
//! round trip whose response replaces local state wholesale; nothing is
//! merged or recomputed locally. Mutations are serialized by an async mutex,
//! and a generation counter discards responses that return after the
//! session they belong to was torn down.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shop_commerce::cart::{normalize_code, summarize, Cart, CheckoutSummary};
use shop_commerce::settings::SettingsState;
use shop_commerce::ProductId;
use shop_core::{LifecyclePhase, OperationContext};
use shop_observability::StructuredLogger;

use crate::api::{CartApi, CartCall, CartReply, StoreError};
use crate::identity::Identity;

/// Message shown when the backend could not be reached.
pub const NETWORK_FAILURE_MESSAGE: &str = "Could not reach the store. Please try again.";

/// Message shown when a rejection carried no text.
pub const GENERIC_REJECTION_MESSAGE: &str = "The coupon could not be applied.";

/// Result of a user-facing mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Whether the backend accepted the change.
    pub success: bool,
    /// Message suitable for display.
    pub message: String,
}

impl MutationOutcome {
    /// Successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
struct StoreState {
    cart: Option<Cart>,
    identity: Identity,
    last_synced: Option<DateTime<Utc>>,
}

/// In-memory cache of the authoritative cart for one session.
///
/// All operations report success as `bool` or [`MutationOutcome`]; none
/// returns an error or panics.
#[derive(Debug)]
pub struct CartStore {
    api: CartApi,
    logger: StructuredLogger,
    state: Mutex<StoreState>,
    mutation: tokio::sync::Mutex<()>,
    loading: AtomicBool,
    generation: AtomicU64,
}

impl CartStore {
    /// Create a store for `identity`. The cart starts empty; call
    /// [`CartStore::fetch_cart`] to load it.
    pub fn new(api: CartApi, identity: Identity) -> Self {
        Self {
            api,
            logger: StructuredLogger::default(),
            state: Mutex::new(StoreState {
                cart: None,
                identity,
                last_synced: None,
            }),
            mutation: tokio::sync::Mutex::new(()),
            loading: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Use `logger` as the base for per-operation loggers.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Load the cart for the active identity.
    ///
    /// A 404 leaves an empty cart and counts as success. Any other failure
    /// also leaves an empty cart but returns `false`.
    pub async fn fetch_cart(&self) -> bool {
        match self.run(CartCall::Fetch).await {
            Ok(()) => true,
            Err(StoreError::Stale) => false,
            Err(StoreError::NotFound) => true,
            Err(_) => false,
        }
    }

    /// Add `quantity` of a product.
    pub async fn add_item(&self, product_id: ProductId, quantity: i64) -> bool {
        if !self.check_quantity("add_item", quantity) {
            return false;
        }
        self.run(CartCall::Add {
            product_id,
            quantity,
        })
        .await
        .is_ok()
    }

    /// Decrease a line by `quantity`; the line disappears once it reaches zero.
    pub async fn decrease_item(&self, product_id: ProductId, quantity: i64) -> bool {
        if !self.check_quantity("decrease_item", quantity) {
            return false;
        }
        self.run(CartCall::Decrease {
            product_id,
            quantity,
        })
        .await
        .is_ok()
    }

    /// Remove a whole line.
    pub async fn remove_item(&self, product_id: ProductId) -> bool {
        self.run(CartCall::Remove { product_id }).await.is_ok()
    }

    /// Apply a coupon code.
    ///
    /// The code is trimmed and upper-cased; an empty code is rejected
    /// without a network call. Backend rejections are surfaced verbatim.
    pub async fn apply_coupon_code(&self, code: &str) -> MutationOutcome {
        let code = match normalize_code(code) {
            Ok(code) => code,
            Err(e) => return MutationOutcome::failed(e.to_string()),
        };

        match self.run(CartCall::ApplyCoupon { code: code.clone() }).await {
            Ok(()) => {
                let cart = self.cart();
                let discount = cart.as_ref().map(Cart::discount);
                let terms = cart.as_ref().and_then(Cart::coupon_terms);
                match (discount, terms) {
                    (Some(discount), Some(terms)) if discount.is_positive() => {
                        MutationOutcome::ok(format!(
                            "Coupon {} applied ({}): {} off",
                            code,
                            terms,
                            discount.display()
                        ))
                    }
                    (Some(discount), None) if discount.is_positive() => MutationOutcome::ok(
                        format!("Coupon {} applied: {} off", code, discount.display()),
                    ),
                    _ => MutationOutcome::ok(format!("Coupon {} applied", code)),
                }
            }
            Err(e) => Self::failure_outcome(e),
        }
    }

    /// Remove the applied coupon.
    pub async fn remove_coupon(&self) -> MutationOutcome {
        match self.run(CartCall::RemoveCoupon).await {
            Ok(()) => MutationOutcome::ok("Coupon removed"),
            Err(e) => Self::failure_outcome(e),
        }
    }

    /// Switch to another identity (e.g., after login) and load its cart.
    ///
    /// Responses still in flight for the previous identity are discarded.
    pub async fn switch_identity(&self, identity: Identity) -> bool {
        self.reset(identity);
        self.fetch_cart().await
    }

    /// Tear down the session: clear the cart and revert to a fresh guest.
    pub fn logout(&self) {
        self.reset(Identity::fresh_guest());
    }

    /// Current cart; `None` means empty.
    pub fn cart(&self) -> Option<Cart> {
        self.lock_state().cart.clone()
    }

    /// True while a call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Sum of quantities in the cart.
    pub fn item_count(&self) -> i64 {
        self.lock_state()
            .cart
            .as_ref()
            .map(Cart::item_count)
            .unwrap_or(0)
    }

    /// When the cart was last replaced from a server response.
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_synced
    }

    /// Active identity.
    pub fn identity(&self) -> Identity {
        self.lock_state().identity.clone()
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Checkout summary of the current cart.
    pub fn summary(&self, settings: &SettingsState) -> CheckoutSummary {
        let cart = self
            .cart()
            .unwrap_or_else(|| Cart::empty(self.api.currency()));
        summarize(&cart, settings)
    }

    fn reset(&self, identity: Identity) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let label = identity.label();
        {
            let mut state = self.lock_state();
            state.cart = None;
            state.identity = identity;
            state.last_synced = None;
        }
        self.logger
            .for_operation("reset_session")
            .with_identity(label)
            .info_builder("session reset")
            .field_i64("generation", generation as i64)
            .emit();
    }

    fn check_quantity(&self, operation: &str, quantity: i64) -> bool {
        if quantity > 0 {
            return true;
        }
        self.logger
            .for_operation(operation)
            .warn_builder("rejected non-positive quantity")
            .field_i64("quantity", quantity)
            .emit();
        false
    }

    fn failure_outcome(error: StoreError) -> MutationOutcome {
        match error {
            StoreError::Rejected { message, .. } if !message.trim().is_empty() => {
                MutationOutcome::failed(message)
            }
            StoreError::Rejected { .. } | StoreError::NotFound | StoreError::Malformed(_) => {
                MutationOutcome::failed(GENERIC_REJECTION_MESSAGE)
            }
            StoreError::Network(_) => MutationOutcome::failed(NETWORK_FAILURE_MESSAGE),
            StoreError::Stale => MutationOutcome::failed("Session changed before the request finished."),
        }
    }

    /// Issue one call and replace local state with its response.
    async fn run(&self, call: CartCall) -> Result<(), StoreError> {
        let mut ctx = OperationContext::new(call.operation());

        // The call belongs to the session it was issued in, not the one
        // current when the queue reaches it.
        let generation = self.generation();
        let identity = self.identity();
        let log = self.logger.for_context(&ctx).with_identity(identity.label());

        let _guard = self.mutation.lock().await;
        if self.generation() != generation {
            ctx.timing.mark_phase(&LifecyclePhase::Discarded);
            log.debug_builder("dropping call queued before session reset")
                .field_i64("generation", generation as i64)
                .emit();
            return Err(StoreError::Stale);
        }

        self.loading.store(true, Ordering::SeqCst);
        ctx.timing.mark_phase(&LifecyclePhase::RequestSent);
        let result = self.api.execute(&identity, &call).await;
        self.loading.store(false, Ordering::SeqCst);

        if self.generation() != generation {
            ctx.timing.mark_phase(&LifecyclePhase::Discarded);
            log.debug_builder("discarding stale response")
                .field_i64("generation", generation as i64)
                .emit();
            return Err(StoreError::Stale);
        }

        match result {
            Ok(reply) => {
                ctx.timing
                    .mark_phase(&LifecyclePhase::ResponseReceived(reply.status));
                self.replace(&log, &call, reply);
                ctx.timing.mark_phase(&LifecyclePhase::StateReplaced);
                if let Some(round_trip) = ctx.timing.round_trip() {
                    log.debug_builder("round trip")
                        .duration_ms("round_trip_ms", round_trip)
                        .emit();
                }
                Ok(())
            }
            Err(StoreError::NotFound) if call == CartCall::Fetch => {
                ctx.timing.mark_phase(&LifecyclePhase::ResponseReceived(404));
                log.info("no cart for identity");
                self.replace(
                    &log,
                    &call,
                    CartReply {
                        status: 404,
                        cart: None,
                    },
                );
                Err(StoreError::NotFound)
            }
            Err(error) => {
                ctx.timing
                    .mark_phase(&LifecyclePhase::Error(error.to_string()));
                self.log_failure(&log, &call, &error);
                if call == CartCall::Fetch {
                    let mut state = self.lock_state();
                    state.cart = None;
                }
                Err(error)
            }
        }
    }

    fn replace(&self, log: &StructuredLogger, call: &CartCall, reply: CartReply) {
        if let Some(cart) = &reply.cart {
            for mismatch in cart.totals_mismatch() {
                log.warn_builder("reported total disagrees with derived total")
                    .field("field", mismatch.field)
                    .field_i64("reported_cents", mismatch.reported.amount_cents)
                    .field_i64("derived_cents", mismatch.derived.amount_cents)
                    .emit();
            }
        }

        let mut builder = log
            .info_builder("cart replaced")
            .field_i64("status", reply.status as i64)
            .field_i64(
                "items",
                reply.cart.as_ref().map(Cart::item_count).unwrap_or(0),
            )
            .field_i64(
                "total_cents",
                reply
                    .cart
                    .as_ref()
                    .map(|c| c.total().amount_cents)
                    .unwrap_or(0),
            );
        if let Some(product_id) = call.product_id() {
            builder = builder.field_i64("product_id", product_id.get());
        }
        builder.emit();

        let mut state = self.lock_state();
        state.cart = reply.cart;
        state.last_synced = Some(Utc::now());
    }

    fn log_failure(&self, log: &StructuredLogger, call: &CartCall, error: &StoreError) {
        let builder = match error {
            StoreError::Network(_) | StoreError::Malformed(_) => {
                log.error_builder("backend call failed")
            }
            StoreError::Rejected { status, .. } => log
                .info_builder("backend rejected request")
                .field_i64("status", *status as i64),
            StoreError::NotFound | StoreError::Stale => log.info_builder("backend call not applied"),
        };
        let builder = builder.field("error", error.to_string());
        match call.product_id() {
            Some(product_id) => builder.field_i64("product_id", product_id.get()).emit(),
            None => builder.emit(),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcome_messages() {
        let rejected = CartStore::failure_outcome(StoreError::Rejected {
            status: 400,
            message: "Coupon expired".into(),
        });
        assert_eq!(rejected, MutationOutcome::failed("Coupon expired"));

        let blank = CartStore::failure_outcome(StoreError::Rejected {
            status: 400,
            message: " ".into(),
        });
        assert_eq!(blank.message, GENERIC_REJECTION_MESSAGE);

        let network =
            CartStore::failure_outcome(StoreError::Network(shop_data::FetchError::Timeout));
        assert!(!network.success);
        assert_eq!(network.message, NETWORK_FAILURE_MESSAGE);
    }
}
