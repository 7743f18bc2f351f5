//! Cart store behaviour against an in-process fake backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use shop_cart::{
    CartStore, GuestId, Identity, ShopSession, GENERIC_REJECTION_MESSAGE, NETWORK_FAILURE_MESSAGE,
};
use shop_commerce::cart::ShippingQuote;
use shop_commerce::settings::SettingsState;
use shop_commerce::{Currency, Money, ProductId};
use shop_core::ApiConfig;
use shop_data::{FetchError, Method, RequestBuilder, StubReply, StubTransport};
use shop_observability::{LogEntry, LogLevel, LogSink, StructuredLogger};

const CATALOG: [(i64, &str, f64, Option<f64>); 4] = [
    (1, "Kettle", 1800.0, None),
    (2, "Mug", 250.0, None),
    (3, "Lamp", 2500.0, None),
    (4, "Tea", 99.9, Some(120.0)),
];

#[derive(Default)]
struct FakeCart {
    exists: bool,
    lines: Vec<(i64, i64)>,
    coupon: Option<(String, f64)>,
}

/// Minimal storefront backend: one cart per process, percentage coupons.
#[derive(Default)]
struct FakeBackend {
    cart: Mutex<FakeCart>,
    settings: Mutex<Option<Value>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeBackend {
    fn handle(&self, req: &RequestBuilder) -> StubReply {
        let path = req.path().to_string();

        // Settings are public; everything under /api/cart needs an identity.
        if req.method() == Method::Get && path == "/api/settings" {
            return match self.settings.lock().unwrap().clone() {
                Some(list) => StubReply::json(200, list),
                None => StubReply::Fail(FetchError::Connection("refused".into())),
            };
        }
        if req.header_value("authorization").is_none() && req.header_value("x-guest-id").is_none() {
            return StubReply::json(401, json!({"title": "Unauthorized"}));
        }

        let reply = match (req.method(), path.as_str()) {
            (Method::Get, "/api/cart") => {
                if !self.cart.lock().unwrap().exists {
                    return StubReply::text(404, "");
                }
                self.cart_reply()
            }
            (Method::Post, "/api/cart/items") => {
                let body: Value = serde_json::from_slice(req.body_bytes().unwrap()).unwrap();
                let id = body["productId"].as_i64().unwrap();
                let qty = body["quantity"].as_i64().unwrap();
                if !CATALOG.iter().any(|p| p.0 == id) {
                    return StubReply::json(404, json!({"message": "Product not found"}));
                }
                {
                    let mut cart = self.cart.lock().unwrap();
                    cart.exists = true;
                    match cart.lines.iter_mut().find(|l| l.0 == id) {
                        Some(line) => line.1 += qty,
                        None => cart.lines.push((id, qty)),
                    }
                }
                self.cart_reply()
            }
            (Method::Delete, "/api/cart/coupon") => {
                self.cart.lock().unwrap().coupon = None;
                self.cart_reply()
            }
            (Method::Delete, p) if p.starts_with("/api/cart/items/") => {
                let id: i64 = p.trim_start_matches("/api/cart/items/").parse().unwrap();
                {
                    let mut cart = self.cart.lock().unwrap();
                    if !cart.lines.iter().any(|l| l.0 == id) {
                        return StubReply::json(404, json!({"message": "Item not in cart"}));
                    }
                    match req.query_param("quantity") {
                        Some(q) => {
                            let q: i64 = q.parse().unwrap();
                            for line in cart.lines.iter_mut().filter(|l| l.0 == id) {
                                line.1 -= q;
                            }
                            cart.lines.retain(|l| l.1 > 0);
                        }
                        None => cart.lines.retain(|l| l.0 != id),
                    }
                }
                self.cart_reply()
            }
            (Method::Post, "/api/cart/coupon") => {
                let body: Value = serde_json::from_slice(req.body_bytes().unwrap()).unwrap();
                match body["code"].as_str().unwrap() {
                    "SAVE10" => {
                        let mut cart = self.cart.lock().unwrap();
                        cart.coupon = Some(("SAVE10".to_string(), 10.0));
                    }
                    "EXPIRED" => {
                        return StubReply::json(400, json!({"message": "Coupon has expired"}))
                    }
                    "SILENT" => return StubReply::text(400, ""),
                    _ => return StubReply::json(400, json!({"message": "Invalid coupon code"})),
                }
                self.cart_reply()
            }
            _ => StubReply::text(405, "method not allowed"),
        };

        match *self.delay.lock().unwrap() {
            Some(delay) => reply.after(delay),
            None => reply,
        }
    }

    fn cart_reply(&self) -> StubReply {
        let cart = self.cart.lock().unwrap();
        let items: Vec<Value> = cart
            .lines
            .iter()
            .map(|(id, qty)| {
                let (_, name, price, original) = CATALOG.iter().find(|p| p.0 == *id).unwrap();
                json!({
                    "productId": id,
                    "productName": name,
                    "price": price,
                    "originalPrice": original,
                    "isOnSale": original.is_some(),
                    "imageUrl": format!("https://img.test/{}.jpg", id),
                    "quantity": qty,
                })
            })
            .collect();
        let subtotal: f64 = cart
            .lines
            .iter()
            .map(|(id, qty)| CATALOG.iter().find(|p| p.0 == *id).unwrap().2 * *qty as f64)
            .sum();
        let discount = cart
            .coupon
            .as_ref()
            .map(|(_, pct)| (subtotal * pct / 100.0 * 100.0).round() / 100.0)
            .unwrap_or(0.0);

        StubReply::json(
            200,
            json!({
                "id": 7,
                "userId": "guest_test",
                "items": items,
                "subtotal": subtotal,
                "discountAmount": discount,
                "total": subtotal - discount,
                "appliedCouponCode": cart.coupon.as_ref().map(|c| c.0.clone()),
                "appliedCoupon": cart.coupon.as_ref().map(|(code, pct)| json!({
                    "code": code,
                    "discountType": "Percentage",
                    "discountValue": pct,
                })),
            }),
        )
    }
}

struct Harness {
    backend: Arc<FakeBackend>,
    stub: StubTransport,
    session: ShopSession,
    logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(FakeBackend::default());
        *backend.settings.lock().unwrap() = Some(json!([
            {"key": "ShippingFee", "value": "50"},
            {"key": "FreeShippingThreshold", "value": "2000"}
        ]));

        let handler = Arc::clone(&backend);
        let stub = StubTransport::from_fn(move |req| handler.handle(req));

        let mut config = ApiConfig::new("http://shop.test");
        config.guest_id = Some("guest_test".to_string());

        let (sink, logs) = LogSink::memory();
        let logger = StructuredLogger::default()
            .with_sink(sink)
            .with_min_level(LogLevel::Debug);

        let session = ShopSession::new(&config, Arc::new(stub.clone()), logger).unwrap();
        Self {
            backend,
            stub,
            session,
            logs,
        }
    }

    fn store(&self) -> &CartStore {
        self.session.cart()
    }

    fn logs_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

fn lira(amount: i64) -> Money {
    Money::from_major(amount, Currency::TRY)
}

#[tokio::test]
async fn fetch_without_cart_is_empty_not_error() {
    let h = Harness::new();

    assert!(h.store().fetch_cart().await);
    assert!(h.store().cart().is_none());
    assert_eq!(h.store().item_count(), 0);
    assert!(h.store().last_synced().is_some());
    assert!(!h.store().is_loading());
}

#[tokio::test]
async fn guest_calls_carry_guest_header() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 1).await;

    let req = &h.stub.requests()[0];
    assert_eq!(req.url(), "http://shop.test/api/cart/items");
    assert_eq!(req.header_value("x-guest-id"), Some("guest_test"));
    assert!(req.header_value("authorization").is_none());
    let body: Value = serde_json::from_slice(req.body_bytes().unwrap()).unwrap();
    assert_eq!(body, json!({"productId": 2, "quantity": 1}));
}

#[tokio::test]
async fn below_threshold_pays_flat_fee() {
    let h = Harness::new();
    assert!(h.session.start().await);
    assert!(h.store().add_item(ProductId::new(1), 1).await);

    let summary = h.session.summary();
    assert_eq!(summary.subtotal, lira(1800));
    assert_eq!(summary.shipping, ShippingQuote::Flat(lira(50)));
    assert_eq!(summary.grand_total, lira(1850));
    assert_eq!(summary.remaining_for_free_shipping, Some(lira(200)));
}

#[tokio::test]
async fn free_shipping_with_coupon() {
    let h = Harness::new();
    h.session.start().await;
    h.store().add_item(ProductId::new(3), 1).await;

    let outcome = h.store().apply_coupon_code("  save10 ").await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(
        outcome.message,
        "Coupon SAVE10 applied (%10 off): \u{20ba}250.00 off"
    );

    let summary = h.session.summary();
    assert_eq!(summary.shipping, ShippingQuote::Free);
    assert_eq!(summary.discount, lira(250));
    assert_eq!(summary.grand_total, lira(2250));
    assert_eq!(summary.applied_coupon.as_deref(), Some("SAVE10"));
}

#[tokio::test]
async fn apply_then_fetch_agree() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 4).await;
    h.store().apply_coupon_code("SAVE10").await;
    let applied = h.store().cart().unwrap();

    assert!(h.store().fetch_cart().await);
    let fetched = h.store().cart().unwrap();

    assert_eq!(applied.discount(), fetched.discount());
    assert_eq!(applied.applied_coupon_code, fetched.applied_coupon_code);
    assert_eq!(fetched.discount(), lira(100));
}

#[tokio::test]
async fn rejected_coupon_leaves_cart_unchanged() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 1).await;
    let before = h.store().cart();

    let outcome = h.store().apply_coupon_code("INVALID").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid coupon code");
    assert_eq!(h.store().cart(), before);

    let outcome = h.store().apply_coupon_code("expired").await;
    assert_eq!(outcome.message, "Coupon has expired");

    let outcome = h.store().apply_coupon_code("silent").await;
    assert_eq!(outcome.message, GENERIC_REJECTION_MESSAGE);

    assert!(h.logs_at(LogLevel::Error).is_empty());
    assert!(h
        .logs_at(LogLevel::Info)
        .iter()
        .any(|e| e.message == "backend rejected request"));
}

#[tokio::test]
async fn empty_coupon_is_rejected_locally() {
    let h = Harness::new();
    let outcome = h.store().apply_coupon_code("   ").await;

    assert!(!outcome.success);
    assert!(!outcome.message.is_empty());
    assert_eq!(h.stub.request_count(), 0);
}

#[tokio::test]
async fn remove_coupon_restores_full_price() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 4).await;
    h.store().apply_coupon_code("SAVE10").await;

    let outcome = h.store().remove_coupon().await;
    assert!(outcome.success);
    let cart = h.store().cart().unwrap();
    assert_eq!(cart.discount(), Money::zero(Currency::TRY));
    assert_eq!(cart.total(), lira(1000));
    assert!(cart.applied_coupon_code.is_none());
}

#[tokio::test]
async fn over_decrease_drops_the_line() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 2).await;
    h.store().add_item(ProductId::new(1), 1).await;

    assert!(h.store().decrease_item(ProductId::new(2), 5).await);

    let cart = h.store().cart().unwrap();
    assert!(cart.line(ProductId::new(2)).is_none());
    assert_eq!(cart.item_count(), 1);

    let req = h.stub.requests().pop().unwrap();
    assert_eq!(req.method(), Method::Delete);
    assert_eq!(req.path(), "/api/cart/items/2");
    assert_eq!(req.query_param("quantity"), Some("5"));
}

#[tokio::test]
async fn remove_uses_delete_line_endpoint() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 3).await;

    assert!(h.store().remove_item(ProductId::new(2)).await);
    assert_eq!(h.store().item_count(), 0);

    let req = h.stub.requests().pop().unwrap();
    assert_eq!(req.path(), "/api/cart/items/2");
    assert_eq!(req.query_param("quantity"), None);
}

#[tokio::test]
async fn failed_mutation_keeps_previous_state() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 1).await;
    let before = h.store().cart();

    assert!(!h.store().add_item(ProductId::new(99), 1).await);
    assert!(!h.store().remove_item(ProductId::new(3)).await);
    assert_eq!(h.store().cart(), before);
}

#[tokio::test]
async fn non_positive_quantity_is_not_sent() {
    let h = Harness::new();
    assert!(!h.store().add_item(ProductId::new(2), 0).await);
    assert!(!h.store().decrease_item(ProductId::new(2), -1).await);
    assert_eq!(h.stub.request_count(), 0);
}

#[tokio::test]
async fn sale_lines_keep_original_price() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(4), 2).await;

    let cart = h.store().cart().unwrap();
    let line = cart.line(ProductId::new(4)).unwrap();
    let display = shop_commerce::cart::compute_line_display(line);
    assert_eq!(display.original, Some(lira(120)));
    assert_eq!(display.effective.amount_cents, 9990);
    assert_eq!(display.line_total.amount_cents, 19980);
}

#[tokio::test(start_paused = true)]
async fn stale_response_after_logout_is_discarded() {
    let h = Arc::new(Harness::new());
    *h.backend.delay.lock().unwrap() = Some(Duration::from_secs(2));

    let task = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.store().add_item(ProductId::new(2), 1).await })
    };
    while h.stub.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(h.store().is_loading());
    let before = h.store().identity();

    h.store().logout();
    assert!(!task.await.unwrap());

    assert!(h.store().cart().is_none());
    assert!(!h.store().is_loading());
    assert_ne!(h.store().identity(), before);
    assert!(h.store().identity().is_guest());
    assert!(h
        .logs_at(LogLevel::Debug)
        .iter()
        .any(|e| e.message == "discarding stale response"));
}

#[tokio::test(start_paused = true)]
async fn call_queued_before_logout_is_dropped() {
    let h = Arc::new(Harness::new());
    *h.backend.delay.lock().unwrap() = Some(Duration::from_secs(2));

    let first = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.store().add_item(ProductId::new(2), 1).await })
    };
    while h.stub.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    let queued = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.store().add_item(ProductId::new(1), 1).await })
    };
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    h.store().logout();
    assert!(!first.await.unwrap());
    assert!(!queued.await.unwrap());

    assert_eq!(h.stub.request_count(), 1);
    assert!(h.store().cart().is_none());
    assert!(h
        .logs_at(LogLevel::Debug)
        .iter()
        .any(|e| e.message == "dropping call queued before session reset"));
}

#[tokio::test(start_paused = true)]
async fn timeout_is_a_network_failure() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 1).await;
    *h.backend.delay.lock().unwrap() = Some(Duration::from_secs(30));

    let outcome = h.store().apply_coupon_code("SAVE10").await;

    assert!(!outcome.success);
    assert_eq!(outcome.message, NETWORK_FAILURE_MESSAGE);
    assert!(h.store().cart().unwrap().applied_coupon_code.is_none());
    assert!(h
        .logs_at(LogLevel::Error)
        .iter()
        .any(|e| e.operation.as_deref() == Some("apply_coupon")));
}

#[tokio::test]
async fn concurrent_mutations_are_serialized() {
    let h = Harness::new();
    let store = h.store();

    let (a, b) = tokio::join!(
        store.add_item(ProductId::new(1), 1),
        store.add_item(ProductId::new(2), 2)
    );

    assert!(a && b);
    assert_eq!(store.item_count(), 3);
    assert_eq!(store.cart().unwrap().unique_item_count(), 2);
}

#[tokio::test]
async fn switch_identity_uses_bearer_and_refetches() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(2), 1).await;

    assert!(h.store().switch_identity(Identity::user("u-1", "tok-1")).await);

    let req = h.stub.requests().pop().unwrap();
    assert_eq!(req.method(), Method::Get);
    assert_eq!(req.header_value("authorization"), Some("Bearer tok-1"));
    assert!(req.header_value("x-guest-id").is_none());
    assert_eq!(h.store().identity(), Identity::user("u-1", "tok-1"));
    assert_eq!(h.store().generation(), 1);
}

#[tokio::test(start_paused = true)]
async fn settings_fall_back_to_defaults() {
    let h = Harness::new();
    *h.backend.settings.lock().unwrap() = None;

    assert_eq!(h.session.settings().state(), SettingsState::Loading);
    let settings = h.session.settings().load().await;

    assert_eq!(settings.flat_fee, lira(50));
    assert_eq!(settings.free_shipping_threshold, lira(2000));
    assert!(h.session.settings().state().is_ready());
    assert_eq!(h.logs_at(LogLevel::Warn).len(), 1);
    // One attempt plus the configured read retry.
    assert_eq!(h.stub.request_count(), 2);
}

#[tokio::test]
async fn settings_load_once_per_session() {
    let h = Harness::new();
    h.session.settings().load().await;
    h.session.settings().load().await;

    let settings_calls = h
        .stub
        .requests()
        .iter()
        .filter(|r| r.path() == "/api/settings")
        .count();
    assert_eq!(settings_calls, 1);
}

#[tokio::test]
async fn published_settings_drive_the_summary() {
    let h = Harness::new();
    *h.backend.settings.lock().unwrap() = Some(json!([
        {"key": "shippingFee", "value": "39.90"},
        {"key": "FreeShippingThreshold", "value": "1500"}
    ]));
    assert!(h.session.start().await);

    let settings = h.session.settings().load().await;
    assert_eq!(settings.flat_fee.amount_cents, 3990);
    assert_eq!(settings.free_shipping_threshold, lira(1500));
    assert!(h.logs_at(LogLevel::Warn).is_empty());

    h.store().add_item(ProductId::new(2), 4).await;
    let summary = h.session.summary();
    assert_eq!(summary.shipping, ShippingQuote::Flat(Money::new(3990, Currency::TRY)));
    assert_eq!(summary.grand_total.amount_cents, 103_990);
    assert_eq!(summary.remaining_for_free_shipping, Some(lira(500)));

    h.store().add_item(ProductId::new(2), 2).await;
    let summary = h.session.summary();
    assert_eq!(summary.shipping, ShippingQuote::Free);
    assert_eq!(summary.grand_total, lira(1500));
}

#[tokio::test]
async fn summary_while_settings_load_is_calculating() {
    let h = Harness::new();
    h.store().add_item(ProductId::new(1), 1).await;

    let summary = h.session.summary();
    assert!(summary.shipping.is_calculating());
    assert_eq!(summary.grand_total, lira(1800));
}

#[test]
fn guest_from_config_is_reused() {
    let id = GuestId::new("guest_test");
    assert_eq!(Identity::guest(id.clone()).label(), format!("guest:{}", id));
}
