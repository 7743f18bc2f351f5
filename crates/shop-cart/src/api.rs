//! Binding of the storefront cart and settings endpoints.

use serde::Serialize;
use shop_commerce::settings::SettingEntry;
use shop_commerce::{Cart, Currency, ProductId};
use shop_data::{Endpoint, FetchClient, FetchError, Response};
use thiserror::Error;

use crate::identity::Identity;

const CART_PATH: &str = "/api/cart";
const CART_ITEMS_PATH: &str = "/api/cart/items";
const COUPON_PATH: &str = "/api/cart/coupon";
const SETTINGS_PATH: &str = "/api/settings";

/// Fields checked, in order, for a human-readable error message.
const MESSAGE_FIELDS: [&str; 4] = ["message", "error", "title", "detail"];

/// Errors from a single backend call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend was never reached or never answered.
    #[error("network failure: {0}")]
    Network(FetchError),

    /// The backend answered with a business rejection.
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The resource does not exist (404 on a read).
    #[error("not found")]
    NotFound,

    /// The response belongs to a session that has since been torn down.
    #[error("stale response discarded")]
    Stale,

    /// The backend answered 2xx with a body we could not read.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Check if this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<FetchError> for StoreError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::HttpError { status: 404, .. } => StoreError::NotFound,
            FetchError::HttpError { status, message } => StoreError::Rejected { status, message },
            FetchError::ParseError(msg) | FetchError::JsonError(msg) => StoreError::Malformed(msg),
            other => StoreError::Network(other),
        }
    }
}

/// A cart call the store can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCall {
    /// `GET /api/cart`
    Fetch,
    /// `POST /api/cart/items`
    Add { product_id: ProductId, quantity: i64 },
    /// `DELETE /api/cart/items/{id}?quantity=n`
    Decrease { product_id: ProductId, quantity: i64 },
    /// `DELETE /api/cart/items/{id}`
    Remove { product_id: ProductId },
    /// `POST /api/cart/coupon`
    ApplyCoupon { code: String },
    /// `DELETE /api/cart/coupon`
    RemoveCoupon,
}

impl CartCall {
    /// Operation name for logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch_cart",
            Self::Add { .. } => "add_item",
            Self::Decrease { .. } => "decrease_item",
            Self::Remove { .. } => "remove_item",
            Self::ApplyCoupon { .. } => "apply_coupon",
            Self::RemoveCoupon => "remove_coupon",
        }
    }

    /// Product the call targets, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::Add { product_id, .. }
            | Self::Decrease { product_id, .. }
            | Self::Remove { product_id } => Some(*product_id),
            _ => None,
        }
    }
}

/// Cart returned by a call, with the status it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct CartReply {
    /// HTTP status.
    pub status: u16,
    /// Normalized cart; `None` when the backend has no cart.
    pub cart: Option<Cart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    product_id: ProductId,
    quantity: i64,
}

#[derive(Serialize)]
struct CouponBody<'a> {
    code: &'a str,
}

/// Storefront API over a [`FetchClient`].
#[derive(Debug, Clone)]
pub struct CartApi {
    client: FetchClient,
    currency: Currency,
}

impl CartApi {
    /// Create a binding; carts are tagged with `currency`.
    pub fn new(client: FetchClient, currency: Currency) -> Self {
        Self { client, currency }
    }

    /// Currency carts are tagged with.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Issue a cart call on behalf of `identity`.
    pub async fn execute(&self, identity: &Identity, call: &CartCall) -> Result<CartReply, StoreError> {
        let request = match call {
            CartCall::Fetch => self.client.get(CART_PATH).endpoint(Endpoint::Cart),
            CartCall::Add {
                product_id,
                quantity,
            } => self
                .client
                .post(CART_ITEMS_PATH)
                .endpoint(Endpoint::CartMutation)
                .json(&AddItemBody {
                    product_id: *product_id,
                    quantity: *quantity,
                })
                .map_err(StoreError::from)?,
            CartCall::Decrease {
                product_id,
                quantity,
            } => self
                .client
                .delete(format!("{}/{}", CART_ITEMS_PATH, product_id))
                .endpoint(Endpoint::CartMutation)
                .query("quantity", quantity),
            CartCall::Remove { product_id } => self
                .client
                .delete(format!("{}/{}", CART_ITEMS_PATH, product_id))
                .endpoint(Endpoint::CartMutation),
            CartCall::ApplyCoupon { code } => self
                .client
                .post(COUPON_PATH)
                .endpoint(Endpoint::Coupon)
                .json(&CouponBody { code })
                .map_err(StoreError::from)?,
            CartCall::RemoveCoupon => self.client.delete(COUPON_PATH).endpoint(Endpoint::Coupon),
        };

        let response = identity.authorize(request).send().await?;

        match (call, response.status) {
            (CartCall::Fetch, 404) => Err(StoreError::NotFound),
            (_, _) if response.is_success() => Ok(CartReply {
                status: response.status,
                cart: self.parse_cart(&response)?,
            }),
            (_, status) => Err(StoreError::Rejected {
                status,
                message: error_message(&response).unwrap_or_default(),
            }),
        }
    }

    /// Fetch the public settings list.
    pub async fn get_settings(&self) -> Result<Vec<SettingEntry>, StoreError> {
        let response = self
            .client
            .get(SETTINGS_PATH)
            .endpoint(Endpoint::Settings)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn parse_cart(&self, response: &Response) -> Result<Option<Cart>, StoreError> {
        let body = response.bytes();
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        let cart: Cart =
            serde_json::from_value(value).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(Some(cart.with_currency(self.currency).normalize()))
    }
}

/// Human-readable message from an error response.
///
/// Checks the JSON fields `message`, `error`, `title` and `detail`, then
/// falls back to the raw body text. Returns `None` for an empty body.
pub fn error_message(response: &Response) -> Option<String> {
    let text = response.text().ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => MESSAGE_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| Some(text.to_string())),
        Ok(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => Some(text.to_string()),
    }
}
