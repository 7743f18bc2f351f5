//! Who the cart belongs to.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shop_commerce::UserId;
use shop_data::ClientRequestBuilder;

/// Header carrying the guest id on anonymous calls.
pub const GUEST_ID_HEADER: &str = "X-Guest-Id";

/// Client-generated identifier for an anonymous visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Generate a new random guest id (`guest_` + URL-safe base64).
    pub fn generate() -> Self {
        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("guest_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap an existing id (e.g., one persisted in config).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The active identity of a session.
#[derive(Clone, PartialEq, Eq)]
pub enum Identity {
    /// Authenticated user; calls carry a bearer token.
    User {
        /// Backend user id.
        user_id: UserId,
        /// Bearer token.
        token: String,
    },
    /// Anonymous visitor; calls carry [`GUEST_ID_HEADER`].
    Guest {
        /// Guest id.
        guest_id: GuestId,
    },
}

impl Identity {
    /// Authenticated identity.
    pub fn user(user_id: impl Into<UserId>, token: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Guest identity with a known id.
    pub fn guest(guest_id: GuestId) -> Self {
        Self::Guest { guest_id }
    }

    /// Guest identity with a freshly generated id.
    pub fn fresh_guest() -> Self {
        Self::guest(GuestId::generate())
    }

    /// Check if this is a guest.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// Log label, never containing the token.
    pub fn label(&self) -> String {
        match self {
            Self::User { user_id, .. } => format!("user:{}", user_id),
            Self::Guest { guest_id } => format!("guest:{}", guest_id),
        }
    }

    /// Attach credentials to an outgoing request.
    pub fn authorize(&self, request: ClientRequestBuilder) -> ClientRequestBuilder {
        match self {
            Self::User { token, .. } => request.bearer_auth(token),
            Self::Guest { guest_id } => request.header(GUEST_ID_HEADER, guest_id.as_str()),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { user_id, .. } => f
                .debug_struct("User")
                .field("user_id", user_id)
                .field("token", &"<redacted>")
                .finish(),
            Self::Guest { guest_id } => f.debug_struct("Guest").field("guest_id", guest_id).finish(),
        }
    }
}
