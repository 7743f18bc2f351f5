//! Structured logging for the storefront cart client.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with operation context
//! - `LogBuilder` - Fluent construction of entries with typed fields
//! - `LogSink` - Where entries go (stderr, memory, `tracing`)

mod logging;

pub use logging::*;

// Re-export RequestId from shop-core for convenience
pub use shop_core::RequestId;
