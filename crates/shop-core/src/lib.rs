//! Core abstractions for the storefront cart client.
//!
//! This crate provides the fundamental types shared by every layer:
//! - `ApiConfig` - Backend endpoint and client configuration
//! - `RequestId` - Per-operation correlation identifier
//! - `TimingContext` - Operation timing marks

mod config;
mod context;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
