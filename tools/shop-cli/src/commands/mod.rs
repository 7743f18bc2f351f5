//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod coupon;
pub mod settings;
pub mod summary;

use clap::{Args, Subcommand};
use shop_commerce::ProductId;

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart lines and totals
    Show,

    /// Add a product to the cart
    Add {
        /// Product ID.
        product_id: ProductId,

        /// Quantity to add.
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },

    /// Decrease the quantity of a product
    Decrease {
        /// Product ID.
        product_id: ProductId,

        /// Quantity to take off.
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },

    /// Remove a product line entirely
    Remove {
        /// Product ID.
        product_id: ProductId,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    #[command(subcommand)]
    pub command: CouponCommand,
}

/// Coupon subcommands.
#[derive(Subcommand)]
pub enum CouponCommand {
    /// Apply a coupon code
    Apply {
        /// Coupon code (case-insensitive).
        code: String,
    },

    /// Remove the applied coupon
    Remove,
}

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {}

/// Arguments for the settings command.
#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands.
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the flat shipping fee and free-shipping threshold
    Show,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show,

    /// Create a config file in the current directory
    Init {
        /// Backend base URL.
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}
