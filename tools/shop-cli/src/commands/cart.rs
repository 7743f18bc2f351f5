//! Cart commands.

use anyhow::{bail, Result};
use chrono::Local;
use dialoguer::Confirm;
use shop_cart::ShopSession;
use shop_commerce::{Cart, ProductId};

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let session = open(ctx).await?;

    match args.command {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => add(&session, product_id, quantity, ctx).await?,
        CartCommand::Decrease {
            product_id,
            quantity,
        } => decrease(&session, product_id, quantity, ctx).await?,
        CartCommand::Remove { product_id, yes } => {
            if !remove(&session, product_id, yes, ctx).await? {
                return Ok(());
            }
        }
    }

    render(&session, ctx);
    Ok(())
}

/// Start a session and load settings plus the cart.
pub async fn open(ctx: &Context) -> Result<ShopSession> {
    let session = ctx.session()?;

    let spinner = ctx.output.spinner("Loading cart...");
    let loaded = session.start().await;
    spinner.finish_and_clear();

    if !loaded {
        bail!(
            "Could not load the cart from {}. Run with --verbose for details.",
            ctx.config.base_url
        );
    }
    ctx.output
        .debug(&format!("Shopping as {}", session.cart().identity().label()));
    Ok(session)
}

/// Print the cart and its checkout summary.
pub fn render(session: &ShopSession, ctx: &Context) {
    let cart = session.cart().cart();
    let summary = session.summary();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "identity": session.cart().identity().label(),
            "cart": cart,
            "summary": summary,
        }));
        return;
    }

    ctx.output.header("Cart");
    match &cart {
        Some(cart) => ctx.output.cart(cart),
        None => ctx.output.info("Your cart is empty"),
    }

    ctx.output.header("Summary");
    ctx.output.summary(&summary);
    if let Some(terms) = cart.as_ref().and_then(Cart::coupon_terms) {
        ctx.output.kv("Coupon terms", &terms);
    }

    if let Some(synced) = session.cart().last_synced() {
        ctx.output.debug(&format!(
            "Synced at {}",
            synced.with_timezone(&Local).format("%H:%M:%S")
        ));
    }
}

fn product_label(session: &ShopSession, product_id: ProductId) -> String {
    session
        .cart()
        .cart()
        .and_then(|cart| cart.line(product_id).map(|line| line.name.clone()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("product {}", product_id))
}

async fn add(
    session: &ShopSession,
    product_id: ProductId,
    quantity: i64,
    ctx: &Context,
) -> Result<()> {
    if quantity <= 0 {
        bail!("Quantity must be positive, got {}", quantity);
    }
    if !session.cart().add_item(product_id, quantity).await {
        bail!("Could not add product {} to the cart", product_id);
    }
    ctx.output.success(&format!(
        "Added {} × {}",
        quantity,
        product_label(session, product_id)
    ));
    Ok(())
}

async fn decrease(
    session: &ShopSession,
    product_id: ProductId,
    quantity: i64,
    ctx: &Context,
) -> Result<()> {
    if quantity <= 0 {
        bail!("Quantity must be positive, got {}", quantity);
    }
    let label = product_label(session, product_id);
    if !session.cart().decrease_item(product_id, quantity).await {
        bail!("Could not update {} in the cart", label);
    }

    let left = session
        .cart()
        .cart()
        .map(|cart| cart.quantity_of(product_id))
        .unwrap_or(0);
    if left > 0 {
        ctx.output
            .success(&format!("{} now at quantity {}", label, left));
    } else {
        ctx.output.success(&format!("Removed {}", label));
    }
    Ok(())
}

/// Returns `false` when the user declined.
async fn remove(
    session: &ShopSession,
    product_id: ProductId,
    yes: bool,
    ctx: &Context,
) -> Result<bool> {
    let label = product_label(session, product_id);

    if !yes {
        if !ctx.output.is_interactive() {
            bail!(
                "Refusing to remove {} without --yes in a non-interactive session",
                label
            );
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {} from the cart?", label))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(false);
        }
    }

    if !session.cart().remove_item(product_id).await {
        bail!("Could not remove {} from the cart", label);
    }
    ctx.output.success(&format!("Removed {}", label));
    Ok(true)
}
