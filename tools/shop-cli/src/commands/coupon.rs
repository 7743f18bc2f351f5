//! Coupon commands.

use anyhow::{bail, Result};

use super::cart::{open, render};
use super::{CouponArgs, CouponCommand};
use crate::context::Context;

/// Run the coupon command.
pub async fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    let session = open(ctx).await?;

    let outcome = match args.command {
        CouponCommand::Apply { code } => session.cart().apply_coupon_code(&code).await,
        CouponCommand::Remove => session.cart().remove_coupon().await,
    };

    if !outcome.success {
        bail!("{}", outcome.message);
    }

    ctx.output.success(&outcome.message);
    render(&session, ctx);
    Ok(())
}
