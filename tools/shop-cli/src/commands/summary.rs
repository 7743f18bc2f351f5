//! Checkout summary.

use anyhow::Result;

use super::cart::open;
use super::SummaryArgs;
use crate::context::Context;

/// Run the summary command.
pub async fn run(_args: SummaryArgs, ctx: &Context) -> Result<()> {
    let session = open(ctx).await?;
    let summary = session.summary();

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.header("Summary");
    ctx.output.summary(&summary);
    Ok(())
}
