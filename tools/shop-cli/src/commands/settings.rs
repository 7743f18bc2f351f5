//! Shipping settings.

use anyhow::Result;

use super::{SettingsArgs, SettingsCommand};
use crate::context::Context;

/// Run the settings command.
pub async fn run(args: SettingsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SettingsCommand::Show => show(ctx).await,
    }
}

async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;

    let spinner = ctx.output.spinner("Loading settings...");
    let settings = session.settings().load().await;
    spinner.finish_and_clear();

    if ctx.output.is_json() {
        ctx.output.json(&settings);
        return Ok(());
    }

    ctx.output.header("Shipping");
    ctx.output.shipping_settings(&settings);
    Ok(())
}
