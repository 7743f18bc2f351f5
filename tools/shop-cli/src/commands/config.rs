//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use shop_core::{generate_default_config, ApiConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { base_url, force } => init_config(&base_url, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn redacted(config: &ApiConfig) -> ApiConfig {
    let mut shown = config.clone();
    if shown.token.is_some() {
        shown.token = Some("***".to_string());
    }
    shown
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = redacted(&ctx.config);

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("");
    ctx.output.kv("base_url", &config.base_url);
    ctx.output.kv("currency", &config.currency);
    ctx.output.kv("timeout_ms", &config.timeout_ms.to_string());
    ctx.output.kv("read_retries", &config.read_retries.to_string());

    ctx.output.info("");
    ctx.output.info("[identity]");
    match (&config.user_id, &config.guest_id) {
        (Some(user_id), _) if config.token.is_some() => {
            ctx.output.kv("user_id", user_id);
            ctx.output.kv("token", "***");
        }
        (_, Some(guest_id)) => ctx.output.kv("guest_id", guest_id),
        _ => ctx.output.list_item("guest (ID assigned on first cart command)"),
    }

    ctx.output.info("");
    ctx.output.info("[log]");
    ctx.output.kv("format", &config.log.format);
    ctx.output.kv("level", &config.log.level);

    Ok(())
}

fn init_config(base_url: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.default_config_path();

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = generate_default_config(base_url);
    ApiConfig::parse(&content, false).map_err(anyhow::Error::msg)?.validate()?;
    fs::write(&config_path, content)?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = ctx.config.validate() {
        bail!("{}", e);
    }

    if shop_commerce::Currency::from_code(&ctx.config.currency).is_none() {
        bail!("currency '{}' is not supported", ctx.config.currency);
    }

    if ctx.config.base_url.starts_with("http://")
        && !ctx.config.base_url.contains("localhost")
        && !ctx.config.base_url.contains("127.0.0.1")
    {
        warnings.push("base_url uses plain http for a non-local host".to_string());
    }

    if ctx.config.read_retries > 3 {
        warnings.push(format!(
            "read_retries = {} will make failures slow to surface",
            ctx.config.read_retries
        ));
    }

    if ctx.config.token.is_none() && ctx.config.guest_id.is_none() {
        warnings.push("no guest_id yet; one is created on the first cart command".to_string());
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
