//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use shop_cart::{GuestId, ShopSession};
use shop_core::ApiConfig;
use shop_observability::{LogLevel, StructuredLogger};

use crate::output::Output;

/// Config file names searched from the working directory upward.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration (file + environment).
    pub config: ApiConfig,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::find_config(&cwd),
        };

        let config = match &config_path {
            Some(path) => ApiConfig::load(path)?,
            None => ApiConfig::default(),
        }
        .with_env_overrides();

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Logger for the stores. `--verbose` lowers the threshold to debug;
    /// otherwise only warnings and errors reach stderr.
    pub fn logger(&self) -> StructuredLogger {
        let configured = LogLevel::parse(&self.config.log.level).unwrap_or(LogLevel::Info);
        let level = if self.output.is_verbose() {
            configured.min(LogLevel::Debug)
        } else {
            configured.max(LogLevel::Warn)
        };
        StructuredLogger::from_config(&self.config.log).with_min_level(level)
    }

    /// Open a shopping session for the configured identity.
    pub fn session(&self) -> Result<ShopSession> {
        let config = self.config_with_guest()?;
        ShopSession::connect(&config, self.logger()).context("Failed to start shop session")
    }

    /// Effective config with a guest ID, generating and persisting one when
    /// the shopper has neither a token nor a saved guest ID.
    fn config_with_guest(&self) -> Result<ApiConfig> {
        let mut config = self.config.clone();
        let has_guest = config
            .guest_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if config.token.is_some() || has_guest {
            return Ok(config);
        }

        let guest = GuestId::generate();
        config.guest_id = Some(guest.as_str().to_string());

        match &self.config_path {
            Some(path) => {
                // Re-read so environment overrides are not written back.
                let mut on_disk = ApiConfig::load(path)?;
                on_disk.guest_id = config.guest_id.clone();
                on_disk.save(path)?;
                self.output
                    .debug(&format!("Saved guest ID {} to {}", guest, path.display()));
            }
            None => self.output.warn(
                "No config file found; this guest cart will not be remembered. \
                 Run `shop config init` to keep it.",
            ),
        }

        Ok(config)
    }

    /// Path `shop config init` writes to.
    pub fn default_config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_NAMES[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("shop-cli-ctx-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".shop.toml"), "base_url = \"http://localhost:5000\"\n").unwrap();

        let found = Context::find_config(&nested);
        assert_eq!(found, Some(root.join(".shop.toml")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_logger_threshold_follows_verbose() {
        let ctx = Context {
            config: ApiConfig::default(),
            config_path: None,
            output: Output::new(true, false),
            cwd: PathBuf::from("."),
        };
        assert_eq!(ctx.logger().min_level(), LogLevel::Debug);

        let quiet = Context {
            output: Output::new(false, false),
            ..ctx
        };
        assert_eq!(quiet.logger().min_level(), LogLevel::Warn);
    }
}
