use std::time::Duration;

use clap::Parser;
use ledger::UserId;
use serde::Deserialize;

use crate::{commands::Command, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/pocket.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Signed-in user. Empty means signed out.
    pub user_id: String,
    pub timeout_secs: u64,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001/api".to_string(),
            user_id: String::new(),
            timeout_secs: 10,
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn session_user(&self) -> Option<UserId> {
        let user = self.user_id.trim();
        (!user.is_empty()).then(|| UserId::new(user))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Parser)]
#[command(name = "pocket", about = "Personal ledger client", disable_version_flag = true)]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override API root (e.g. http://127.0.0.1:5001/api).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the signed-in user.
    #[arg(long = "user", global = true)]
    user_id: Option<String>,
    /// Override request timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Override log level.
    #[arg(long, global = true)]
    level: Option<String>,
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Layers the config file, then `POCKET_*` variables, then flags.
    pub fn settings(&self) -> Result<AppConfig> {
        let config_path = self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("POCKET"));
        let mut settings: AppConfig = builder.build()?.try_deserialize()?;

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(user_id) = &self.user_id {
            settings.user_id = user_id.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
        if let Some(level) = &self.level {
            settings.level = level.clone();
        }

        Ok(settings)
    }
}
