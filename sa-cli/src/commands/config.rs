//! Configuration commands.

use std::path::Path;

use clap::Subcommand;
use console::style;

use sa_api::credentials::mask;
use sa_core::config::AppConfig;
use sa_core::error::{SaError, SaResult};

use super::print_json;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration. Credentials are masked.
    Show,
    /// Write a configuration file.
    Init {
        /// API key (sa_api_key_...).
        #[arg(long)]
        api_key: Option<String>,
        /// User id (sa_user_id_...).
        #[arg(long)]
        user_id: Option<String>,
        /// Default website hostname.
        #[arg(long)]
        hostname: Option<String>,
        /// Default timezone.
        #[arg(long)]
        timezone: Option<String>,
        /// API base URL.
        #[arg(long)]
        base_url: Option<String>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn run(config: &AppConfig, path: &Path, action: ConfigAction, format: OutputFormat) -> SaResult<()> {
    match action {
        ConfigAction::Show => show(config, path, format),
        ConfigAction::Init {
            api_key,
            user_id,
            hostname,
            timezone,
            base_url,
            force,
        } => {
            if path.exists() && !force {
                return Err(SaError::Config(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                )));
            }

            let mut new_config = AppConfig::default();
            new_config.credentials.api_key = api_key;
            new_config.credentials.user_id = user_id;
            new_config.defaults.hostname = hostname;
            new_config.defaults.timezone = timezone;
            if let Some(url) = base_url {
                new_config.server.base_url = AppConfig::sanitize_base_url(&url);
            }
            new_config.save_to_file(path)?;

            println!("{} {}", style("Wrote").green(), path.display());
            if !new_config.has_credentials() {
                println!(
                    "{}",
                    style("No credentials set: export and admin commands will fail.").yellow()
                );
            }
            Ok(())
        }
    }
}

fn show(config: &AppConfig, path: &Path, format: OutputFormat) -> SaResult<()> {
    let masked = |v: &Option<String>| v.as_deref().map(mask);

    match format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "path": path.display().to_string(),
                "credentials": {
                    "api_key": masked(&config.credentials.api_key),
                    "user_id": masked(&config.credentials.user_id),
                },
                "server": config.server,
                "logging": config.logging,
                "defaults": config.defaults,
            }));
        }
        OutputFormat::Text => {
            let unset = || style("(unset)").dim().to_string();
            println!("{} {}", style("Config file:").bold(), path.display());
            println!("  api_key:   {}", masked(&config.credentials.api_key).unwrap_or_else(unset));
            println!("  user_id:   {}", masked(&config.credentials.user_id).unwrap_or_else(unset));
            println!("  base_url:  {}", config.server.base_url);
            println!("  timeout:   {}s", config.server.timeout_secs);
            println!(
                "  hostname:  {}",
                config.defaults.hostname.clone().unwrap_or_else(unset)
            );
            println!(
                "  timezone:  {}",
                config.defaults.timezone.clone().unwrap_or_else(unset)
            );
            println!("  log level: {}", config.logging.level);
        }
    }
    Ok(())
}
