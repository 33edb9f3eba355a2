//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use orgshare_core::config::AppConfig;
use orgshare_core::result::AppResult;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands. Loading already validated `config`.
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => output::print_item(config, format),
        ConfigCommand::Validate => {
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Log level", &config.logging.level);
            output::print_kv("Log format", &config.logging.format);
            output::print_kv(
                "Concurrent units",
                &config.propagation.max_concurrent_units.to_string(),
            );
            output::print_kv(
                "Attempts per call",
                &config.propagation.max_attempts.to_string(),
            );
            output::print_kv(
                "Backoff",
                &format!(
                    "{}ms..{}ms",
                    config.propagation.initial_backoff_ms, config.propagation.max_backoff_ms
                ),
            );
            output::print_kv(
                "Call timeout",
                &format!("{}ms", config.propagation.operation_timeout_ms),
            );
        }
    }
    Ok(())
}
