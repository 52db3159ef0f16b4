// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Pet Operator CLI
//!
//! The `pet-operator` binary runs the owner-command gateway and offers the
//! owner-side tooling that talks to it.
//!
//! ## Commands
//!
//! - `pet-operator serve` - Run the HTTP gateway in the foreground
//! - `pet-operator sign|send <command>` - Build or send a signed owner command
//! - `pet-operator config show|validate|generate` - Configuration management
//! - `pet-operator tools` - List the tools offered to the driving agent

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use pet_operator::commands::{self, ConfigCommand};
use pet_operator::daemon;

/// Pet Operator - owner-signed command gateway for an autonomous pet account
#[derive(Parser)]
#[command(name = "pet-operator")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PET_OPERATOR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the command gateway
    #[command(name = "serve")]
    Serve {
        /// Override server.bind_address
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a signed command request without sending it
    #[command(name = "sign")]
    Sign {
        /// Command name, e.g. search_feeds
        command: String,

        /// Command arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Sign a command and send it to the gateway
    #[command(name = "send")]
    Send {
        /// Command name, e.g. search_feeds
        command: String,

        /// Command arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Gateway base URL (default: derived from server config)
        #[arg(long, env = "PET_OPERATOR_GATEWAY_URL")]
        gateway: Option<String>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List the tools offered to the driving agent
    #[command(name = "tools")]
    Tools {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => daemon::serve(cli.config, host, port).await,
        Some(Commands::Sign { command, args }) => {
            commands::command::sign(cli.config, &command, &args).await
        }
        Some(Commands::Send { command, args, gateway }) => {
            commands::command::send(cli.config, &command, &args, gateway).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Tools { json }) => commands::tools::list(json),
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_arguments() {
        let cli = Cli::try_parse_from([
            "pet-operator",
            "--log-format",
            "json",
            "send",
            "search_feeds",
            "--args",
            r#"{"keyword":"cats"}"#,
            "--gateway",
            "http://127.0.0.1:9999",
        ])
        .unwrap();

        assert!(matches!(cli.log_format, LogFormat::Json));
        match cli.command {
            Some(Commands::Send { command, args, gateway }) => {
                assert_eq!(command, "search_feeds");
                assert_eq!(args, r#"{"keyword":"cats"}"#);
                assert_eq!(gateway.as_deref(), Some("http://127.0.0.1:9999"));
            }
            _ => panic!("expected send"),
        }
    }
}
