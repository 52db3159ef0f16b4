// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use pet_operator_core::domain::operator_config::{OperatorConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./pet-operator.yaml)
        #[arg(short, long, default_value = "./pet-operator.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

/// `shared_secret` as it should be displayed: indirections verbatim, literal
/// values masked.
pub fn masked_secret(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        "(not set)".to_string()
    } else if raw.starts_with("env:") {
        raw.to_string()
    } else {
        "********".to_string()
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./pet-operator.yaml");
        println!("  4. ~/.pet-operator/config.yaml");
        println!("  5. /etc/pet-operator/config.yaml");
        println!();
    }

    let config = OperatorConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Owner:".bold());
    if config.spec.owner.user_id.is_empty() {
        println!("  User ID: {}", "(not set)".yellow());
    } else {
        println!("  User ID: {}", config.spec.owner.user_id);
    }
    println!("  Shared secret: {}", masked_secret(&config.spec.owner.shared_secret));
    println!();

    let engine = &config.spec.engine;
    println!("{}", "Engine:".bold());
    println!("  Base URL: {}", engine.base_url);
    println!("  Require login: {}", engine.require_login);
    println!(
        "  Timeouts: probe {}s, standard {}s, publish {}s",
        engine.timeouts.probe_seconds, engine.timeouts.standard_seconds, engine.timeouts.publish_seconds
    );
    println!();

    println!("{}", "Server:".bold());
    println!("  Listen: {}", config.listen_addr());
    println!();

    println!("{}", "Security:".bold());
    println!("  Freshness window: {}s", config.spec.security.freshness_window_seconds);
    println!("  Nonce TTL: {}s", config.spec.security.nonce_ttl_seconds);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

/// Sample manifest text.
pub fn sample(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    std::fs::write(&output, sample(with_examples))
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
