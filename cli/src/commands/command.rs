// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Owner-side commands: sign, send

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use pet_operator_core::domain::operator_config::OperatorConfig;
use pet_operator_sdk::{CommandArgs, Credentials, OperatorClient};

/// Parse `--args` as a JSON object.
pub fn parse_args(raw: &str) -> Result<CommandArgs> {
    serde_json::from_str(raw).with_context(|| format!("--args must be a JSON object, got: {}", raw))
}

/// Gateway base URL: the explicit override, else the configured listen
/// address (wildcard binds are reached through loopback).
pub fn gateway_url(config: &OperatorConfig, gateway_override: Option<String>) -> String {
    if let Some(url) = gateway_override {
        return url;
    }
    let host = match config.spec.server.bind_address.as_str() {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    };
    format!("http://{}:{}", host, config.spec.server.port)
}

fn owner_client(config: &OperatorConfig, base_url: String) -> Result<OperatorClient> {
    if config.spec.owner.user_id.is_empty() {
        bail!("spec.owner.user_id is not configured");
    }
    let secret = config
        .resolved_secret()
        .context("Failed to resolve owner shared secret")?;
    Ok(OperatorClient::new(
        base_url,
        Credentials::new(config.spec.owner.user_id.clone(), secret),
    ))
}

pub async fn sign(config_path: Option<PathBuf>, command: &str, raw_args: &str) -> Result<()> {
    let config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;
    let args = parse_args(raw_args)?;

    let client = owner_client(&config, gateway_url(&config, None))?;
    let request = client.sign(command, args);

    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

pub async fn send(
    config_path: Option<PathBuf>,
    command: &str,
    raw_args: &str,
    gateway_override: Option<String>,
) -> Result<()> {
    let config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;
    let args = parse_args(raw_args)?;

    let url = gateway_url(&config, gateway_override);
    let client = owner_client(&config, url.clone())?;

    println!("Sending {} to {}...", command.bold(), url);
    let response = client.send(command, args).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.ok {
        println!("{}", "✓ Command accepted".green());
        Ok(())
    } else {
        bail!(
            "Command rejected: {}",
            response.code.as_deref().unwrap_or("unknown")
        )
    }
}
