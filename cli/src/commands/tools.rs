// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Tool catalog listing

use anyhow::Result;
use colored::Colorize;

use pet_operator_core::application::ToolInvocationService;

pub fn list(as_json: bool) -> Result<()> {
    let catalog = ToolInvocationService::catalog();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("{}", "Available tools:".bold());
    for tool in &catalog {
        println!("  {} - {}", tool.name.bold(), tool.description);
        let required = tool.input_schema["required"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        if !required.is_empty() {
            println!("    required: {}", required.dimmed());
        }
    }

    Ok(())
}
