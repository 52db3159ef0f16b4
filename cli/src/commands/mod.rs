// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the pet operator CLI

pub mod command;
pub mod config;
pub mod tools;

pub use self::config::ConfigCommand;
