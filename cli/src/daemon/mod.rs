// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Gateway daemon
//!
//! Handles:
//! - Configuration loading and validation
//! - Wiring the engine client, gateway and HTTP router
//! - Graceful shutdown

pub mod server;

pub use server::serve;
