// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Infrastructure Layer (`pet-operator-core`)
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`security`] | HMAC-SHA-256 signature codec and the replay nonce cache |
//! | [`engine_client`] | HTTP relay to the automation engine |

pub mod engine_client;
pub mod security;
