// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer (`pet-operator-core`)
//!
//! Pure types and policy with no I/O.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`command`] | Inbound signed command request and response envelope |
//! | [`errors`] | Gateway error taxonomy with stable machine-readable codes |
//! | [`owner`] | Owner identity binding and forbidden-command deny-list |
//! | [`relay`] | Outbound port to the automation engine |
//! | [`route`] | Static allowlist mapping commands to upstream call shapes |
//! | [`session`] | Autonomous session aggregate and status snapshot |
//! | [`operator_config`] | YAML configuration manifest, discovery and validation |

pub mod command;
pub mod errors;
pub mod operator_config;
pub mod owner;
pub mod relay;
pub mod route;
pub mod session;
