// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Pet Operator Core
//!
//! Owner-signed command gateway, engine relay and cooperative autonomy
//! session control.
//!
//! # Architecture
//!
//! - **domain:** requests, owner policy, route table, session aggregate, config
//! - **application:** authorize-then-dispatch gateway, session controller, tool surface
//! - **infrastructure:** HMAC signature codec, nonce cache, engine HTTP client
//! - **presentation:** Axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
