// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod nonce_cache;
pub mod signature;

pub use nonce_cache::{NonceCache, ReplayDetected};
pub use signature::{canonicalize, sign, verify};
