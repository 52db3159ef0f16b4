// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Replay protection: a TTL-bounded set of consumed `actor:nonce` keys.
//!
//! Expired entries are swept lazily on every access, so memory is bounded by
//! the number of distinct keys seen within one TTL window.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("replay detected")]
pub struct ReplayDetected;

pub struct NonceCache {
    ttl: Duration,
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl NonceCache {
    /// `ttl` should be at least the request freshness window, otherwise a
    /// replay could succeed once the nonce record is gone but the timestamp is
    /// still fresh.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Atomically reject `key` if it was consumed within the TTL, otherwise
    /// record it as consumed until `now + ttl`.
    pub fn check_and_consume(&self, key: &str, now: DateTime<Utc>) -> Result<(), ReplayDetected> {
        let mut seen = self.seen.lock();

        let before = seen.len();
        seen.retain(|_, expires_at| *expires_at > now);
        if seen.len() != before {
            debug!(swept = before - seen.len(), "Swept expired nonces");
        }

        if seen.get(key).is_some_and(|expires_at| *expires_at > now) {
            return Err(ReplayDetected);
        }

        seen.insert(key.to_string(), now + self.ttl);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl Default for NonceCache {
    fn default() -> Self {
        Self::new(Duration::minutes(10))
    }
}
