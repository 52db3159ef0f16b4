// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Command arguments.
///
/// A sorted map so that the signer and the verifier serialize identical bytes
/// regardless of the order the caller inserted keys in.
pub type CommandArgs = BTreeMap<String, Value>;

/// A signed command issued by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub actor_user_id: String,

    /// Display name of the actor. Informational only, never used for identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_nickname: Option<String>,

    pub command: String,

    /// Missing and `null` both mean no arguments.
    #[serde(default, deserialize_with = "args_or_empty")]
    pub args: CommandArgs,

    /// Seconds since the Unix epoch.
    pub timestamp: i64,

    pub nonce: String,

    /// Lower-case hex HMAC-SHA-256 over the canonical signing string.
    pub signature: String,
}

fn args_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CommandArgs, D::Error> {
    Ok(Option::<CommandArgs>::deserialize(deserializer)?.unwrap_or_default())
}

impl CommandRequest {
    /// Replay-cache key for this request (`actor:nonce`).
    pub fn nonce_key(&self) -> String {
        format!("{}:{}", self.actor_user_id.trim(), self.nonce.trim())
    }
}

/// Uniform response envelope returned for every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandResponse {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: Some(code.into()),
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}
