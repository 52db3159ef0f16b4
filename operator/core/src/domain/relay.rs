// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Outbound port to the automation engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::command::CommandArgs;
use crate::domain::errors::GatewayError;

/// Normalized engine reply. `status` is the engine's HTTP status, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub data: Map<String, Value>,
    pub status: u16,
}

impl RelayOutcome {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Convert an engine error status into [`GatewayError::UpstreamError`].
    pub fn into_result(self) -> Result<Map<String, Value>, GatewayError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(GatewayError::UpstreamError {
                status: self.status,
                body: Value::Object(self.data),
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStatus {
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[async_trait]
pub trait CommandRelay: Send + Sync {
    /// Relay an allowlisted command. Unknown commands fail with
    /// [`GatewayError::CommandNotAllowed`] without touching the network.
    async fn dispatch(&self, command: &str, args: &CommandArgs) -> Result<RelayOutcome, GatewayError>;

    async fn login_status(&self) -> Result<LoginStatus, GatewayError>;

    /// Start the QR-code login flow on the engine.
    async fn trigger_login(&self) -> Result<Map<String, Value>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_status_becomes_upstream_error() {
        let mut data = Map::new();
        data.insert("error".into(), json!("boom"));
        let outcome = RelayOutcome { data, status: 502 };

        match outcome.into_result() {
            Err(GatewayError::UpstreamError { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, json!({"error": "boom"}));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_redirect_status_is_success() {
        let outcome = RelayOutcome { data: Map::new(), status: 302 };
        assert!(outcome.into_result().is_ok());
    }
}
