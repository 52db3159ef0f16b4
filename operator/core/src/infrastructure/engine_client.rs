// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Engine HTTP Client
//!
//! Relays allowlisted commands to the local automation engine.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Turn a logical command into the engine's HTTP call shape
//! - **Integration:** Gateway / tool service → `EngineClient` → engine REST API
//!
//! Every reply is normalized into a JSON object: a zero-length body becomes
//! `{"status": "ok"}`, a JSON object passes through verbatim, anything else is
//! wrapped as `{"raw": <text>}`. The engine's HTTP status is reported as-is.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::command::CommandArgs;
use crate::domain::errors::GatewayError;
use crate::domain::relay::{CommandRelay, LoginStatus, RelayOutcome};
use crate::domain::route::{self, HttpMethod, RouteEntry, TimeoutPolicy};

pub struct EngineClient {
    base_url: String,
    timeouts: TimeoutPolicy,
    client: Client,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>, timeouts: TimeoutPolicy) -> Self {
        Self::with_client(base_url, timeouts, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, timeouts: TimeoutPolicy, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeouts,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(&self, route: &RouteEntry, args: &CommandArgs) -> Result<RelayOutcome, GatewayError> {
        let url = format!("{}{}", self.base_url, route.path);
        let method = match route.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut request = self
            .client
            .request(method, &url)
            .timeout(self.timeouts.for_class(route.latency));

        request = if route.uses_query() {
            request.query(&query_pairs(args))
        } else {
            request.json(args)
        };

        debug!(command = route.command, method = route.method.as_str(), url = %url, "Relaying command to engine");

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(format!("failed to read engine response: {e}")))?;

        debug!(command = route.command, status, bytes = text.len(), "Engine replied");

        Ok(RelayOutcome {
            data: normalize_body(&text),
            status,
        })
    }
}

/// Query-string form of the arguments: strings verbatim, `null` as empty,
/// everything else as compact JSON.
fn query_pairs(args: &CommandArgs) -> Vec<(String, String)> {
    args.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

fn normalize_body(text: &str) -> Map<String, Value> {
    let mut data = Map::new();
    if text.is_empty() {
        data.insert("status".to_string(), Value::String("ok".to_string()));
        return data;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => object,
        _ => {
            data.insert("raw".to_string(), Value::String(text.to_string()));
            data
        }
    }
}

#[async_trait]
impl CommandRelay for EngineClient {
    async fn dispatch(&self, command: &str, args: &CommandArgs) -> Result<RelayOutcome, GatewayError> {
        let route = route::lookup(command)
            .ok_or_else(|| GatewayError::CommandNotAllowed(command.trim().to_string()))?;
        self.call(route, args).await
    }

    async fn login_status(&self) -> Result<LoginStatus, GatewayError> {
        let data = self
            .dispatch(route::CHECK_LOGIN_STATUS, &CommandArgs::new())
            .await?
            .into_result()?;

        let payload = data.get("data");
        let logged_in = payload
            .and_then(|d| d.get("is_logged_in"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let username = payload
            .and_then(|d| d.get("username"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(LoginStatus { logged_in, username })
    }

    async fn trigger_login(&self) -> Result<Map<String, Value>, GatewayError> {
        let outcome = self
            .dispatch(route::GET_LOGIN_QRCODE, &CommandArgs::new())
            .await?;
        if (200..300).contains(&outcome.status) {
            Ok(outcome.data)
        } else {
            Err(GatewayError::UpstreamError {
                status: outcome.status,
                body: Value::Object(outcome.data),
            })
        }
    }
}
