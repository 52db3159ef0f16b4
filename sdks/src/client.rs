// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use uuid::Uuid;

use pet_operator_core::domain::command::{CommandArgs, CommandRequest, CommandResponse};
use pet_operator_core::infrastructure::security::signature;

/// Owner identity and the secret shared with the gateway.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub actor_user_id: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(actor_user_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            actor_user_id: actor_user_id.into(),
            secret: secret.into(),
        }
    }
}

/// Client for a pet operator gateway.
pub struct OperatorClient {
    base_url: String,
    client: Client,
    credentials: Credentials,
    nickname: Option<String>,
}

impl OperatorClient {
    /// Create a new client for the gateway at `base_url`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client: Client::new(),
            credentials,
            nickname: None,
        }
    }

    /// Display name sent along with each command. Never used for identity.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Build a signed request stamped with the current time and a fresh nonce.
    pub fn sign(&self, command: &str, args: CommandArgs) -> CommandRequest {
        self.sign_with(command, args, Utc::now().timestamp(), &Uuid::new_v4().to_string())
    }

    pub fn sign_with(&self, command: &str, args: CommandArgs, timestamp: i64, nonce: &str) -> CommandRequest {
        let canonical = signature::canonicalize(
            &self.credentials.actor_user_id,
            command,
            &args,
            timestamp,
            nonce,
        );
        CommandRequest {
            actor_user_id: self.credentials.actor_user_id.clone(),
            actor_nickname: self.nickname.clone(),
            command: command.to_string(),
            args,
            timestamp,
            nonce: nonce.to_string(),
            signature: signature::sign(&self.credentials.secret, &canonical),
        }
    }

    /// Sign and send a command. The gateway's envelope is returned whatever
    /// the HTTP status; only transport and decoding failures are errors.
    pub async fn send(&self, command: &str, args: CommandArgs) -> Result<CommandResponse> {
        let request = self.sign(command, args);
        self.send_request(&request).await
    }

    pub async fn send_request(&self, request: &CommandRequest) -> Result<CommandResponse> {
        let url = format!("{}/v1/command", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach gateway at {}", url))?;

        let status = response.status();
        response
            .json::<CommandResponse>()
            .await
            .with_context(|| format!("Gateway returned HTTP {} with an unreadable body", status))
    }

    /// Query the gateway's health endpoint.
    pub async fn health(&self) -> Result<CommandResponse> {
        let url = format!("{}/healthz", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach gateway at {}", url))?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str) -> OperatorClient {
        OperatorClient::new(url, Credentials::new("u123", "secret"))
    }

    #[test]
    fn test_sign_produces_verifiable_request() {
        let mut args = CommandArgs::new();
        args.insert("keyword".into(), json!("cats"));

        let request = client("http://localhost").with_nickname("Boss").sign("search_feeds", args);
        assert_eq!(request.actor_nickname.as_deref(), Some("Boss"));
        assert!(Uuid::parse_str(&request.nonce).is_ok());
        assert!(signature::verify(
            "secret",
            &request.actor_user_id,
            &request.command,
            &request.args,
            request.timestamp,
            &request.nonce,
            &request.signature,
        )
        .is_ok());
    }

    #[test]
    fn test_fresh_nonce_per_request() {
        let c = client("http://localhost");
        let a = c.sign("list_feeds", CommandArgs::new());
        let b = c.sign("list_feeds", CommandArgs::new());
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }

    #[tokio::test]
    async fn test_send_returns_rejection_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/command")
            .match_body(Matcher::PartialJson(json!({"actor_user_id": "u123", "command": "list_feeds"})))
            .with_status(401)
            .with_body(r#"{"ok":false,"code":"replay","message":"replay detected"}"#)
            .create_async()
            .await;

        let response = client(&format!("{}/", server.url()))
            .send("list_feeds", CommandArgs::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some("replay"));
    }

    #[tokio::test]
    async fn test_send_unreadable_body_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/command")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = client(&server.url())
            .send("list_feeds", CommandArgs::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(200)
            .with_body(r#"{"ok":true,"message":"ok","data":{"owner_user_id":"u123"}}"#)
            .create_async()
            .await;

        let health = client(&server.url()).health().await.unwrap();
        assert!(health.ok);
        assert_eq!(health.data.unwrap()["owner_user_id"], "u123");
    }
}
