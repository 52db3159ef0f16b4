// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Authorized Command Gateway
//!
//! Single choke-point through which every owner command passes before it may
//! reach the engine.
//!
//! ## Processing Pipeline
//!
//! ```text
//! CommandRequest
//!   └─ AuthorizedGateway::authorize(&request, now)
//!         ├─ forbidden command      → ForbiddenCommand
//!         ├─ owner identity         → NotOwner
//!         ├─ timestamp freshness    → Expired
//!         ├─ HMAC signature         → SignatureInvalid
//!         └─ nonce replay           → Replay
//!   └─ route lookup                 → CommandNotAllowed (no network)
//!   └─ login gate                   → NotLoggedIn
//!   └─ CommandRelay::dispatch       → UpstreamUnreachable / UpstreamError
//! ```
//!
//! Checks run in exactly this order and stop at the first failure. The
//! nonce is only consumed once everything before it has passed, so a rejected
//! request never burns the owner's nonce.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::login_gate;
use crate::domain::command::CommandRequest;
use crate::domain::errors::GatewayError;
use crate::domain::operator_config::OperatorConfig;
use crate::domain::owner::OwnerGuard;
use crate::domain::relay::CommandRelay;
use crate::domain::route;
use crate::infrastructure::security::{signature, NonceCache};

pub const COMMANDS_TOTAL: &str = "pet_operator_commands_total";
pub const COMMANDS_REJECTED_TOTAL: &str = "pet_operator_commands_rejected_total";

pub struct AuthorizedGateway {
    guard: OwnerGuard,
    secret: String,
    nonces: NonceCache,
    freshness_window: Duration,
    require_login: bool,
    relay: Arc<dyn CommandRelay>,
}

impl AuthorizedGateway {
    /// Gateway with the default 300 s freshness window, 600 s nonce TTL and
    /// the login gate enabled.
    pub fn new(guard: OwnerGuard, secret: impl Into<String>, relay: Arc<dyn CommandRelay>) -> Self {
        Self {
            guard,
            secret: secret.into(),
            nonces: NonceCache::default(),
            freshness_window: Duration::seconds(300),
            require_login: true,
            relay,
        }
    }

    pub fn from_config(config: &OperatorConfig, relay: Arc<dyn CommandRelay>) -> anyhow::Result<Self> {
        let secret = config.resolved_secret()?;
        let security = &config.spec.security;
        let window = seconds("freshness_window_seconds", security.freshness_window_seconds)?;
        let ttl = seconds("nonce_ttl_seconds", security.nonce_ttl_seconds)?;
        Ok(Self::new(OwnerGuard::new(&config.spec.owner.user_id), secret, relay)
            .with_freshness_window(window)
            .with_nonce_ttl(ttl)
            .with_require_login(config.spec.engine.require_login))
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_nonce_ttl(mut self, ttl: Duration) -> Self {
        self.nonces = NonceCache::new(ttl);
        self
    }

    pub fn with_require_login(mut self, require_login: bool) -> Self {
        self.require_login = require_login;
        self
    }

    pub fn owner_user_id(&self) -> &str {
        self.guard.owner_user_id()
    }

    /// Policy checks only: forbidden command, owner, freshness, signature and
    /// replay, in that order. Consumes the nonce on success.
    pub fn authorize(&self, request: &CommandRequest, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.guard.is_forbidden(&request.command) {
            return Err(GatewayError::ForbiddenCommand);
        }

        if !self.guard.is_owner(&request.actor_user_id) {
            return Err(GatewayError::NotOwner);
        }

        let window = self.freshness_window.num_seconds();
        let now_ts = now.timestamp();
        if request.timestamp < now_ts - window || request.timestamp > now_ts + window {
            return Err(GatewayError::Expired);
        }

        signature::verify(
            &self.secret,
            &request.actor_user_id,
            &request.command,
            &request.args,
            request.timestamp,
            &request.nonce,
            &request.signature,
        )?;

        self.nonces
            .check_and_consume(&request.nonce_key(), now)
            .map_err(|_| GatewayError::Replay)?;

        Ok(())
    }

    /// Run the full pipeline against the wall clock.
    pub async fn handle(&self, request: CommandRequest) -> Result<Value, GatewayError> {
        self.handle_at(request, Utc::now()).await
    }

    pub async fn handle_at(&self, request: CommandRequest, now: DateTime<Utc>) -> Result<Value, GatewayError> {
        let result = self.run(&request, now).await;
        match &result {
            Ok(_) => {
                info!(command = request.command.trim(), "Command relayed");
                metrics::counter!(COMMANDS_TOTAL, "outcome" => "ok").increment(1);
            }
            Err(e) => {
                warn!(
                    code = e.code(),
                    command = request.command.trim(),
                    actor = request.actor_user_id.trim(),
                    "Command rejected: {}",
                    e
                );
                metrics::counter!(COMMANDS_TOTAL, "outcome" => "rejected").increment(1);
                metrics::counter!(COMMANDS_REJECTED_TOTAL, "code" => e.code()).increment(1);
            }
        }
        result
    }

    async fn run(&self, request: &CommandRequest, now: DateTime<Utc>) -> Result<Value, GatewayError> {
        self.authorize(request, now)?;

        if route::lookup(&request.command).is_none() {
            return Err(GatewayError::CommandNotAllowed(request.command.trim().to_string()));
        }

        if self.require_login {
            login_gate::ensure_logged_in(self.relay.as_ref(), &request.command).await?;
        }

        let outcome = self.relay.dispatch(&request.command, &request.args).await?;
        Ok(Value::Object(outcome.into_result()?))
    }
}

fn seconds(key: &str, value: u64) -> anyhow::Result<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow::anyhow!("spec.security.{key} is out of range: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::StubRelay;
    use crate::domain::command::CommandArgs;
    use crate::domain::errors::SignatureError;
    use chrono::TimeZone;
    use serde_json::json;

    const OWNER: &str = "u123";
    const SECRET: &str = "secret";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap()
    }

    fn signed(actor: &str, command: &str, args: CommandArgs, timestamp: i64, nonce: &str) -> CommandRequest {
        let canonical = signature::canonicalize(actor, command, &args, timestamp, nonce);
        CommandRequest {
            actor_user_id: actor.to_string(),
            actor_nickname: None,
            command: command.to_string(),
            args,
            timestamp,
            nonce: nonce.to_string(),
            signature: signature::sign(SECRET, &canonical),
        }
    }

    fn request(command: &str, nonce: &str) -> CommandRequest {
        signed(OWNER, command, CommandArgs::new(), now().timestamp(), nonce)
    }

    fn gateway(relay: Arc<StubRelay>) -> AuthorizedGateway {
        AuthorizedGateway::new(OwnerGuard::new(OWNER), SECRET, relay)
    }

    #[test]
    fn test_from_config_rejects_out_of_range_durations() {
        let mut config = OperatorConfig::default();
        config.spec.owner.user_id = OWNER.to_string();
        config.spec.owner.shared_secret = SECRET.to_string();
        assert!(AuthorizedGateway::from_config(&config, Arc::new(StubRelay::logged_in())).is_ok());

        config.spec.security.freshness_window_seconds = 10_000_000_000_000_000;
        config.spec.security.nonce_ttl_seconds = 10_000_000_000_000_000;
        let err = AuthorizedGateway::from_config(&config, Arc::new(StubRelay::logged_in()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("freshness_window_seconds"));

        config.spec.security.freshness_window_seconds = 300;
        config.spec.security.nonce_ttl_seconds = u64::MAX;
        assert!(AuthorizedGateway::from_config(&config, Arc::new(StubRelay::logged_in())).is_err());
    }

    #[test]
    fn test_authorize_valid_request() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));
        assert!(gw.authorize(&request("list_feeds", "n-1"), now()).is_ok());
    }

    #[test]
    fn test_forbidden_command_checked_before_signature() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));
        let mut req = request("CHANGE_OWNER", "n-1");
        req.signature = "0".repeat(64);
        req.actor_user_id = "intruder".to_string();
        assert_eq!(gw.authorize(&req, now()), Err(GatewayError::ForbiddenCommand));
    }

    #[test]
    fn test_non_owner_rejected_before_freshness() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));
        let req = signed("someone-else", "list_feeds", CommandArgs::new(), 0, "n-1");
        assert_eq!(gw.authorize(&req, now()), Err(GatewayError::NotOwner));
    }

    #[test]
    fn test_freshness_window_boundaries() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));
        let ts = now().timestamp();

        for (offset, nonce) in [(-299, "a"), (299, "b"), (-300, "c"), (300, "d")] {
            let req = signed(OWNER, "list_feeds", CommandArgs::new(), ts + offset, nonce);
            assert!(gw.authorize(&req, now()).is_ok(), "offset {offset}");
        }
        for (offset, nonce) in [(-301, "e"), (301, "f")] {
            let req = signed(OWNER, "list_feeds", CommandArgs::new(), ts + offset, nonce);
            assert_eq!(gw.authorize(&req, now()), Err(GatewayError::Expired), "offset {offset}");
        }
    }

    #[test]
    fn test_signature_failures() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));

        let mut tampered = request("list_feeds", "n-1");
        tampered.args.insert("page".into(), json!(2));
        assert_eq!(
            gw.authorize(&tampered, now()),
            Err(GatewayError::SignatureInvalid(SignatureError::Mismatch))
        );

        let mut garbage = request("list_feeds", "n-2");
        garbage.signature = "not-hex".into();
        assert_eq!(
            gw.authorize(&garbage, now()),
            Err(GatewayError::SignatureInvalid(SignatureError::Malformed))
        );
    }

    #[test]
    fn test_replay_rejected_and_failed_requests_do_not_burn_nonce() {
        let gw = gateway(Arc::new(StubRelay::logged_in()));

        let mut bad = request("list_feeds", "n-1");
        bad.signature = "0".repeat(64);
        assert!(gw.authorize(&bad, now()).is_err());

        let good = request("list_feeds", "n-1");
        assert!(gw.authorize(&good, now()).is_ok());
        assert_eq!(gw.authorize(&good, now()), Err(GatewayError::Replay));
    }

    #[tokio::test]
    async fn test_handle_dispatches_to_engine() {
        let relay = Arc::new(StubRelay::logged_in().with_reply(200, json!({"success": true, "data": {"feeds": []}})));
        let gw = gateway(relay.clone());

        let mut args = CommandArgs::new();
        args.insert("keyword".into(), json!("corgi"));
        let req = signed(OWNER, "search_feeds", args, now().timestamp(), "n-1");

        let data = gw.handle_at(req, now()).await.unwrap();
        assert_eq!(data["data"]["feeds"], json!([]));
        assert_eq!(relay.dispatched(), vec!["search_feeds"]);
        assert_eq!(relay.last_args().unwrap()["keyword"], json!("corgi"));
    }

    #[tokio::test]
    async fn test_unknown_command_not_dispatched() {
        let relay = Arc::new(StubRelay::logged_in());
        let gw = gateway(relay.clone());

        let result = gw.handle_at(request("delete_account", "n-1"), now()).await;
        assert_eq!(result, Err(GatewayError::CommandNotAllowed("delete_account".into())));
        assert!(relay.dispatched().is_empty());
        assert_eq!(relay.login_probes(), 0);
    }

    #[tokio::test]
    async fn test_login_gate() {
        let relay = Arc::new(StubRelay::logged_out());
        let gw = gateway(relay.clone());

        assert_eq!(
            gw.handle_at(request("list_feeds", "n-1"), now()).await,
            Err(GatewayError::NotLoggedIn)
        );
        assert!(relay.dispatched().is_empty());

        assert!(gw.handle_at(request("check_login_status", "n-2"), now()).await.is_ok());
        assert_eq!(relay.dispatched(), vec!["check_login_status"]);
    }

    #[tokio::test]
    async fn test_login_gate_can_be_disabled() {
        let relay = Arc::new(StubRelay::logged_out());
        let gw = gateway(relay.clone()).with_require_login(false);

        assert!(gw.handle_at(request("list_feeds", "n-1"), now()).await.is_ok());
        assert_eq!(relay.login_probes(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_status_surfaces() {
        let relay = Arc::new(StubRelay::logged_in().with_reply(404, json!({"error": "feed gone"})));
        let gw = gateway(relay);

        match gw.handle_at(request("feed_detail", "n-1"), now()).await {
            Err(GatewayError::UpstreamError { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, json!({"error": "feed gone"}));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_engine() {
        let gw = gateway(Arc::new(StubRelay::unreachable())).with_require_login(false);
        assert!(matches!(
            gw.handle_at(request("my_profile", "n-1"), now()).await,
            Err(GatewayError::UpstreamUnreachable(_))
        ));
    }
}
