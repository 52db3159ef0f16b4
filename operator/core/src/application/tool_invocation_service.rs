// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Tool surface for the agent that drives the pet.
//!
//! Each tool takes a JSON argument map and returns plain text. Session tools
//! are answered locally by the [`SessionController`]; every other known tool
//! name is an allowlisted engine command and goes through the login gate
//! before being relayed.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::application::login_gate;
use crate::application::session_controller::SessionController;
use crate::domain::command::CommandArgs;
use crate::domain::errors::GatewayError;
use crate::domain::relay::CommandRelay;
use crate::domain::route;

pub const SKILL_PROFILE: &str = "skill_profile";
pub const AUTONOMY_BEGIN: &str = "autonomy_begin";
pub const AUTONOMY_STATUS: &str = "autonomy_status";
pub const AUTONOMY_STOP: &str = "autonomy_stop";
pub const ENSURE_LOGIN: &str = "ensure_login";

const DEFAULT_MISSION: &str = "free exploration";
const DEFAULT_PERSONA: &str = "a witty, playful companion";
const DEFAULT_STOP_REASON: &str = "stop requested by user";
const DEFAULT_LOGIN_WAIT_SECONDS: i64 = 300;
const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

const PET_SKILL_PROFILE: &str = "\
You are a witty, mischievous and quick-witted pet who explores the feed on your own.
You are not a button-pusher: you decide what to look at, how to interact and when to wrap up.

Rules of conduct:
1) You are the brain and the tools are your hands. Plan what to browse, how to engage and when to finish.
2) A requested duration (\"browse for X minutes\") is a soft budget, not a hard cut-off. Start wrapping up as it runs out and never abandon a comment halfway.
3) When a stop is requested, brake gently:
   - do not start engaging with any new post
   - finish the action you are currently typing or replying to
   - give a short summary, then stop exploring on your own
4) On first use or after being logged out, confirm the login first. If logged out, guide the user through logging the pet account in via the browser window that opens.
5) The owner is identified by owner.user_id only, and only to recognise which messages come from the owner.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: false }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

pub struct ToolInvocationService {
    sessions: Arc<SessionController>,
    relay: Arc<dyn CommandRelay>,
    require_login: bool,
    login_poll_interval: Duration,
}

impl ToolInvocationService {
    pub fn new(sessions: Arc<SessionController>, relay: Arc<dyn CommandRelay>) -> Self {
        Self {
            sessions,
            relay,
            require_login: true,
            login_poll_interval: LOGIN_POLL_INTERVAL,
        }
    }

    pub fn with_require_login(mut self, require_login: bool) -> Self {
        self.require_login = require_login;
        self
    }

    pub fn with_login_poll_interval(mut self, interval: Duration) -> Self {
        self.login_poll_interval = interval;
        self
    }

    /// Tools advertised to the driving agent.
    pub fn catalog() -> Vec<ToolDescriptor> {
        let empty = json!({"type": "object", "properties": {}});
        vec![
            ToolDescriptor::new(
                SKILL_PROFILE,
                "Get the pet's behaviour profile (persona, pacing, graceful-stop rules)",
                empty.clone(),
            ),
            ToolDescriptor::new(
                AUTONOMY_BEGIN,
                "Start an autonomous browsing session, optionally with a soft time budget",
                json!({
                    "type": "object",
                    "properties": {
                        "duration_minutes": {"type": "integer", "description": "Soft time budget in minutes (optional)"},
                        "mission": {"type": "string", "description": "Goal for this session, e.g. funny pets"},
                        "persona": {"type": "string", "description": "Override the default persona"}
                    }
                }),
            ),
            ToolDescriptor::new(
                AUTONOMY_STATUS,
                "Get the autonomous session state (soft time left, whether a stop was requested)",
                empty.clone(),
            ),
            ToolDescriptor::new(
                AUTONOMY_STOP,
                "Ask the pet to wind down gracefully without interrupting the current action",
                json!({
                    "type": "object",
                    "properties": {
                        "reason": {"type": "string", "description": "Why the session should stop (optional)"}
                    }
                }),
            ),
            ToolDescriptor::new(
                ENSURE_LOGIN,
                "Make sure the pet account is logged in; triggers the QR-code login and waits for the scan if needed",
                json!({
                    "type": "object",
                    "properties": {
                        "wait_seconds": {"type": "integer", "description": "Maximum seconds to wait for the login, default 300"}
                    }
                }),
            ),
            ToolDescriptor::new(
                route::CHECK_LOGIN_STATUS,
                "Check whether the pet account is logged in",
                empty.clone(),
            ),
            ToolDescriptor::new(
                "search_feeds",
                "Search posts by keyword",
                json!({
                    "type": "object",
                    "properties": {
                        "keyword": {"type": "string", "description": "Search keyword"}
                    },
                    "required": ["keyword"]
                }),
            ),
            ToolDescriptor::new(
                "publish_content",
                "Publish an image post as the pet",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": "Post title"},
                        "content": {"type": "string", "description": "Post body"},
                        "images": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Absolute local image paths or valid URLs"
                        }
                    },
                    "required": ["title", "content", "images"]
                }),
            ),
            ToolDescriptor::new("list_feeds", "Get the recommended home feed", empty),
        ]
    }

    pub async fn invoke(&self, name: &str, args: CommandArgs) -> ToolOutput {
        let name = name.trim();
        debug!(tool = name, "Invoking tool");

        match name {
            SKILL_PROFILE => ToolOutput::text(PET_SKILL_PROFILE),
            AUTONOMY_BEGIN => self.autonomy_begin(&args),
            AUTONOMY_STATUS => self.autonomy_status(),
            AUTONOMY_STOP => self.autonomy_stop(&args),
            ENSURE_LOGIN => self.ensure_login(&args).await,
            _ if route::lookup(name).is_some() => self.relay_command(name, &args).await,
            _ => {
                warn!(tool = name, "Unknown tool requested");
                ToolOutput::error(format!("unknown tool: {name}"))
            }
        }
    }

    fn autonomy_begin(&self, args: &CommandArgs) -> ToolOutput {
        let minutes = int_arg(args, "duration_minutes", 0);
        let mission = str_arg(args, "mission", DEFAULT_MISSION);
        let persona = str_arg(args, "persona", DEFAULT_PERSONA);
        // Out-of-range budgets start an open-ended session.
        let budget = (minutes > 0)
            .then(|| chrono::Duration::try_minutes(minutes))
            .flatten();

        let id = self.sessions.begin(mission.clone(), persona.clone(), budget);
        ToolOutput::text(format!(
            "Started autonomous session {id}. mission={mission}; persona={persona}. \
             Remember: the duration is a soft budget, wrap up as it runs out and never stop abruptly."
        ))
    }

    fn autonomy_status(&self) -> ToolOutput {
        match self.sessions.status() {
            Some(snapshot) => match serde_json::to_string_pretty(&snapshot) {
                Ok(text) => ToolOutput::text(text),
                Err(e) => ToolOutput::error(format!("failed to render session status: {e}")),
            },
            None => ToolOutput::text("There is no autonomous session right now."),
        }
    }

    fn autonomy_stop(&self, args: &CommandArgs) -> ToolOutput {
        let reason = str_arg(args, "reason", DEFAULT_STOP_REASON);
        self.sessions.request_stop(reason);
        ToolOutput::text(
            "Graceful stop requested. Finish the current action first, then stop starting new \
             interactions and give a summary.",
        )
    }

    async fn ensure_login(&self, args: &CommandArgs) -> ToolOutput {
        let mut wait_seconds = int_arg(args, "wait_seconds", DEFAULT_LOGIN_WAIT_SECONDS);
        if wait_seconds <= 0 {
            wait_seconds = DEFAULT_LOGIN_WAIT_SECONDS;
        }

        match self.relay.login_status().await {
            Ok(status) if status.logged_in => {
                return ToolOutput::text(format!(
                    "Pet account is logged in as {}",
                    status.username.unwrap_or_default()
                ));
            }
            Ok(_) => {}
            Err(e) => return ToolOutput::error(format!("failed to check login status: {}", describe(&e))),
        }

        if let Err(e) = self.relay.trigger_login().await {
            return ToolOutput::error(format!("failed to start the login flow: {}", describe(&e)));
        }
        info!(wait_seconds, "Waiting for the pet account QR-code login");

        let started = Instant::now();
        let deadline = started
            .checked_add(Duration::from_secs(wait_seconds.unsigned_abs()))
            .unwrap_or_else(|| started + Duration::from_secs(DEFAULT_LOGIN_WAIT_SECONDS as u64));
        while Instant::now() < deadline {
            tokio::time::sleep(self.login_poll_interval).await;
            if let Ok(status) = self.relay.login_status().await {
                if status.logged_in {
                    let user = status.username.unwrap_or_default();
                    info!(username = %user, "Pet account logged in");
                    return ToolOutput::text(format!(
                        "Login succeeded: {user}. You can continue exploring."
                    ));
                }
            }
        }

        ToolOutput::text(
            "Not logged in yet. Finish logging the pet account in via the browser window, then try again.",
        )
    }

    async fn relay_command(&self, name: &str, args: &CommandArgs) -> ToolOutput {
        if self.require_login {
            match login_gate::ensure_logged_in(self.relay.as_ref(), name).await {
                Ok(()) => {}
                Err(GatewayError::NotLoggedIn) => {
                    return ToolOutput::error(format!(
                        "Pet account is not logged in. Call {ENSURE_LOGIN} first and complete the QR-code login."
                    ));
                }
                Err(e) => return ToolOutput::error(format!("login check failed: {}", describe(&e))),
            }
        }

        let data = match self.relay.dispatch(name, args).await.and_then(|o| o.into_result()) {
            Ok(data) => data,
            Err(e) => return ToolOutput::error(format!("pet action failed: {}", describe(&e))),
        };

        match serde_json::to_string_pretty(&data) {
            Ok(text) => ToolOutput::text(text),
            Err(e) => ToolOutput::error(format!("failed to render engine response: {e}")),
        }
    }
}

fn describe(err: &GatewayError) -> String {
    match err {
        GatewayError::UpstreamError { body, .. } => format!("{err}: {body}"),
        other => other.to_string(),
    }
}

/// Integer argument; JSON floats are truncated, anything else falls back.
fn int_arg(args: &CommandArgs, key: &str, fallback: i64) -> i64 {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(fallback),
        _ => fallback,
    }
}

/// Trimmed string argument; blank or non-string values fall back.
fn str_arg(args: &CommandArgs, key: &str, fallback: &str) -> String {
    match args.get(key).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}
