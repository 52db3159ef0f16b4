// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! In-memory [`CommandRelay`] for application-layer tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::command::CommandArgs;
use crate::domain::errors::GatewayError;
use crate::domain::relay::{CommandRelay, LoginStatus, RelayOutcome};
use crate::domain::route;

pub struct StubRelay {
    logged_in: AtomicBool,
    /// Report logged in once this many probes have been answered.
    login_after_probes: Option<usize>,
    unreachable: bool,
    reply: Mutex<RelayOutcome>,
    dispatched: Mutex<Vec<(String, CommandArgs)>>,
    probes: AtomicUsize,
    triggers: AtomicUsize,
}

impl StubRelay {
    fn build(logged_in: bool, login_after_probes: Option<usize>, unreachable: bool) -> Self {
        let mut data = Map::new();
        data.insert("success".into(), json!(true));
        Self {
            logged_in: AtomicBool::new(logged_in),
            login_after_probes,
            unreachable,
            reply: Mutex::new(RelayOutcome { data, status: 200 }),
            dispatched: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
            triggers: AtomicUsize::new(0),
        }
    }

    pub fn logged_in() -> Self {
        Self::build(true, None, false)
    }

    pub fn logged_out() -> Self {
        Self::build(false, None, false)
    }

    pub fn logs_in_after(probes: usize) -> Self {
        Self::build(false, Some(probes), false)
    }

    pub fn unreachable() -> Self {
        Self::build(false, None, true)
    }

    pub fn with_reply(self, status: u16, body: Value) -> Self {
        let data = match body {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("raw".into(), other);
                map
            }
        };
        *self.reply.lock() = RelayOutcome { data, status };
        self
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn last_args(&self) -> Option<CommandArgs> {
        self.dispatched.lock().last().map(|(_, a)| a.clone())
    }

    pub fn login_probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn login_triggers(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRelay for StubRelay {
    async fn dispatch(&self, command: &str, args: &CommandArgs) -> Result<RelayOutcome, GatewayError> {
        if self.unreachable {
            return Err(GatewayError::UpstreamUnreachable("connection refused".into()));
        }
        let route = route::lookup(command)
            .ok_or_else(|| GatewayError::CommandNotAllowed(command.trim().to_string()))?;
        self.dispatched
            .lock()
            .push((route.command.to_string(), args.clone()));
        Ok(self.reply.lock().clone())
    }

    async fn login_status(&self) -> Result<LoginStatus, GatewayError> {
        if self.unreachable {
            return Err(GatewayError::UpstreamUnreachable("connection refused".into()));
        }
        let answered = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.login_after_probes.is_some_and(|n| answered >= n) {
            self.logged_in.store(true, Ordering::SeqCst);
        }
        let logged_in = self.logged_in.load(Ordering::SeqCst);
        Ok(LoginStatus {
            logged_in,
            username: logged_in.then(|| "mochi".to_string()),
        })
    }

    async fn trigger_login(&self) -> Result<Map<String, Value>, GatewayError> {
        if self.unreachable {
            return Err(GatewayError::UpstreamUnreachable("connection refused".into()));
        }
        self.triggers.fetch_add(1, Ordering::SeqCst);
        Ok(Map::new())
    }
}
