// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Owner of the single autonomy session slot.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::info;

use crate::domain::session::{AutonomySession, SessionId, SessionSnapshot};

#[derive(Default)]
pub struct SessionController {
    slot: Mutex<Option<AutonomySession>>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any existing one whatever its state.
    pub fn begin(
        &self,
        mission: impl Into<String>,
        persona: impl Into<String>,
        soft_budget: Option<Duration>,
    ) -> SessionId {
        self.begin_at(mission, persona, soft_budget, Utc::now())
    }

    pub fn begin_at(
        &self,
        mission: impl Into<String>,
        persona: impl Into<String>,
        soft_budget: Option<Duration>,
        now: DateTime<Utc>,
    ) -> SessionId {
        let session = AutonomySession::new(mission, persona, soft_budget, now);
        let id = session.id;
        let replaced = self.slot.lock().replace(session);

        info!(
            session_id = %id,
            replaced = ?replaced.map(|s| s.id.to_string()),
            "Autonomy session started"
        );
        id
    }

    pub fn status(&self) -> Option<SessionSnapshot> {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        self.slot.lock().as_ref().map(|session| session.snapshot(now))
    }

    /// Flag the live session for a graceful stop. Returns `false` when there is
    /// no session to stop.
    pub fn request_stop(&self, reason: impl Into<String>) -> bool {
        let mut slot = self.slot.lock();
        match slot.as_mut() {
            Some(session) => {
                let reason = reason.into();
                info!(session_id = %session.id, reason = %reason, "Graceful stop requested");
                session.request_stop(reason);
                true
            }
            None => false,
        }
    }
}
