// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Autonomy Session Aggregate
//!
//! One unattended "keep acting" run of the pet between owner interactions.
//!
//! ## Lifecycle
//!
//! ```text
//! NoSession ──begin──▶ Active ──request_stop──▶ StopRequested
//!     ▲                  │                           │
//!     └──────────────────┴────────── begin ──────────┘  (replaces the slot)
//! ```
//!
//! ## Invariants
//!
//! - The soft deadline is advisory. Nothing in this crate terminates work
//!   when it passes; the calling agent reads `seconds_left` and paces itself.
//! - `request_stop` only flips a flag. The agent finishes its current unit of
//!   work and then declines to start new autonomous actions.
//! - Ownership of the live session belongs to
//!   [`crate::application::session_controller::SessionController`]; callers
//!   only ever see [`SessionSnapshot`] copies.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pet-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    StopRequested,
}

#[derive(Debug, Clone)]
pub struct AutonomySession {
    pub id: SessionId,
    pub mission: String,
    pub persona: String,
    pub started_at: DateTime<Utc>,
    pub soft_deadline_at: Option<DateTime<Utc>>,
    pub stop_requested: bool,
    pub stop_reason: String,
}

impl AutonomySession {
    /// Start a session at `now`. A present `soft_budget` becomes an absolute
    /// advisory deadline, unless it lands past the representable date range.
    pub fn new(
        mission: impl Into<String>,
        persona: impl Into<String>,
        soft_budget: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            mission: mission.into(),
            persona: persona.into(),
            started_at: now,
            soft_deadline_at: soft_budget.and_then(|budget| now.checked_add_signed(budget)),
            stop_requested: false,
            stop_reason: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.stop_requested {
            SessionState::StopRequested
        } else {
            SessionState::Active
        }
    }

    /// Ask the agent to wind down gracefully. Repeated calls overwrite the reason.
    pub fn request_stop(&mut self, reason: impl Into<String>) {
        self.stop_requested = true;
        self.stop_reason = reason.into();
    }

    /// Seconds until the soft deadline; negative once over budget.
    pub fn seconds_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.soft_deadline_at
            .map(|deadline| (deadline - now).num_seconds())
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.to_string(),
            mission: self.mission.clone(),
            persona: self.persona.clone(),
            started_at: self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            state: self.state(),
            stop_requested: self.stop_requested,
            stop_reason: self.stop_reason.clone(),
            soft_deadline_at: self
                .soft_deadline_at
                .map(|deadline| deadline.to_rfc3339_opts(SecondsFormat::Secs, true)),
            seconds_left: self.seconds_left(now),
        }
    }
}

/// Read-only view of the live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub mission: String,
    pub persona: String,
    pub started_at: String,
    pub state: SessionState,
    pub stop_requested: bool,
    pub stop_reason: String,
    /// `null` when the session has no soft budget.
    pub soft_deadline_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_left: Option<i64>,
}
