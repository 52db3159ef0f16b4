// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Gateway error taxonomy.
//!
//! Every failure a command can end in, with a stable machine-readable code.
//! Transport status codes are assigned only at the HTTP boundary
//! ([`crate::presentation::api`]); nothing in here knows about HTTP status
//! semantics except [`GatewayError::UpstreamError`], which carries the engine's
//! status verbatim.

use serde_json::Value;
use thiserror::Error;

/// Why a signature failed to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The provided value is empty or not a 64-character hex digest.
    #[error("signature is not a hex-encoded HMAC-SHA-256 digest")]
    Malformed,

    /// Well-formed, but does not match the expected digest.
    #[error("bad signature")]
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("owner change commands are disabled")]
    ForbiddenCommand,

    #[error("only the bound owner_user_id can control this pet")]
    NotOwner,

    #[error("timestamp out of allowed window")]
    Expired,

    #[error("{0}")]
    SignatureInvalid(SignatureError),

    #[error("replay detected")]
    Replay,

    #[error("command not allowed: {0}")]
    CommandNotAllowed(String),

    #[error("engine unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("engine returned HTTP {status}")]
    UpstreamError { status: u16, body: Value },

    #[error("pet account is not logged in; run ensure_login and complete the QR-code login first")]
    NotLoggedIn,
}

impl GatewayError {
    /// Stable code reported in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "bad_request",
            Self::ForbiddenCommand => "forbidden_command",
            Self::NotOwner => "not_owner",
            Self::Expired => "expired",
            Self::SignatureInvalid(_) => "signature_invalid",
            Self::Replay => "replay",
            Self::CommandNotAllowed(_) => "command_not_allowed",
            Self::UpstreamUnreachable(_) => "upstream_unreachable",
            Self::UpstreamError { .. } => "upstream_error",
            Self::NotLoggedIn => "not_logged_in",
        }
    }

    /// True for failures resolved by the gateway's own policy checks, before
    /// any dispatch was attempted.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::ForbiddenCommand
                | Self::NotOwner
                | Self::Expired
                | Self::SignatureInvalid(_)
                | Self::Replay
        )
    }
}

impl From<SignatureError> for GatewayError {
    fn from(err: SignatureError) -> Self {
        Self::SignatureInvalid(err)
    }
}
