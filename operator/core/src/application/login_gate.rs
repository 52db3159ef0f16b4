// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Login-first rule: nothing but the login probes runs while the pet account
//! is logged out.

use tracing::debug;

use crate::domain::errors::GatewayError;
use crate::domain::relay::CommandRelay;
use crate::domain::route;

/// Fail with [`GatewayError::NotLoggedIn`] unless `command` is a login probe
/// or the engine reports an active login.
pub async fn ensure_logged_in(relay: &dyn CommandRelay, command: &str) -> Result<(), GatewayError> {
    if route::is_login_exempt(command) {
        return Ok(());
    }

    let status = relay.login_status().await?;
    if !status.logged_in {
        return Err(GatewayError::NotLoggedIn);
    }

    debug!(command = command.trim(), username = ?status.username, "Login gate passed");
    Ok(())
}
