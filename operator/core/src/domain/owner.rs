// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Owner Policy
//!
//! The single principal allowed to issue commands, bound once at start-up.
//!
//! There is deliberately no re-binding operation: the commands that would
//! change ownership are on a fixed deny-list that is checked before identity
//! and signature, so ownership can only change by redeploying configuration.

/// Commands that can never be executed through the command channel.
const FORBIDDEN_COMMANDS: [&str; 4] = [
    "change_owner",
    "transfer_owner",
    "reset_owner",
    "bind_owner",
];

/// Immutable owner identity plus the forbidden-command deny-list.
#[derive(Debug, Clone)]
pub struct OwnerGuard {
    owner_user_id: String,
}

impl OwnerGuard {
    pub fn new(owner_user_id: impl AsRef<str>) -> Self {
        Self {
            owner_user_id: owner_user_id.as_ref().trim().to_string(),
        }
    }

    pub fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }

    /// Exact match after whitespace trimming. No case folding.
    pub fn is_owner(&self, actor_user_id: &str) -> bool {
        actor_user_id.trim() == self.owner_user_id
    }

    pub fn is_forbidden(&self, command: &str) -> bool {
        let normalized = command.trim().to_lowercase();
        FORBIDDEN_COMMANDS.contains(&normalized.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_identity() {
        let guard = OwnerGuard::new("abc123");
        assert!(guard.is_owner("abc123"));
        assert!(guard.is_owner("  abc123\n"));
        assert!(!guard.is_owner("new-name-but-same-nickname"));
        assert!(!guard.is_owner("ABC123"));
        assert!(!guard.is_owner(""));
    }

    #[test]
    fn test_configured_identity_is_trimmed() {
        let guard = OwnerGuard::new(" abc123 ");
        assert_eq!(guard.owner_user_id(), "abc123");
        assert!(guard.is_owner("abc123"));
    }

    #[test]
    fn test_forbidden_commands() {
        let guard = OwnerGuard::new("abc123");
        assert!(guard.is_forbidden("change_owner"));
        assert!(guard.is_forbidden("Change_Owner"));
        assert!(guard.is_forbidden(" TRANSFER_OWNER "));
        assert!(guard.is_forbidden("reset_owner"));
        assert!(guard.is_forbidden("bind_owner"));
        assert!(!guard.is_forbidden("publish_content"));
        assert!(!guard.is_forbidden("owner"));
    }
}
