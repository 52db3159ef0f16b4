// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod gateway;
pub mod login_gate;
pub mod session_controller;
pub mod tool_invocation_service;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export use cases for convenience
pub use gateway::AuthorizedGateway;
pub use session_controller::SessionController;
pub use tool_invocation_service::{ToolDescriptor, ToolInvocationService, ToolOutput};
