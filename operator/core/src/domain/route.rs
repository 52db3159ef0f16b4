// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Command Allowlist
//!
//! Static table mapping each relayable command to the engine endpoint that
//! serves it. A command missing from [`ROUTES`] is never sent upstream.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Where a route puts its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgPlacement {
    /// Each argument becomes a string-valued query parameter.
    Query,
    /// The whole argument map is sent as a JSON body.
    Body,
}

/// Expected latency of a route, used to pick its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyClass {
    /// Cheap status checks.
    Probe,
    Standard,
    /// Uploads media and waits for the engine to finish posting.
    Publish,
}

/// Per-class request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub probe: Duration,
    pub standard: Duration,
    pub publish: Duration,
}

impl TimeoutPolicy {
    pub fn for_class(&self, class: LatencyClass) -> Duration {
        match class {
            LatencyClass::Probe => self.probe,
            LatencyClass::Standard => self.standard,
            LatencyClass::Publish => self.publish,
        }
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(10),
            standard: Duration::from_secs(20),
            publish: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub command: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub placement: ArgPlacement,
    pub latency: LatencyClass,
}

impl RouteEntry {
    const fn new(
        command: &'static str,
        method: HttpMethod,
        path: &'static str,
        placement: ArgPlacement,
        latency: LatencyClass,
    ) -> Self {
        Self { command, method, path, placement, latency }
    }

    /// GET routes carrying their arguments in the query string.
    pub fn uses_query(&self) -> bool {
        self.method == HttpMethod::Get && self.placement == ArgPlacement::Query
    }
}

pub const CHECK_LOGIN_STATUS: &str = "check_login_status";
pub const GET_LOGIN_QRCODE: &str = "get_login_qrcode";

pub static ROUTES: [RouteEntry; 11] = [
    RouteEntry::new(CHECK_LOGIN_STATUS, HttpMethod::Get, "/api/v1/login/status", ArgPlacement::Query, LatencyClass::Probe),
    RouteEntry::new(GET_LOGIN_QRCODE, HttpMethod::Get, "/api/v1/login/qrcode", ArgPlacement::Query, LatencyClass::Probe),
    RouteEntry::new("my_profile", HttpMethod::Get, "/api/v1/user/me", ArgPlacement::Query, LatencyClass::Standard),
    RouteEntry::new("list_feeds", HttpMethod::Get, "/api/v1/feeds/list", ArgPlacement::Query, LatencyClass::Standard),
    RouteEntry::new("search_feeds", HttpMethod::Post, "/api/v1/feeds/search", ArgPlacement::Body, LatencyClass::Standard),
    RouteEntry::new("feed_detail", HttpMethod::Post, "/api/v1/feeds/detail", ArgPlacement::Body, LatencyClass::Standard),
    RouteEntry::new("user_profile", HttpMethod::Post, "/api/v1/user/profile", ArgPlacement::Body, LatencyClass::Standard),
    RouteEntry::new("publish_content", HttpMethod::Post, "/api/v1/publish", ArgPlacement::Body, LatencyClass::Publish),
    RouteEntry::new("publish_video", HttpMethod::Post, "/api/v1/publish_video", ArgPlacement::Body, LatencyClass::Publish),
    RouteEntry::new("post_comment", HttpMethod::Post, "/api/v1/feeds/comment", ArgPlacement::Body, LatencyClass::Standard),
    RouteEntry::new("reply_comment", HttpMethod::Post, "/api/v1/feeds/comment/reply", ArgPlacement::Body, LatencyClass::Standard),
];

/// Case-insensitive lookup on the trimmed command name.
pub fn lookup(command: &str) -> Option<&'static RouteEntry> {
    let wanted = command.trim();
    ROUTES.iter().find(|route| route.command.eq_ignore_ascii_case(wanted))
}

/// Commands that may run while the pet account is logged out.
pub fn is_login_exempt(command: &str) -> bool {
    let wanted = command.trim();
    wanted.eq_ignore_ascii_case(CHECK_LOGIN_STATUS) || wanted.eq_ignore_ascii_case(GET_LOGIN_QRCODE)
}
