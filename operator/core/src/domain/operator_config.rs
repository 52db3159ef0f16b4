// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

// Operator Configuration
//
// Kubernetes-style manifest (apiVersion/kind/spec) describing:
// - The bound owner identity and the shared signing secret
// - The automation engine endpoint and per-class request timeouts
// - The HTTP listener
// - Freshness window and replay-cache TTL

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::route::TimeoutPolicy;

pub const API_VERSION: &str = "pet-operator/v1";
pub const KIND: &str = "OperatorConfig";
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:18060";
pub const CONFIG_PATH_ENV: &str = "PET_OPERATOR_CONFIG_PATH";

/// Upper bound for every configured window, TTL and timeout.
pub const MAX_CONFIGURED_SECONDS: u64 = 86_400;

/// Top-level configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// API version (must be "pet-operator/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "OperatorConfig")
    pub kind: String,

    #[serde(default)]
    pub spec: OperatorConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorConfigSpec {
    #[serde(default)]
    pub owner: OwnerConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Account id of the owner (not the pet account)
    #[serde(default)]
    pub user_id: String,

    /// HMAC key shared with the owner (supports "env:VAR_NAME")
    #[serde(default)]
    pub shared_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the automation engine
    #[serde(default = "default_engine_url")]
    pub base_url: String,

    /// Check the pet account's login before every non-login command
    #[serde(default = "default_true")]
    pub require_login: bool,

    #[serde(default)]
    pub timeouts: EngineTimeouts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTimeouts {
    #[serde(default = "default_probe_seconds")]
    pub probe_seconds: u64,

    #[serde(default = "default_standard_seconds")]
    pub standard_seconds: u64,

    #[serde(default = "default_publish_seconds")]
    pub publish_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Maximum allowed clock skew of a request timestamp
    #[serde(default = "default_freshness_window")]
    pub freshness_window_seconds: u64,

    /// How long a consumed nonce is remembered
    #[serde(default = "default_nonce_ttl")]
    pub nonce_ttl_seconds: u64,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_probe_seconds() -> u64 {
    10
}

fn default_standard_seconds() -> u64 {
    20
}

fn default_publish_seconds() -> u64 {
    30
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_freshness_window() -> u64 {
    300
}

fn default_nonce_ttl() -> u64 {
    600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            require_login: true,
            timeouts: EngineTimeouts::default(),
        }
    }
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            probe_seconds: default_probe_seconds(),
            standard_seconds: default_standard_seconds(),
            publish_seconds: default_publish_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            freshness_window_seconds: default_freshness_window(),
            nonce_ttl_seconds: default_nonce_ttl(),
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: OperatorConfigSpec::default(),
        }
    }
}

impl EngineTimeouts {
    pub fn policy(&self) -> TimeoutPolicy {
        TimeoutPolicy {
            probe: Duration::from_secs(self.probe_seconds),
            standard: Duration::from_secs(self.standard_seconds),
            publish: Duration::from_secs(self.publish_seconds),
        }
    }
}

impl OperatorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.normalize();
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. PET_OPERATOR_CONFIG_PATH environment variable
    /// 2. ./pet-operator.yaml (working directory)
    /// 3. ~/.pet-operator/config.yaml (user home)
    /// 4. /etc/pet-operator/config.yaml (Unix) or C:\ProgramData\PetOperator\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Every location [`Self::discover_config`] checks, in order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("./pet-operator.yaml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".pet-operator").join("config.yaml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/pet-operator/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\PetOperator\\config.yaml"));

        paths
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // 1. Explicit CLI path (Fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        // 2. Discovery (Env -> Cwd -> Home -> System)
        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("PET_OPERATOR_OWNER_USER_ID") {
            tracing::info!("Environment override: PET_OPERATOR_OWNER_USER_ID");
            self.spec.owner.user_id = val;
        }
        if let Some(val) = lookup("PET_OPERATOR_OWNER_SECRET") {
            tracing::info!("Environment override: PET_OPERATOR_OWNER_SECRET");
            self.spec.owner.shared_secret = val;
        }
        if let Some(val) = lookup("PET_OPERATOR_ENGINE_URL") {
            tracing::info!("Environment override: PET_OPERATOR_ENGINE_URL={}", val);
            self.spec.engine.base_url = val;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.spec.owner.user_id = self.spec.owner.user_id.trim().to_string();
        let base_url = self.spec.engine.base_url.trim().trim_end_matches('/');
        self.spec.engine.base_url = if base_url.is_empty() {
            DEFAULT_ENGINE_URL.to_string()
        } else {
            base_url.to_string()
        };
    }

    /// The signing secret with any "env:VAR_NAME" indirection resolved.
    pub fn resolved_secret(&self) -> anyhow::Result<String> {
        self.resolve_secret_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_secret_with(&self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
        let raw = self.spec.owner.shared_secret.trim();
        let secret = match raw.strip_prefix("env:") {
            Some(var) => lookup(var.trim())
                .ok_or_else(|| anyhow::anyhow!("Environment variable '{}' for owner.shared_secret is not set", var.trim()))?,
            None => raw.to_string(),
        };
        if secret.is_empty() {
            anyhow::bail!("owner.shared_secret resolves to an empty value");
        }
        Ok(secret)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.spec.server.bind_address, self.spec.server.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_with(|key| std::env::var(key).ok())
    }

    pub fn validate_with(&self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.spec.owner.user_id.is_empty() {
            anyhow::bail!(
                "spec.owner.user_id is required (must be the owner account user_id, not the pet account)"
            );
        }

        self.resolve_secret_with(lookup)?;

        let timeouts = &self.spec.engine.timeouts;
        let security = &self.spec.security;
        for (key, value) in [
            ("spec.engine.timeouts.probe_seconds", timeouts.probe_seconds),
            ("spec.engine.timeouts.standard_seconds", timeouts.standard_seconds),
            ("spec.engine.timeouts.publish_seconds", timeouts.publish_seconds),
            ("spec.security.freshness_window_seconds", security.freshness_window_seconds),
            ("spec.security.nonce_ttl_seconds", security.nonce_ttl_seconds),
        ] {
            if value == 0 || value > MAX_CONFIGURED_SECONDS {
                anyhow::bail!(
                    "{key} must be between 1 and {MAX_CONFIGURED_SECONDS} seconds (got {value})"
                );
            }
        }
        if security.nonce_ttl_seconds < security.freshness_window_seconds {
            anyhow::bail!(
                "spec.security.nonce_ttl_seconds ({}) must be >= freshness_window_seconds ({})",
                security.nonce_ttl_seconds,
                security.freshness_window_seconds
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
apiVersion: pet-operator/v1
kind: OperatorConfig
spec:
  owner:
    user_id: " 5f1a2b "
    shared_secret: "env:TEST_OWNER_SECRET"
  engine:
    base_url: "http://engine.local:18060/"
    timeouts:
      publish_seconds: 45
  server:
    port: 9000
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_manifest() {
        let config = OperatorConfig::default();
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.kind, KIND);
        assert_eq!(config.spec.engine.base_url, DEFAULT_ENGINE_URL);
        assert!(config.spec.engine.require_login);
        assert_eq!(config.spec.security.freshness_window_seconds, 300);
        assert_eq!(config.spec.security.nonce_ttl_seconds, 600);
        assert_eq!(config.listen_addr(), "127.0.0.1:8090");
    }

    #[test]
    fn test_parse_normalizes_and_fills_defaults() {
        let config = OperatorConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.spec.owner.user_id, "5f1a2b");
        assert_eq!(config.spec.engine.base_url, "http://engine.local:18060");
        assert_eq!(config.spec.engine.timeouts.publish_seconds, 45);
        assert_eq!(config.spec.engine.timeouts.standard_seconds, 20);
        assert_eq!(config.spec.server.bind_address, "127.0.0.1");
        assert_eq!(config.spec.server.port, 9000);

        let policy = config.spec.engine.timeouts.policy();
        assert_eq!(policy.publish, Duration::from_secs(45));
    }

    #[test]
    fn test_secret_env_indirection() {
        let config = OperatorConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(
            config.resolve_secret_with(env(&[("TEST_OWNER_SECRET", "s3cret")])).unwrap(),
            "s3cret"
        );
        assert!(config.resolve_secret_with(env(&[])).is_err());
        assert!(config.resolve_secret_with(env(&[("TEST_OWNER_SECRET", "")])).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = OperatorConfig::default();
        config.apply_overrides_from(env(&[
            ("PET_OPERATOR_OWNER_USER_ID", " owner-9 "),
            ("PET_OPERATOR_OWNER_SECRET", "literal"),
            ("PET_OPERATOR_ENGINE_URL", "http://10.0.0.2:18060///"),
        ]));
        assert_eq!(config.spec.owner.user_id, "owner-9");
        assert_eq!(config.spec.owner.shared_secret, "literal");
        assert_eq!(config.spec.engine.base_url, "http://10.0.0.2:18060");
    }

    #[test]
    fn test_empty_engine_url_falls_back_to_default() {
        let mut config = OperatorConfig::default();
        config.apply_overrides_from(env(&[("PET_OPERATOR_ENGINE_URL", "  ")]));
        assert_eq!(config.spec.engine.base_url, DEFAULT_ENGINE_URL);
    }

    #[test]
    fn test_validation() {
        let mut config = OperatorConfig::default();
        config.spec.owner.user_id = "owner".to_string();
        config.spec.owner.shared_secret = "secret".to_string();
        assert!(config.validate_with(env(&[])).is_ok());

        // Invalid apiVersion should fail
        config.api_version = "wrong/v1".to_string();
        assert!(config.validate_with(env(&[])).is_err());
        config.api_version = API_VERSION.to_string();

        // Invalid kind should fail
        config.kind = "NodeConfig".to_string();
        assert!(config.validate_with(env(&[])).is_err());
        config.kind = KIND.to_string();

        // Missing owner should fail
        config.spec.owner.user_id.clear();
        let err = config.validate_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("not the pet account"));
        config.spec.owner.user_id = "owner".to_string();

        // Missing secret should fail
        config.spec.owner.shared_secret.clear();
        assert!(config.validate_with(env(&[])).is_err());
        config.spec.owner.shared_secret = "secret".to_string();

        // Nonce TTL shorter than the freshness window should fail
        config.spec.security.nonce_ttl_seconds = 120;
        assert!(config.validate_with(env(&[])).is_err());
        config.spec.security.nonce_ttl_seconds = 600;

        // Zero timeout should fail
        config.spec.engine.timeouts.probe_seconds = 0;
        assert!(config.validate_with(env(&[])).is_err());
        config.spec.engine.timeouts.probe_seconds = 10;
    }

    #[test]
    fn test_validation_rejects_oversized_durations() {
        let mut config = OperatorConfig::default();
        config.spec.owner.user_id = "owner".to_string();
        config.spec.owner.shared_secret = "secret".to_string();

        config.spec.security.freshness_window_seconds = MAX_CONFIGURED_SECONDS;
        config.spec.security.nonce_ttl_seconds = MAX_CONFIGURED_SECONDS;
        assert!(config.validate_with(env(&[])).is_ok());

        config.spec.security.freshness_window_seconds = 10_000_000_000_000_000;
        config.spec.security.nonce_ttl_seconds = 10_000_000_000_000_000;
        let err = config.validate_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("freshness_window_seconds"));

        config.spec.security.freshness_window_seconds = 300;
        config.spec.security.nonce_ttl_seconds = u64::MAX;
        assert!(config.validate_with(env(&[])).is_err());
        config.spec.security.nonce_ttl_seconds = 600;

        config.spec.engine.timeouts.publish_seconds = MAX_CONFIGURED_SECONDS + 1;
        let err = config.validate_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("publish_seconds"));
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pet-operator.yaml");

        let mut config = OperatorConfig::default();
        config.spec.owner.user_id = "owner".to_string();
        config.spec.server.port = 9100;
        config.to_yaml_file(&path).unwrap();

        let loaded = OperatorConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.spec.server.port, 9100);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OperatorConfig::load_or_default(Some(dir.path().join("missing.yaml"))).is_err());
    }
}
