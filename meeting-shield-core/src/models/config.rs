use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;
use super::policy::{Affordance, ProtectionPolicy, PROVIDER_DOMAIN};

/// Engine-wide configuration supplied by the host.
///
/// Deserializable from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Policy used for window events before any `init`, and by the command surface.
    pub default_policy: ProtectionPolicy,

    /// How long to wait for the SDK's init callback (default: 30000 ms).
    pub init_timeout_ms: u64,

    /// Maximum recursion depth of one sanitization pass (default: 32).
    pub max_scan_depth: usize,

    /// Maximum nodes visited in one sanitization pass (default: 4096).
    pub max_scan_nodes: usize,

    pub sdk_domain: String,
    pub sdk_enable_log: bool,
    pub sdk_enable_generate_dump: bool,

    /// SDK log size in MB (default: 5).
    pub sdk_log_size: u32,

    /// Affordances kept visible regardless of policy (default: chat).
    pub baseline_visible: HashSet<Affordance>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidPolicy(format!("malformed engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.default_policy.validate()?;
        if self.init_timeout_ms == 0 {
            return Err(ValidationError::InvalidPolicy("init timeout must be positive".into()));
        }
        if self.max_scan_depth == 0 || self.max_scan_nodes == 0 {
            return Err(ValidationError::InvalidPolicy("scan limits must be positive".into()));
        }
        Ok(())
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn sdk_init_params(&self, jwt_token: &str) -> SdkInitParams {
        SdkInitParams {
            jwt_token: jwt_token.to_string(),
            domain: self.sdk_domain.clone(),
            enable_log: self.sdk_enable_log,
            enable_generate_dump: self.sdk_enable_generate_dump,
            log_size: self.sdk_log_size,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_policy: ProtectionPolicy::default(),
            init_timeout_ms: 30_000,
            max_scan_depth: 32,
            max_scan_nodes: 4096,
            sdk_domain: PROVIDER_DOMAIN.to_string(),
            sdk_enable_log: true,
            sdk_enable_generate_dump: true,
            sdk_log_size: 5,
            baseline_visible: HashSet::from([Affordance::Chat]),
        }
    }
}

/// Parameters passed to the SDK's `initialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct SdkInitParams {
    pub jwt_token: String,
    pub domain: String,
    pub enable_log: bool,
    pub enable_generate_dump: bool,
    pub log_size: u32,
}

impl fmt::Debug for SdkInitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkInitParams")
            .field("jwt_token", &"<redacted>")
            .field("domain", &self.domain)
            .field("enable_log", &self.enable_log)
            .field("enable_generate_dump", &self.enable_generate_dump)
            .field("log_size", &self.log_size)
            .finish()
    }
}
