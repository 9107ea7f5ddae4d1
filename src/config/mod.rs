use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::api::auth::DEFAULT_SUDO_PATH;

pub const DEFAULT_SUDO_TTL_SECS: i64 = 2 * 60 * 60;
/// Longest elevation the client will record
pub const MAX_SUDO_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub sudo: SudoConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SudoConfig {
    pub path: String,
    pub ttl_secs: i64,
    /// Forward the server's rejection text to the notification sink
    pub notify_on_failure: bool,
}

impl Default for SudoConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SUDO_PATH.to_string(),
            ttl_secs: DEFAULT_SUDO_TTL_SECS,
            notify_on_failure: false,
        }
    }
}

impl SudoConfig {
    /// Elevation lifetime. Values outside `1..=MAX_SUDO_TTL_SECS` fall back
    /// to the two hour default.
    pub fn ttl(&self) -> chrono::Duration {
        checked_ttl(self.ttl_secs).unwrap_or_else(|| {
            tracing::warn!(
                "Sudo TTL of {}s is out of range, using {}s",
                self.ttl_secs,
                DEFAULT_SUDO_TTL_SECS
            );
            chrono::Duration::hours(2)
        })
    }
}

fn checked_ttl(secs: i64) -> Option<chrono::Duration> {
    if secs <= 0 || secs > MAX_SUDO_TTL_SECS {
        return None;
    }
    chrono::Duration::try_seconds(secs)
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("COSMOS_BASE_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("COSMOS_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        if let Ok(v) = env::var("COSMOS_SUDO_PATH") {
            self.sudo.path = v;
        }
        if let Ok(v) = env::var("COSMOS_SUDO_TTL_SECS") {
            match v.parse::<i64>().ok().filter(|secs| checked_ttl(*secs).is_some()) {
                Some(secs) => self.sudo.ttl_secs = secs,
                None => tracing::warn!(
                    "Ignoring COSMOS_SUDO_TTL_SECS={}, expected 1..={}",
                    v,
                    MAX_SUDO_TTL_SECS
                ),
            }
        }
        if let Ok(v) = env::var("COSMOS_SUDO_NOTIFY") {
            self.sudo.notify_on_failure = v.parse().unwrap_or(self.sudo.notify_on_failure);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_secs: 30,
            },
            sudo: SudoConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://localhost".to_string(),
                timeout_secs: 15,
            },
            sudo: SudoConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://localhost".to_string(),
                timeout_secs: 10,
            },
            sudo: SudoConfig::default(),
        }
    }
}

// Global singleton config - initialized once on first access
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
