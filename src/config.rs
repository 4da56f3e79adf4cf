//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::SuccessPolicy;
use crate::routing::RouteFamily;

// == Environment ==
/// Deployment profile; selects the default TTLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

// == TTL Policy ==
/// Time-to-live per route family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub portfolio: Duration,
    pub profile: Duration,
    pub transaction: Duration,
}

impl TtlPolicy {
    /// Defaults for a deployment profile. Development keeps entries briefly so
    /// backend changes show up quickly.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self {
                portfolio: Duration::from_secs(30),
                profile: Duration::from_secs(300),
                transaction: Duration::from_secs(60),
            },
            Environment::Development => Self {
                portfolio: Duration::from_secs(5),
                profile: Duration::from_secs(30),
                transaction: Duration::from_secs(10),
            },
        }
    }

    pub fn ttl_for(&self, family: RouteFamily) -> Duration {
        match family {
            RouteFamily::Portfolio => self.portfolio,
            RouteFamily::Profile => self.profile,
            RouteFamily::Transaction => self.transaction,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::for_environment(Environment::Production)
    }
}

// == Cache Settings ==
/// Everything the response cache needs at runtime.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// When false the middleware passes every request straight through
    pub enabled: bool,
    pub ttl: TtlPolicy,
    pub success_policy: SuccessPolicy,
    /// Maximum number of stored responses
    pub max_entries: usize,
    /// Responses with larger bodies are served but not stored
    pub max_cacheable_bytes: usize,
    /// Prefix stripped before route classification
    pub api_base_path: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: TtlPolicy::default(),
            success_policy: SuccessPolicy::FailOpen,
            max_entries: 1000,
            max_cacheable_bytes: 1024 * 1024,
            api_base_path: String::new(),
        }
    }
}

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL requests are forwarded to
    pub backend_url: String,
    /// Deployment profile
    pub environment: Environment,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Response cache settings
    pub cache: CacheSettings,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BACKEND_URL` - Upstream base URL (default: http://127.0.0.1:8000)
    /// - `APP_ENV` - `development` or `production` (default: production)
    /// - `API_BASE_PATH` - Prefix stripped before classification (default: empty)
    /// - `MAX_ENTRIES` - Maximum cached responses (default: 1000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `UPSTREAM_TIMEOUT` - Backend timeout in seconds (default: 30)
    /// - `MAX_CACHEABLE_BYTES` - Largest body stored (default: 1 MiB)
    /// - `CACHE_SUCCESS_POLICY` - `fail-open` or `strict` (default: fail-open)
    /// - `CACHE_ENABLED` - Response cache kill switch (default: true)
    /// - `TTL_PORTFOLIO`, `TTL_PROFILE`, `TTL_TRANSACTION` - Per-family TTL overrides in seconds
    pub fn from_env() -> Self {
        let environment = env_or("APP_ENV", Environment::Production);
        let defaults = TtlPolicy::for_environment(environment);

        let ttl = TtlPolicy {
            portfolio: env_secs("TTL_PORTFOLIO").unwrap_or(defaults.portfolio),
            profile: env_secs("TTL_PROFILE").unwrap_or(defaults.profile),
            transaction: env_secs("TTL_TRANSACTION").unwrap_or(defaults.transaction),
        };

        let cache = CacheSettings {
            enabled: env_or("CACHE_ENABLED", true),
            ttl,
            success_policy: env_or("CACHE_SUCCESS_POLICY", SuccessPolicy::FailOpen),
            max_entries: env_or("MAX_ENTRIES", 1000),
            max_cacheable_bytes: env_or("MAX_CACHEABLE_BYTES", 1024 * 1024),
            api_base_path: env::var("API_BASE_PATH").unwrap_or_default(),
        };

        Self {
            server_port: env_or("SERVER_PORT", 3000),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            environment,
            cleanup_interval: env_or("CLEANUP_INTERVAL", 1),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", 30),
            cache,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            backend_url: "http://127.0.0.1:8000".to_string(),
            environment: Environment::Production,
            cleanup_interval: 1,
            upstream_timeout: 30,
            cache: CacheSettings::default(),
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
