//! Client configuration for the default reqwest transport.

use std::{env, time::Duration};

use refetch_types::Headers;

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_ENV_VAR: &str = "REFETCH_TIMEOUT_SECS";
/// Environment variable overriding the User-Agent header.
pub const USER_AGENT_ENV_VAR: &str = "REFETCH_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings applied when building the underlying `reqwest::Client`.
///
/// The core imposes no timeout of its own; the values here belong to the
/// transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Headers sent with every request unless the request sets them itself.
    pub default_headers: Headers,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("refetch/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            default_headers: Headers::new(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the defaults plus environment overrides.
    ///
    /// - `REFETCH_TIMEOUT_SECS`: request timeout; ignored unless a positive integer
    /// - `REFETCH_USER_AGENT`: replaces the default User-Agent when non-empty
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(timeout_secs) = env::var(TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Some(user_agent) = env::var(USER_AGENT_ENV_VAR).ok().filter(|value| !value.trim().is_empty()) {
            config.user_agent = user_agent;
        }

        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
