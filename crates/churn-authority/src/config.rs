//! Authority configuration.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default validity window of an approval (15 minutes).
pub const DEFAULT_APPROVAL_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Longest validity window the authority will sign. Keeps a leaked approval
/// usable for minutes, not days.
pub const MAX_APPROVAL_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Configuration for a churn authority.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Hex-encoded 32-byte signing secret. A fresh key is generated when unset.
    pub signing_key_hex: Option<String>,

    /// Membership file with quorum capacities and ranked incumbents
    pub membership_file: PathBuf,

    /// How long an issued approval stays valid
    pub approval_window: Duration,

    /// Minimum spacing between requests from one operator key. Zero disables.
    pub min_request_interval: Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8090)),
            signing_key_hex: None,
            membership_file: PathBuf::from("./membership.json"),
            approval_window: DEFAULT_APPROVAL_WINDOW,
            min_request_interval: Duration::ZERO,
        }
    }
}

fn env_secs(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| Error::Config(format!("invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

impl AuthorityConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_addr = match std::env::var("CHURN_API_ADDR") {
            Ok(addr) => addr
                .parse()
                .map_err(|e| Error::Config(format!("invalid CHURN_API_ADDR: {}", e)))?,
            Err(_) => defaults.api_addr,
        };

        let signing_key_hex = std::env::var("CHURN_SIGNING_KEY").ok();

        let membership_file = std::env::var("CHURN_MEMBERSHIP_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.membership_file);

        let approval_window =
            env_secs("CHURN_APPROVAL_WINDOW_SECS")?.unwrap_or(defaults.approval_window);
        let min_request_interval =
            env_secs("CHURN_MIN_REQUEST_INTERVAL_SECS")?.unwrap_or(defaults.min_request_interval);

        let config = Self {
            api_addr,
            signing_key_hex,
            membership_file,
            approval_window,
            min_request_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the approval window.
    #[must_use]
    pub fn with_approval_window(mut self, window: Duration) -> Self {
        self.approval_window = window;
        self
    }

    /// Set the per-operator request interval.
    #[must_use]
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Check the approval window is non-zero and bounded.
    pub fn validate(&self) -> Result<()> {
        if self.approval_window.as_secs() == 0 {
            return Err(Error::Config("approval window must be at least one second".to_string()));
        }
        if self.approval_window > MAX_APPROVAL_WINDOW {
            return Err(Error::Config(format!(
                "approval window {:?} exceeds maximum {:?}",
                self.approval_window, MAX_APPROVAL_WINDOW
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        AuthorityConfig::default().validate().unwrap();
    }

    #[test]
    fn window_bounds() {
        let zero = AuthorityConfig::default().with_approval_window(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(Error::Config(_))));

        let sub_second = AuthorityConfig::default().with_approval_window(Duration::from_millis(500));
        assert!(matches!(sub_second.validate(), Err(Error::Config(_))));

        let too_long = AuthorityConfig::default().with_approval_window(Duration::from_secs(2 * 24 * 3600));
        assert!(matches!(too_long.validate(), Err(Error::Config(_))));

        AuthorityConfig::default()
            .with_approval_window(MAX_APPROVAL_WINDOW)
            .validate()
            .unwrap();
    }
}
