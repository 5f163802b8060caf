//! Configuration for ajvs-pay.
//!
//! All secrets and endpoints are resolved once at process start and injected
//! into the workflow's collaborators at construction time; nothing in the
//! request path reads the environment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Payment gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Identity provider configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Transactional email configuration.
    #[serde(default)]
    pub mailer: MailerConfig,
}

/// Payment gateway (Paystack) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway API.
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Secret key used as the bearer credential for verification calls.
    #[serde(default)]
    pub secret_key: String,

    /// Timeout for a single verification call, in seconds.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,
}

/// Identity provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the identity provider.
    #[serde(default)]
    pub base_url: String,

    /// Timeout for a token resolution call, in seconds.
    #[serde(default = "default_auth_timeout_secs")]
    pub timeout_secs: u64,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,

    /// Maximum connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Transactional email (Resend) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Base URL of the mail provider API.
    #[serde(default = "default_mailer_base_url")]
    pub base_url: String,

    /// Mail provider API key.
    #[serde(default)]
    pub api_key: String,

    /// From address for announcement mail.
    #[serde(default = "default_bulk_from")]
    pub bulk_from: String,

    /// From address for editorial mail.
    #[serde(default = "default_editorial_from")]
    pub editorial_from: String,

    /// Base URL of the author/reviewer dashboard, used in email links.
    #[serde(default)]
    pub dashboard_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            mailer: MailerConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base_url(),
            secret_key: String::new(),
            verify_timeout_secs: default_verify_timeout_secs(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_auth_timeout_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            base_url: default_mailer_base_url(),
            api_key: String::new(),
            bulk_from: default_bulk_from(),
            editorial_from: default_editorial_from(),
            dashboard_url: String::new(),
        }
    }
}

impl GatewayConfig {
    /// Timeout for a single verification call.
    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}

impl AuthConfig {
    /// Timeout for a token resolution call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_listen_addr() -> SocketAddr {
    ([0, 0, 0, 0], 8787).into()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gateway_base_url() -> String {
    "https://api.paystack.co".to_string()
}

const fn default_verify_timeout_secs() -> u64 {
    30
}

const fn default_auth_timeout_secs() -> u64 {
    10
}

const fn default_max_connections() -> u32 {
    10
}

fn default_mailer_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_bulk_from() -> String {
    "AJVS <noreply@ajvs.org>".to_string()
}

fn default_editorial_from() -> String {
    "AJVS Editorial <editorial@ajvs.org>".to_string()
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr.port(), 8787);
        assert_eq!(config.gateway.base_url, "https://api.paystack.co");
        assert_eq!(config.gateway.verify_timeout(), Duration::from_secs(30));
        assert!(config.gateway.secret_key.is_empty());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ServiceConfig {
            log_level: "debug".to_string(),
            ..Default::default()
        };
        let toml = toml::to_string_pretty(&config).expect("serialize");
        let parsed: ServiceConfig = toml::from_str(&toml).expect("parse");
        assert_eq!(parsed.log_level, "debug");
        assert_eq!(parsed.gateway.base_url, config.gateway.base_url);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: ServiceConfig =
            toml::from_str("[gateway]\nsecret_key = \"sk_test_x\"\n").expect("parse");
        assert_eq!(parsed.gateway.secret_key, "sk_test_x");
        assert_eq!(parsed.gateway.base_url, "https://api.paystack.co");
        assert_eq!(parsed.log_level, "info");
    }
}
