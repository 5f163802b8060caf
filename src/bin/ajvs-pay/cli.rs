//! Command-line interface definition.

use ajvs_pay::config::ServiceConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Payment verification and manuscript submission service for the African
/// Journal of Veterinary Sciences.
#[derive(Parser, Debug)]
#[command(name = "ajvs-pay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, short, env = "AJVS_LISTEN_ADDR")]
    pub listen: Option<SocketAddr>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "AJVS_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Payment gateway secret key.
    #[arg(long, env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    pub gateway_secret_key: Option<String>,

    /// Identity provider base URL.
    #[arg(long, env = "AJVS_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Mail provider API key.
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub mail_api_key: Option<String>,

    /// Author/reviewer dashboard base URL, used in email links.
    #[arg(long, env = "AJVS_DASHBOARD_URL")]
    pub dashboard_url: Option<String>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a `ServiceConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn into_config(self) -> color_eyre::Result<ServiceConfig> {
        // Start with default config or load from file
        let mut config = if let Some(ref path) = self.config {
            ServiceConfig::from_file(path)?
        } else {
            ServiceConfig::default()
        };

        // Override with CLI arguments
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(key) = self.gateway_secret_key {
            config.gateway.secret_key = key;
        }
        if let Some(url) = self.auth_url {
            config.auth.base_url = url;
        }
        if let Some(key) = self.mail_api_key {
            config.mailer.api_key = key;
        }
        if let Some(url) = self.dashboard_url {
            config.mailer.dashboard_url = url;
        }
        config.log_level = self.log_level;

        Ok(config)
    }
}
