//! Server configuration, parsed from flags with environment fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Vitalis clinic appointment server.
#[derive(Parser, Debug, Clone)]
#[command(name = "vitalis-server")]
#[command(version)]
#[command(about = "Clinic appointment backend over JSON/HTTP")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "VITALIS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database file, created on first start
    #[arg(long, env = "VITALIS_DATABASE", default_value = "vitalis.db")]
    pub database: PathBuf,

    /// Lifetime of issued bearer tokens
    #[arg(long, env = "VITALIS_TOKEN_TTL_HOURS", default_value_t = 12)]
    pub token_ttl_hours: i64,

    /// Email of the administrator account created at startup
    #[arg(long, env = "VITALIS_ADMIN_EMAIL", requires = "admin_password")]
    pub admin_email: Option<String>,

    #[arg(long, env = "VITALIS_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[arg(long, env = "VITALIS_ADMIN_NAME", default_value = "Administrator")]
    pub admin_name: String,

    /// Load demo clinics, procedures and patients into an empty database
    #[arg(long, env = "VITALIS_SEED_DEMO")]
    pub seed_demo: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "VITALIS_LOG", default_value = "info,vitalis_core=debug")]
    pub log_filter: String,
}

impl ServerConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    /// Administrator credentials, when both email and password are set.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
