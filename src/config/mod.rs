use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens. Startup fails when neither
    /// this field nor the JWT_SECRET environment variable is set.
    pub jwt_secret: Option<String>,
    /// Session token lifetime for regular users, in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Admin session tokens expire sooner.
    #[serde(default = "default_admin_token_ttl_hours")]
    pub admin_token_ttl_hours: i64,
    /// The first-created admin. Only this account may manage other admins,
    /// and it can never be deleted.
    #[serde(default = "default_super_admin_id")]
    pub super_admin_id: i64,
    /// Bootstrap credentials for the super admin, created on first start.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            admin_token_ttl_hours: default_admin_token_ttl_hours(),
            super_admin_id: default_super_admin_id(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_admin_token_ttl_hours() -> i64 {
    24
}

fn default_super_admin_id() -> i64 {
    1
}

fn default_admin_email() -> String {
    "admin@portal.local".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// General API requests per window per client IP.
    #[serde(default = "default_api_requests_per_window")]
    pub api_requests_per_window: u32,
    /// Login/register attempts per window per client IP.
    #[serde(default = "default_auth_requests_per_window")]
    pub auth_requests_per_window: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            api_requests_per_window: default_api_requests_per_window(),
            auth_requests_per_window: default_auth_requests_per_window(),
            window_seconds: default_window_seconds(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_api_requests_per_window() -> u32 {
    300
}

fn default_auth_requests_per_window() -> u32 {
    20
}

fn default_window_seconds() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    300
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<Config>(&content).context("Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if config.auth.jwt_secret.is_none() {
            config.auth.jwt_secret = std::env::var("JWT_SECRET").ok();
        }

        match &config.auth.jwt_secret {
            Some(secret) if !secret.is_empty() => Ok(config),
            _ => bail!(
                "No token signing secret configured. Set auth.jwt_secret in {} \
                 or the JWT_SECRET environment variable",
                path.display()
            ),
        }
    }

    /// The configured signing secret. Only valid after a successful `load`.
    pub fn jwt_secret(&self) -> &str {
        self.auth.jwt_secret.as_deref().unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
