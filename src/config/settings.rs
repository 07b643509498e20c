use std::{env, path::PathBuf, time::Duration};

use tracing::warn;

const DEFAULT_DATABASE_URL: &str = "sqlite://users.db";
const DEFAULT_MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} must be set in production")]
    MissingInProduction(&'static str),
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub avatar_dir: PathBuf,
    pub max_avatar_bytes: usize,
    pub reset_code_ttl: chrono::Duration,
    pub reset_sweep_interval: Duration,
    pub require_reset_token: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(5),
            host: "127.0.0.1".to_string(),
            port: 8000,
            avatar_dir: PathBuf::from("avatars"),
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
            reset_code_ttl: chrono::Duration::minutes(10),
            reset_sweep_interval: Duration::from_secs(60),
            require_reset_token: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let ttl_minutes: i64 = parse_var("RESET_CODE_TTL_MINUTES", 10)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "RESET_CODE_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }

        let max_avatar_bytes: usize = parse_var("MAX_AVATAR_BYTES", defaults.max_avatar_bytes)?;
        if max_avatar_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_AVATAR_BYTES",
                value: "0".to_string(),
            });
        }

        let sweep_secs: u64 = parse_var("RESET_SWEEP_INTERVAL_SECS", 60)?;
        if sweep_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RESET_SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            avatar_dir: env::var("AVATAR_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.avatar_dir),
            max_avatar_bytes,
            reset_code_ttl: chrono::Duration::minutes(ttl_minutes),
            reset_sweep_interval: Duration::from_secs(sweep_secs),
            require_reset_token: env_flag_enabled("RESET_REQUIRE_TOKEN"),
        })
    }

    /// Refuses to start a production deployment that would only log reset
    /// codes instead of mailing them.
    pub fn validate_production(&self) -> Result<(), ConfigError> {
        if current_environment() != "production" {
            return Ok(());
        }

        if env::var("SMTP_HOST").is_err() {
            return Err(ConfigError::MissingInProduction("SMTP_HOST"));
        }

        if !self.require_reset_token {
            warn!("RESET_REQUIRE_TOKEN is disabled; password reset completion trusts the caller");
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

pub fn current_environment() -> String {
    env::var("ENVIRONMENT")
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
