use std::{
    env,
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_PATH: &str = "portfolio.db";
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_APP_URL: &str = "https://portfolio-4s1j.onrender.com";

/// Origin of the Vite dev server, always allowed through CORS.
pub const DEV_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Result of reading a `.env` file into the process environment. Variables
/// already set in the environment are never overwritten.
#[derive(Debug)]
pub enum DotEnv {
    Loaded(PathBuf),
    Missing,
    Invalid(dotenvy::Error),
}

impl DotEnv {
    /// Searches the working directory and its parents.
    pub fn load() -> Self {
        dotenvy::dotenv().map_or_else(Self::from_error, DotEnv::Loaded)
    }

    pub fn load_from(path: &Path) -> Self {
        match dotenvy::from_path(path) {
            Ok(()) => DotEnv::Loaded(path.to_path_buf()),
            Err(e) => Self::from_error(e),
        }
    }

    fn from_error(error: dotenvy::Error) -> Self {
        if error.not_found() {
            DotEnv::Missing
        } else {
            DotEnv::Invalid(error)
        }
    }

    /// Loading happens before the subscriber exists, so reporting is separate.
    pub fn log(&self) {
        match self {
            DotEnv::Loaded(path) => info!("Loaded environment from {}", path.display()),
            DotEnv::Missing => debug!("No .env file found, using process environment"),
            DotEnv::Invalid(e) => warn!("Ignoring unreadable .env file: {e}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Best-effort read of `APP_ENV` before logging is up. Unknown values fall
    /// back to production here and are rejected later by [`Config::load`].
    pub fn detect() -> Self {
        env::var("APP_ENV")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub email_address: Option<String>,
    pub email_password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub app_url: String,
    pub environment: Environment,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self {
            port: try_load("PORT", &DEFAULT_PORT.to_string())?,
            database_path: try_load("DATABASE_PATH", DEFAULT_DATABASE_PATH)?,
            static_dir: try_load("STATIC_DIR", DEFAULT_STATIC_DIR)?,
            email_address: optional("EMAIL_ADDRESS"),
            email_password: optional("EMAIL_PASSWORD").or_else(|| read_secret("EMAIL_PASSWORD")),
            smtp_host: try_load("SMTP_HOST", DEFAULT_SMTP_HOST)?,
            smtp_port: try_load("SMTP_PORT", &DEFAULT_SMTP_PORT.to_string())?,
            app_url: try_load("APP_URL", DEFAULT_APP_URL)?,
            environment: try_load("APP_ENV", "production")?,
        };

        if !config.mail_configured() {
            warn!("EMAIL_ADDRESS or EMAIL_PASSWORD missing, contact notifications are disabled");
        }

        Ok(config)
    }

    pub fn mail_configured(&self) -> bool {
        self.email_address.is_some() && self.email_password.is_some()
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        vec![
            self.app_url.trim_end_matches('/').to_string(),
            DEV_ORIGIN.to_string(),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            email_address: None,
            email_password: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            app_url: DEFAULT_APP_URL.to_string(),
            environment: Environment::default(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn optional(key: &str) -> Option<String> {
    let value = var(key).map(|value| value.trim().to_string());
    if value.is_none() {
        info!("{key} not set");
    }

    value
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }
    })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("No {secret_name} secret file: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
