// src/config.rs

use std::env;
use std::fmt;

use dotenvy::dotenv;

/// Subjects shown per page on the subject index.
pub const SUBJECTS_PER_PAGE: i64 = 15;

/// How many attempts the recent-quizzes feed returns.
pub const RECENT_QUIZZES_LIMIT: i64 = 10;

/// Rows on a quiz leaderboard.
pub const LEADERBOARD_SIZE: i64 = 5;

/// Attempts listed in the caller's history on the quiz page.
pub const RECENT_ATTEMPTS_LIMIT: i64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub log_dir: String,
}

/// Raised when a required variable is missing or a value does not parse.
#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = parsed("JWT_EXPIRATION", 86_400)?;
        let port = parsed("PORT", 3000)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            log_dir,
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError(format!("{key} must be set")))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
