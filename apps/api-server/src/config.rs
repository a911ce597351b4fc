//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quillpress_infra::RateLimitConfig;
use quillpress_infra::database::DatabaseConfig;

/// Where uploaded media lives and how clients reach it.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Local directory for uploaded files. In-memory storage when unset.
    pub root: Option<PathBuf>,
    /// Public URL prefix of the media download route.
    pub base_url: String,
}

/// Administrator account created at startup when missing.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub media: MediaConfig,
    pub login_rate_limit: RateLimitConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
            sqlx_logging: parsed("DB_SQL_LOGGING", false),
        });

        let media = MediaConfig {
            root: env::var("MEDIA_ROOT").ok().map(PathBuf::from),
            base_url: env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "/api/media".to_string()),
        };

        let login_rate_limit = RateLimitConfig {
            max_requests: parsed("LOGIN_RATE_LIMIT_MAX_REQUESTS", 5),
            window: Duration::from_secs(parsed("LOGIN_RATE_LIMIT_WINDOW_SECS", 60)),
        };

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    name: env::var("BOOTSTRAP_ADMIN_NAME")
                        .unwrap_or_else(|_| "Administrator".to_string()),
                    email,
                    password,
                })
            }
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            media,
            login_rate_limit,
            bootstrap_admin,
        }
    }
}
