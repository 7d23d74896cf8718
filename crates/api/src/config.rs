use collab_core::triggers::{DEFAULT_CHAT_DEBOUNCE_SECS, DEFAULT_CHAT_FRESHNESS_SECS};

use crate::auth::jwt::JwtConfig;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the notification router to drain.
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. When unset the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Per-project quiet period after a chat notification burst.
    pub chat_debounce_secs: i64,
    /// Chat messages older than this are not notified about.
    pub chat_freshness_secs: i64,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                    |
    /// | `DATABASE_URL`          | unset (in-memory store) |
    /// | `CHAT_DEBOUNCE_SECS`    | `120`                   |
    /// | `CHAT_FRESHNESS_SECS`   | `10`                    |
    /// | `LOG_FORMAT`            | `pretty`                |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values and when `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let chat_debounce_secs: i64 = std::env::var("CHAT_DEBOUNCE_SECS")
            .unwrap_or_else(|_| DEFAULT_CHAT_DEBOUNCE_SECS.to_string())
            .parse()
            .expect("CHAT_DEBOUNCE_SECS must be a valid i64");

        let chat_freshness_secs: i64 = std::env::var("CHAT_FRESHNESS_SECS")
            .unwrap_or_else(|_| DEFAULT_CHAT_FRESHNESS_SECS.to_string())
            .parse()
            .expect("CHAT_FRESHNESS_SECS must be a valid i64");

        let log_format = LogFormat::parse(
            &std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".into()),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            jwt: JwtConfig::from_env(),
            chat_debounce_secs,
            chat_freshness_secs,
            log_format,
        }
    }
}
