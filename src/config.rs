use std::path::PathBuf;

use crate::db::WikiError;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "wiki.db";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the wiki files.
/// Command-line flags override individual fields after loading.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `9999`).
    pub port: u16,
    /// SQLite database file (default: `./wiki.db`).
    pub db_path: PathBuf,
    /// Directory served under `/static` (default: `./static`).
    pub static_dir: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9999,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            static_dir: PathBuf::from("static"),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `HOST`                 | `0.0.0.0`   |
    /// | `PORT`                 | `9999`      |
    /// | `WIKI_DB`              | `wiki.db`   |
    /// | `WIKI_STATIC_DIR`      | `static`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`        |
    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WikiError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| WikiError::InvalidInput(format!("PORT must be a valid u16: {}", e)))?,
            None => defaults.port,
        };

        let db_path = lookup("WIKI_DB")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let static_dir = lookup("WIKI_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                WikiError::InvalidInput(format!("REQUEST_TIMEOUT_SECS must be a valid u64: {}", e))
            })?,
            None => defaults.request_timeout_secs,
        };

        Ok(Self {
            host,
            port,
            db_path,
            static_dir,
            request_timeout_secs,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
