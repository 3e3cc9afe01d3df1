//! Runtime configuration: optional TOML file, then environment overrides.

use crate::errors::ServerError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config filename, read only when present.
const DEFAULT_CONFIG_NAME: &str = "property_market.toml";
/// Environment variable pointing at an explicit config file.
const CONFIG_ENV_VAR: &str = "PROPERTY_MARKET_CONFIG";
/// Upper bound on the config file size.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, ServerError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ServerError::Config(format!("unknown APP_ENV `{other}`"))),
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on astra worker threads.
    pub max_workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_workers: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
    /// How long a request waits for a pooled connection.
    pub connection_timeout_ms: u64,
    /// SQLite busy handler timeout applied to every connection.
    pub busy_timeout_ms: u64,
    /// Apply `sql/schema.sql` on start-up.
    pub init_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("property_data.sqlite3"),
            pool_size: 8,
            connection_timeout_ms: 5_000,
            busy_timeout_ms: 2_000,
            init_schema: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Loads the file named by `PROPERTY_MARKET_CONFIG` (or the default file
    /// when it exists), applies environment overrides and validates.
    pub fn load() -> Result<Self, ServerError> {
        let explicit = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_NAME).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_NAME))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let meta = fs::metadata(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        if meta.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ServerError::Config(format!(
                "{} exceeds the config size limit",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ServerError> {
        toml::from_str(content).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Applies `HOST`, `PORT`, `MAX_WORKERS`, `DATABASE_PATH`, `DB_POOL_SIZE`,
    /// `DB_TIMEOUT_MS` and `APP_ENV` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(workers) = lookup("MAX_WORKERS") {
            self.server.max_workers = parse_var("MAX_WORKERS", &workers)?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(size) = lookup("DB_POOL_SIZE") {
            self.database.pool_size = parse_var("DB_POOL_SIZE", &size)?;
        }
        if let Some(timeout) = lookup("DB_TIMEOUT_MS") {
            self.database.connection_timeout_ms = parse_var("DB_TIMEOUT_MS", &timeout)?;
        }
        if let Some(env) = lookup("APP_ENV") {
            self.environment = Environment::parse(&env)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.server.port == 0 {
            return Err(ServerError::Config("server.port must be non-zero".into()));
        }
        if self.server.max_workers == 0 {
            return Err(ServerError::Config(
                "server.max_workers must be at least 1".into(),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ServerError::Config("database.path is required".into()));
        }
        // Search and market requests each check out up to three connections at once.
        if self.database.pool_size < 3 {
            return Err(ServerError::Config(
                "database.pool_size must be at least 3".into(),
            ));
        }
        if self.database.connection_timeout_ms == 0 {
            return Err(ServerError::Config(
                "database.connection_timeout_ms must be non-zero".into(),
            ));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid listen address: {e}")))
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ServerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ServerError::Config(format!("{name}: {e}")))
}
