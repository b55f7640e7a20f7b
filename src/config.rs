//! Process configuration read from the environment.

use std::net::SocketAddr;

use crate::db::DbConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Everything the service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Raw `DATABASE_URL`. `None` means the service runs without storage.
    pub database_url: Option<String>,
    /// Raw `DATABASE_NAME`. Overrides the database named in the URL.
    pub database_name: Option<String>,
    pub db: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = non_empty_var("DATABASE_URL");
        let database_name = non_empty_var("DATABASE_NAME");

        Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            db: DbConfig::from_env(database_url.clone(), database_name.clone()),
            database_url,
            database_name,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for AppConfig {
    /// Development defaults with no storage configured.
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            database_name: None,
            db: DbConfig::default(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
