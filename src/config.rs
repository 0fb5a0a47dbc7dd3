use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Upper bound on pooled database connections.
    pub max_connections: u32,
    /// Drop and recreate all tables at startup.
    pub reset_database: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Configuration("DATABASE_URL must be set".into()))?;

        Ok(Self {
            database_url,
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            reset_database: parse_var("DATABASE_RESET", false)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
