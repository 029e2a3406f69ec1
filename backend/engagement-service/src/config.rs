/// Configuration management for the engagement service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Per-operation behavior
    pub operation: OperationConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port for health checks
    pub http_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Per-operation behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Deadline applied to every engagement operation, in seconds
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_deadline_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8007),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let operation = OperationConfig {
            deadline_secs: std::env::var("OPERATION_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_deadline_secs),
        };

        Ok(Config {
            app,
            database,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8007);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.operation.deadline_secs, 30);
    }
}
