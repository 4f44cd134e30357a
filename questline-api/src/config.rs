//! Configuration for the API server.
//!
//! Everything comes from environment variables (a `.env` file is honored
//! in development):
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `JWT_SECRET`: signing secret, at least 32 characters (required)
//! - `API_HOST`: bind host (default `0.0.0.0`)
//! - `API_PORT`: bind port (default `8080`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
//! - `OPERATION_TIMEOUT_SECONDS`: per-operation store budget (default 5)

use std::env;
use std::time::Duration;

use questline_shared::config::CoreConfig;
use questline_shared::db::pool::DatabaseConfig;

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,

    /// Core configuration handed to the engines; holds the signing secret,
    /// token lifetimes, task catalog, and referral bonuses.
    pub core: CoreConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Loads configuration from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let op_timeout_seconds = env::var("OPERATION_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()?;

        let mut core = CoreConfig::new(jwt_secret);
        core.op_timeout = Duration::from_secs(op_timeout_seconds);

        Ok(Self {
            api: ApiConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..DatabaseConfig::default()
            },
            core,
        })
    }

    /// The address the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
