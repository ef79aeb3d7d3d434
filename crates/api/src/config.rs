use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout for endpoints that call the generator inline, such as
    /// `POST /roadmap/create` (default: `300`). Should cover two provider
    /// calls, since a non-conformant reply triggers one repair request.
    pub generation_request_timeout_secs: u64,
    /// How long to wait for generation workers after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `GENERATION_REQUEST_TIMEOUT_SECS` | `300`           |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
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

        let generation_request_timeout_secs: u64 =
            std::env::var("GENERATION_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .expect("GENERATION_REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation_request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            generation: GenerationConfig::from_env(),
        }
    }
}

/// Default pause between chapter expansions.
const DEFAULT_THROTTLE_SECS: u64 = 20;
const DEFAULT_WORKERS: usize = 1;
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Course generation worker settings.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Fixed delay between successive chapter-expansion calls of one course.
    pub throttle: Duration,
    /// Number of concurrent generation workers. Each worker throttles only
    /// itself, so the aggregate request rate grows with this number.
    pub workers: usize,
    /// Jobs that may wait in the queue before submissions are rejected.
    pub queue_capacity: usize,
}

impl GenerationConfig {
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `GENERATION_THROTTLE_SECS`  | `20`    |
    /// | `GENERATION_WORKERS`        | `1`     |
    /// | `GENERATION_QUEUE_CAPACITY` | `64`    |
    pub fn from_env() -> Self {
        let throttle_secs: u64 = std::env::var("GENERATION_THROTTLE_SECS")
            .unwrap_or_else(|_| DEFAULT_THROTTLE_SECS.to_string())
            .parse()
            .expect("GENERATION_THROTTLE_SECS must be a valid u64");

        let workers: usize = std::env::var("GENERATION_WORKERS")
            .unwrap_or_else(|_| DEFAULT_WORKERS.to_string())
            .parse()
            .expect("GENERATION_WORKERS must be a valid usize");
        assert!(workers > 0, "GENERATION_WORKERS must be at least 1");

        let queue_capacity: usize = std::env::var("GENERATION_QUEUE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_QUEUE_CAPACITY.to_string())
            .parse()
            .expect("GENERATION_QUEUE_CAPACITY must be a valid usize");

        Self {
            throttle: Duration::from_secs(throttle_secs),
            workers,
            queue_capacity,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_secs(DEFAULT_THROTTLE_SECS),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
