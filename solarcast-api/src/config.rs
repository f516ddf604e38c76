/// Configuration management for the API server
///
/// Everything secret or deployment-specific comes from the environment
/// (optionally seeded from a `.env` file). Nothing secret has a default.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:3001`)
/// - `CORS_ORIGINS`: comma separated origins, `*` for any (default `*`)
/// - `PRODUCTION`: `true` enables HSTS (default `false`)
/// - `DATABASE_URL`: PostgreSQL URL; unset runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `JWT_TTL_HOURS`: token lifetime, 1 to 87600 hours; unset issues tokens
///   without expiry
/// - `WEATHER_API_KEY`: weatherapi.com key (required)
/// - `WEATHER_API_BASE_URL`: provider base URL
/// - `WEATHER_TIMEOUT_SECONDS`: upstream request timeout (default 10)
/// - `LOG_FORMAT`: `pretty` or `json` (default `pretty`)
///
/// # Example
///
/// ```no_run
/// use solarcast_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use solarcast_shared::weather::client::DEFAULT_BASE_URL;
use std::env;

/// Longest accepted token lifetime (ten years)
pub const MAX_TTL_HOURS: i64 = 87_600;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Upstream weather provider
    pub weather: WeatherConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` = any)
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing, at least 32 bytes
    pub secret: String,

    /// Token lifetime in hours; `None` means tokens never expire
    pub ttl_hours: Option<i64>,
}

/// Weather provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// `from_env` uses the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_port = get("API_PORT", "3001").parse::<u16>()?;

        let cors_origins = get("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = get("PRODUCTION", "false").parse::<bool>()?;

        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: get("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?,
            }),
            None => None,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(raw) => {
                let hours = raw.parse::<i64>()?;
                if !(1..=MAX_TTL_HOURS).contains(&hours) {
                    anyhow::bail!(
                        "JWT_TTL_HOURS must be between 1 and {}, got {}",
                        MAX_TTL_HOURS,
                        hours
                    );
                }
                Some(hours)
            }
            None => None,
        };

        let weather_api_key = lookup("WEATHER_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow::anyhow!("WEATHER_API_KEY environment variable is required"))?;

        let log_format = match get("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        Ok(Self {
            api: ApiConfig {
                host: get("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins,
                production,
            },
            database,
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours,
            },
            weather: WeatherConfig {
                api_key: weather_api_key,
                base_url: get("WEATHER_API_BASE_URL", DEFAULT_BASE_URL),
                timeout_seconds: get("WEATHER_TIMEOUT_SECONDS", "10").parse::<u64>()?,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token lifetime as a duration, if configured
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        self.jwt.ttl_hours.and_then(chrono::Duration::try_hours)
    }
}
