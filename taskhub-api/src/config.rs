/// Configuration management for the API server
///
/// Loaded from environment variables (a `.env` file is read first when
/// present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_RUN_MIGRATIONS`: Apply embedded migrations at startup (default: true)
/// - `JWT_SECRET_KEY`: HS256 signing secret, at least 32 characters (required)
/// - `JWT_LIFETIME_SECONDS`: Access token lifetime, at most one year (default: 3600)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `TASKS_VERIFY_OWNER`: Check the owner row before inserting a task (default: true)
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD`: Superuser created at startup when both are set
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskhub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;
use std::str::FromStr;

use taskhub_shared::models::task::OwnerPolicy;

/// Longest accepted access token lifetime (one year)
pub const MAX_JWT_LIFETIME_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub tasks: TasksConfig,

    /// Superuser bootstrap, if configured
    pub admin: Option<AdminConfig>,

    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in seconds
    pub lifetime_seconds: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish()
    }
}

/// Task persistence configuration
#[derive(Debug, Clone)]
pub struct TasksConfig {
    pub owner_policy: OwnerPolicy,
}

/// Superuser bootstrap credentials
#[derive(Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", name, other),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;
        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;
        let run_migrations = parse_bool(
            "DATABASE_RUN_MIGRATIONS",
            &var("DATABASE_RUN_MIGRATIONS", "true"),
        )?;

        let jwt_secret = lookup("JWT_SECRET_KEY")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET_KEY environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET_KEY must be at least 32 characters long");
        }
        let lifetime_seconds = var("JWT_LIFETIME_SECONDS", "3600")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_LIFETIME_SECONDS is invalid: {}", e))?;
        if !(1..=MAX_JWT_LIFETIME_SECONDS).contains(&lifetime_seconds) {
            anyhow::bail!(
                "JWT_LIFETIME_SECONDS must be between 1 and {}",
                MAX_JWT_LIFETIME_SECONDS
            );
        }

        let owner_policy = if parse_bool("TASKS_VERIFY_OWNER", &var("TASKS_VERIFY_OWNER", "true"))? {
            OwnerPolicy::Verify
        } else {
            OwnerPolicy::Trust
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminConfig { email, password }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        let log_format = var("LOG_FORMAT", "pretty").parse::<LogFormat>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                lifetime_seconds,
            },
            tasks: TasksConfig { owner_policy },
            admin,
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
