/// PostgreSQL connection pool management
///
/// Each repository call checks a connection out of this pool for the duration
/// of one statement (or one transaction) and returns it when the call
/// finishes, whether it succeeded or not.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pool tuning knobs
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Idle connections kept warm
    pub min_connections: u32,

    /// How long a caller waits for a free connection (seconds)
    pub acquire_timeout_seconds: u64,

    /// Idle connections older than this are closed (seconds)
    pub idle_timeout_seconds: Option<u64>,
}

impl PoolConfig {
    /// Creates a config for `url` with default tuning
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
        }
    }
}

/// Creates the pool and verifies the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the server is unreachable or the
/// health check fails.
pub async fn create_pool(config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds));

    if let Some(idle) = config.idle_timeout_seconds {
        options = options.idle_timeout(Duration::from_secs(idle));
    }

    let pool = options.connect(&config.url).await?;
    health_check(&pool).await?;

    info!("Database connection pool ready");
    Ok(pool)
}

/// Runs `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (value,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if value != 1 {
        warn!(value, "Database health check returned unexpected value");
        return Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ));
    }

    debug!("Database health check passed");
    Ok(())
}

/// Closes every connection; called once on shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
