/// Database layer for TaskHub
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool creation, health check and shutdown
/// - `migrations`: Embedded schema migrations applied at startup
///
/// The pool is created once by the binary and handed down to every
/// component that needs it; nothing in this crate holds a global handle.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::db::{migrations::run_migrations, pool::{create_pool, PoolConfig}};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;
