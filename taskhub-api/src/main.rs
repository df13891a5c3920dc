//! # TaskHub API Server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskhub \
//! JWT_SECRET_KEY=$(openssl rand -hex 32) \
//! cargo run -p taskhub-api
//! ```

use taskhub_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use taskhub_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, PoolConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskhub_api=debug,taskhub_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "TaskHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let mut pool_config = PoolConfig::new(config.database.url.clone());
    pool_config.max_connections = config.database.max_connections;
    let pool = create_pool(pool_config).await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let bind_address = config.bind_address();
    let admin = config.admin.clone();
    let state = AppState::new(pool.clone(), config);

    if let Some(admin) = admin {
        let user = state.users.ensure_superuser(&admin.email, &admin.password).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "Superuser ready");
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
