//! # UserDir API Server
//!
//! Multi-tenant user directory over HTTP: listing, login, registration, role
//! changes, lookup and deletion, scoped by organization.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/userdir cargo run -p userdir-api
//! STORE=memory cargo run -p userdir-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userdir_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StoreBackend},
};
use userdir_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use userdir_shared::store::{MemoryUserStore, PgUserStore, UserStore};

const DEFAULT_LOG_FILTER: &str = "userdir_api=debug,userdir_shared=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        store = config.store.as_str(),
        "UserDir API server starting"
    );

    let (store, pool) = match config.store {
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("STORE=postgres requires database configuration")?;

            let pool = create_pool(DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                connect_timeout_seconds: database.connect_timeout_seconds,
                ..Default::default()
            })
            .await
            .context("Failed to connect to the database")?;

            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            (store, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
            (store, None)
        }
    };

    let bind_address = config.bind_address();
    let bootstrap = config.bootstrap.clone();
    let state = AppState::new(store, config);

    if let Some(admin) = bootstrap {
        if let Some(created) = state.directory.bootstrap_admin(admin).await? {
            // The only time this key is ever visible
            tracing::warn!(
                user_id = created.user.id,
                org_id = created.user.org_id,
                username = %created.user.username,
                api_key = %created.api_key,
                "Created bootstrap admin; store this api_key now"
            );
        }
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
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
