//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::AnyPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::cache::{self, CacheStore};
use crate::infrastructure::database;
use crate::infrastructure::registry::ServiceRegistry;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: AnyPool,
    pub cache: Arc<CacheStore>,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub registry: Arc<ServiceRegistry>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Assemble state over an existing pool and cache.
    pub fn new(db: AnyPool, cache: CacheStore, settings: Settings) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id,
            settings.snowflake.epoch,
        ));
        let registry = ServiceRegistry::with_default_services(
            db.clone(),
            snowflake.clone(),
            settings.jwt.clone(),
        );

        Self {
            db,
            cache: Arc::new(cache),
            snowflake,
            registry: Arc::new(registry),
            settings: Arc::new(settings),
        }
    }
}

/// Router with tracing and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database)
            .await
            .context("failed to create database pool")?;
        tracing::info!(
            provider = settings.database.provider().map(|p| p.as_str()).unwrap_or("unknown"),
            "Database connection pool created"
        );

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let cache = cache::create_cache(&settings.cache)
            .await
            .context("failed to create cache backend")?;
        tracing::info!(backend = ?cache.backend(), "Cache backend ready");

        let addr = settings.server_addr();
        let state = AppState::new(db, cache, settings);
        let router = build_router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
