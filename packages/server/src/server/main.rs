// Main entry point for the dispatch route server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatch_core::domains::auth::{AuthService, JwtService, PgAdminStore};
use dispatch_core::domains::migration::{MigrationRunner, PgJobStore, RunnerConfig};
use dispatch_core::domains::routes::{PgRouteStore, SearchService, SyncService};
use dispatch_core::kernel::{start_scheduler, DaesinCrawler, MemoryCache};
use dispatch_core::server::{build_app, AppState};
use dispatch_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dispatch_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dispatch route server");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire stores and services
    let routes = Arc::new(PgRouteStore::new(pool.clone()));
    let jobs = Arc::new(PgJobStore::new(pool.clone()));
    let admins = Arc::new(PgAdminStore::new(pool.clone()));
    let crawler = Arc::new(DaesinCrawler::new(config.crawler_base_url.clone()));
    let cache = Arc::new(MemoryCache::new());
    let jwt = Arc::new(JwtService::new(&config.jwt_secret));

    let search = Arc::new(SearchService::new(routes.clone(), cache.clone()));
    let sync = Arc::new(SyncService::new(
        crawler.clone(),
        routes.clone(),
        cache.clone(),
    ));
    let auth = Arc::new(AuthService::new(admins, jwt.clone()));
    let runner = Arc::new(MigrationRunner::new(
        jobs,
        crawler,
        routes,
        RunnerConfig {
            day_delay: Duration::from_millis(config.migration_day_delay_ms),
        },
    ));

    // Initial sync, off the startup path
    let startup_sync = sync.clone();
    tokio::spawn(async move {
        match startup_sync.execute(None).await {
            Ok(result) => tracing::info!(
                date = %result.date,
                count = result.count,
                "Startup sync complete"
            ),
            Err(e) => tracing::warn!("Startup sync failed: {}", e),
        }
    });

    let mut scheduler = start_scheduler(sync.clone())
        .await
        .context("Failed to start scheduler")?;

    let state = AppState {
        db_pool: Some(pool),
        search,
        sync,
        auth,
        runner: runner.clone(),
        jwt,
    };
    let app = build_app(state, config.api_key.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    // Let an in-flight migration day finish before the process exits
    runner.shutdown().await;
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }
    tracing::info!("Server stopped");

    Ok(())
}
