use std::error::Error;
use std::sync::Arc;

use storefront_api::{
    auth::{MemoryUserStore, PasswordService, PgUserStore, UserStore},
    config::Config,
    create_router, db,
    products::{MemoryProductStore, PgProductStore, ProductStore},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_api=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(e) = run().await {
        tracing::error!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    tracing::info!("Storefront API - Starting...");

    // A missing JWT_SECRET stops the process here
    let config = Config::from_env()?;

    let (users, products): (Arc<dyn UserStore>, Arc<dyn ProductStore>) =
        match config.database_url.as_deref() {
            Some(database_url) => {
                tracing::info!("Connecting to database...");
                let pool = db::create_pool(database_url).await?;
                db::run_migrations(&pool).await?;
                (
                    Arc::new(PgUserStore::new(pool.clone())),
                    Arc::new(PgProductStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
                (
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(MemoryProductStore::default()),
                )
            }
        };

    let state = AppState::new(&config.jwt, users, products, PasswordService::default())?;
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Storefront API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
