use rusty_library_lending::{
    adapters::{
        memory::InMemoryLibrary,
        postgres::{PostgresCatalogStore, PostgresIdentityStore, PostgresLedger},
    },
    api::{handlers::AppState, router::create_router},
    application::{LendingSettings, ServiceDependencies},
    auth::TokenIssuer,
    config::AppConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let settings = LendingSettings::from(&config);

    let service_deps = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Using PostgreSQL store");

            // Initialize database connection pool
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .acquire_timeout(config.store_timeout.max(Duration::from_secs(1)))
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            ServiceDependencies {
                identity_store: Arc::new(PostgresIdentityStore::new(pool.clone())),
                catalog_store: Arc::new(PostgresCatalogStore::new(pool.clone())),
                ledger: Arc::new(PostgresLedger::new(pool)),
                settings,
            }
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using the in-memory store");

            let library = Arc::new(InMemoryLibrary::new());
            ServiceDependencies {
                identity_store: library.clone(),
                catalog_store: library.clone(),
                ledger: library,
                settings,
            }
        }
    };

    let token_issuer = TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_secs);

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        token_issuer,
    });

    // Create router
    let app = create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
