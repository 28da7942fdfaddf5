use std::sync::Arc;

use folio_api::auth::HttpIdentityProvider;
use folio_api::cache::PathRevalidator;
use folio_api::config::AppConfig;
use folio_api::database::contact::PgContactMessages;
use folio_api::database::portfolio::PgPortfolio;
use folio_api::database::profiles::PgProfiles;
use folio_api::database::templates::PgTemplates;
use folio_api::database::tutorials::PgTutorials;
use folio_api::state::AppState;
use folio_api::storage::HttpObjectStorage;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, PLATFORM_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Starting Folio API in {:?} mode", config.environment);

    let pool = match folio_api::database::connect_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        identity: Arc::new(HttpIdentityProvider::new(&config.platform)),
        storage: Arc::new(HttpObjectStorage::new(&config.platform)),
        profiles: Arc::new(PgProfiles::new(pool.clone())),
        cache: Arc::new(PathRevalidator::new()),
        health: Arc::new(pool.clone()),
        contact: Arc::new(PgContactMessages::new(pool.clone())),
        portfolio: Arc::new(PgPortfolio::new(pool.clone())),
        templates: Arc::new(PgTemplates::new(pool.clone())),
        tutorials: Arc::new(PgTutorials::new(pool)),
        config: Arc::new(config.clone()),
    };

    let app = folio_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Folio API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
