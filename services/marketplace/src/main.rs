use sea_orm::Database;
use tracing::info;

use learnhub_core::tracing::init_tracing;
use learnhub_marketplace::config::MarketplaceConfig;
use learnhub_marketplace::router::build_router;
use learnhub_marketplace::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketplaceConfig::from_env();
    let port = config.port;

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let http = reqwest::Client::builder()
        .user_agent(concat!("learnhub-marketplace/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("failed to create upload directory");

    let state = AppState::new(config, db, http);
    let router = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("marketplace service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
