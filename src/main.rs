use axum::{
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use catalog_query::config;
use catalog_query::search::{CatalogIndex, QueryParser};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_query=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("catalog-query {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME"));

    // Load configuration / 加载配置
    let app_config = config::load_config()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    // DATABASE_URL overrides the configured file / 环境变量优先
    let catalog = match std::env::var("DATABASE_URL") {
        Ok(database_url) => CatalogIndex::new(SqlitePool::connect(&database_url).await?),
        Err(_) => CatalogIndex::open(&app_config.get_database_path())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open catalog database: {}", e))?,
    };
    catalog.init().await.map_err(|e| anyhow::anyhow!("Failed to init catalog schema: {}", e))?;

    let state = Arc::new(AppState {
        catalog,
        parser: QueryParser::default(),
        catalog_config: app_config.catalog.clone(),
    });

    let app = Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/api/search", post(api::search::search))
        .route("/api/search/parse", post(api::search::parse_query))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    state.catalog.close().await;

    Ok(())
}
