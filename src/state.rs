use catalog_query::config::CatalogConfig;
use catalog_query::search::{CatalogIndex, QueryParser};

/// Shared handler state / 共享状态
pub struct AppState {
    pub catalog: CatalogIndex,
    pub parser: QueryParser,
    pub catalog_config: CatalogConfig,
}
