use serde::{Deserialize, Serialize};

use catalog_query::search::{CatalogItem, Condition, FilterPredicate};

/// 解析请求
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub query: String,
    /// 调用方的最高访问级别（由外部鉴权给出）
    #[serde(default)]
    pub max_access_level: Option<u32>,
}

/// 解析响应：条件 + 转换后的过滤谓词
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub conditions: Vec<Condition>,
    pub filter: FilterPredicate,
}

/// 搜索请求
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_access_level: Option<u32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub conditions: Vec<Condition>,
    pub items: Vec<CatalogItem>,
    pub total: u64,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self { conditions: Vec::new(), items: Vec::new(), total: 0 }
    }
}
