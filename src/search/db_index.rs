//! 目录索引数据库 - 将过滤谓词落到 SQLite
//!
//! 存储方案：
//! - catalog_items表：标题、描述、类别、时间码、访问级别、上架标记
//! - time_code 为 `YYYYPP` 六位整数，等值与范围比较都是整数比较
//! - 关键词匹配使用 LOWER(col) LIKE，不区分大小写
//!
//! 特性：
//! - WAL模式（并发安全）
//! - 谓词渲染为参数化SQL，列名只来自 `Field` 枚举

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

use super::filter::{Field, FilterPredicate, FilterValue, Record};

/// 目录条目
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    /// `YYYYPP` 时间码
    pub time_code: i64,
    pub access_level: i64,
    pub listed: bool,
}

/// 新建目录条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub time_code: i64,
    #[serde(default)]
    pub access_level: i64,
    #[serde(default = "default_listed")]
    pub listed: bool,
}

fn default_listed() -> bool {
    true
}

impl Record for CatalogItem {
    fn field(&self, field: Field) -> Option<FilterValue> {
        let value = match field {
            Field::TimeCode => FilterValue::Int(self.time_code),
            Field::AccessLevel => FilterValue::Int(self.access_level),
            Field::Title => FilterValue::Text(self.title.clone()),
            Field::Description => FilterValue::Text(self.description.clone()),
            Field::Category => FilterValue::Text(self.category.clone()),
            Field::Listed => FilterValue::Int(i64::from(self.listed)),
        };
        Some(value)
    }
}

/// 目录索引数据库
pub struct CatalogIndex {
    db: Pool<Sqlite>,
}

impl CatalogIndex {
    /// 使用现有数据库连接池
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 打开（或创建）独立的目录数据库（使用WAL模式）
    pub async fn open(db_path: &Path) -> Result<Self, String> {
        // 确保目录存在
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&db_url)
            .await
            .map_err(|e| e.to_string())?;

        // 启用WAL模式，提高并发性能
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&db)
            .await
            .map_err(|e| e.to_string())?;

        // 设置busy_timeout，避免锁超时
        sqlx::query("PRAGMA busy_timeout=5000")
            .execute(&db)
            .await
            .map_err(|e| e.to_string())?;

        tracing::info!("Catalog database opened: {:?} (WAL mode)", db_path);

        Ok(Self { db })
    }

    /// 关闭数据库连接池 / Close database connection pool
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// 初始化表结构，只在表不存在时创建
    pub async fn init(&self) -> Result<(), String> {
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS catalog_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                time_code INTEGER NOT NULL,
                access_level INTEGER NOT NULL DEFAULT 0,
                listed INTEGER NOT NULL DEFAULT 1
            )
        "#)
        .execute(&self.db)
        .await
        .map_err(|e| e.to_string())?;

        // 时间码和访问级别都有范围查询
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_catalog_time ON catalog_items(time_code)")
            .execute(&self.db)
            .await
            .map_err(|e| e.to_string())?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_catalog_level ON catalog_items(access_level)")
            .execute(&self.db)
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    /// 插入条目，返回新ID
    pub async fn insert_item(&self, item: &NewCatalogItem) -> Result<i64, String> {
        let result = sqlx::query(
            "INSERT INTO catalog_items (title, description, category, time_code, access_level, listed) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.time_code)
        .bind(item.access_level)
        .bind(item.listed)
        .execute(&self.db)
        .await
        .map_err(|e| e.to_string())?;

        Ok(result.last_insert_rowid())
    }

    /// 按谓词搜索，最新的时间码优先
    pub async fn search(&self, predicate: &FilterPredicate, limit: usize) -> Result<Vec<CatalogItem>, String> {
        let (where_sql, binds) = predicate.to_sql();
        let sql = format!(
            "SELECT id, title, description, category, time_code, access_level, listed \
             FROM catalog_items WHERE {} ORDER BY time_code DESC, id DESC LIMIT ?",
            where_sql
        );
        tracing::debug!("catalog search: {} {:?}", sql, binds);

        let mut query = sqlx::query_as::<_, CatalogItem>(&sql);
        for value in binds {
            query = match value {
                FilterValue::Int(n) => query.bind(n),
                FilterValue::Text(s) => query.bind(s),
            };
        }

        query
            .bind(limit as i64)
            .fetch_all(&self.db)
            .await
            .map_err(|e| e.to_string())
    }

    /// 统计满足谓词的条目数
    pub async fn count(&self, predicate: &FilterPredicate) -> Result<u64, String> {
        let (where_sql, binds) = predicate.to_sql();
        let sql = format!("SELECT COUNT(*) FROM catalog_items WHERE {}", where_sql);

        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        for value in binds {
            query = match value {
                FilterValue::Int(n) => query.bind(n),
                FilterValue::Text(s) => query.bind(s),
            };
        }

        let (count,) = query
            .fetch_one(&self.db)
            .await
            .map_err(|e| e.to_string())?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::translate;
    use crate::search::schema::{Comparison, Condition, TimeCode};

    async fn memory_index() -> CatalogIndex {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let index = CatalogIndex::new(pool);
        index.init().await.unwrap();
        index
    }

    fn item(title: &str, time_code: i64, access_level: i64, listed: bool) -> NewCatalogItem {
        NewCatalogItem {
            title: title.to_string(),
            description: String::new(),
            category: "杂志".to_string(),
            time_code,
            access_level,
            listed,
        }
    }

    #[tokio::test]
    async fn test_time_eq_returns_only_that_period() {
        let index = memory_index().await;
        for code in [202404, 202405, 202406, 202450] {
            index.insert_item(&item("意林", code, 0, true)).await.unwrap();
        }

        let conditions = vec![Condition::time(Comparison::Eq, TimeCode::issue(2024, 5))];
        let predicate = translate(&conditions, FilterPredicate::listed_only(), None);
        let hits = index.search(&predicate, 50).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].time_code, 202405);
    }

    #[tokio::test]
    async fn test_range_keywords_and_ceiling() {
        let index = memory_index().await;
        index.insert_item(&item("意林 2024", 202403, 1, true)).await.unwrap();
        index.insert_item(&item("意林 hidden", 202404, 1, false)).await.unwrap();
        index.insert_item(&item("意林 secret", 202405, 5, true)).await.unwrap();
        index.insert_item(&item("读者", 202405, 1, true)).await.unwrap();
        index.insert_item(&item("意林 2023", 202312, 1, true)).await.unwrap();

        let conditions = vec![
            Condition::time(Comparison::Gte, TimeCode::month(2024, 1)),
            Condition::time(Comparison::Lte, TimeCode::month(2024, 12)),
            Condition::keywords("意林"),
        ];
        let predicate = translate(&conditions, FilterPredicate::listed_only(), Some(3));
        let hits = index.search(&predicate, 50).await.unwrap();

        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["意林 2024"]);
        assert_eq!(index.count(&predicate).await.unwrap(), 1);
        assert!(hits.iter().all(|h| predicate.matches(h)));
    }

    #[tokio::test]
    async fn test_keyword_case_insensitive() {
        let index = memory_index().await;
        let mut reader = item("Reader's Digest", 202401, 0, true);
        reader.description = "monthly".to_string();
        index.insert_item(&reader).await.unwrap();

        let predicate = translate(&[Condition::keywords("READER")], FilterPredicate::always(), None);
        assert_eq!(index.search(&predicate, 10).await.unwrap().len(), 1);

        let predicate = translate(&[Condition::keywords("MONTH")], FilterPredicate::always(), None);
        assert_eq!(index.search(&predicate, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_file_database_in_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        let index = CatalogIndex::open(&path).await.unwrap();
        index.init().await.unwrap();
        assert!(path.exists());

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&index.db)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        index.insert_item(&item("意林", 202405, 0, true)).await.unwrap();
        assert_eq!(index.count(&FilterPredicate::always()).await.unwrap(), 1);
        index.close().await;
    }

    #[tokio::test]
    async fn test_limit_and_order() {
        let index = memory_index().await;
        for code in [202401, 202403, 202402] {
            index.insert_item(&item("意林", code, 0, true)).await.unwrap();
        }
        let hits = index.search(&FilterPredicate::always(), 2).await.unwrap();
        let codes: Vec<i64> = hits.iter().map(|h| h.time_code).collect();
        assert_eq!(codes, vec![202403, 202402]);
    }
}
