//! Search module - free-text query parsing and predicate translation / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Parser: text → `Condition[]`, pure apart from the injected clock
//! - Translator: `Condition[]` + base filter + access ceiling → `FilterPredicate`
//! - Storage only consumes the predicate (`db_index`)
//! - Call direction: parser → translator → storage (unidirectional) / 调用方向
//!
//! Query features / 查询特性：
//! - Year + issue/month, explicit month ranges, bare months and years
//! - Relative windows (最近N天/周/个月/年, 半年之内), 今年/去年
//! - Access levels (N级, N级以上, N级以下), category words, keyword residue

pub mod clock;
pub mod db_index;
pub mod filter;
pub mod query_parser;
pub mod schema;
pub mod tokenizer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db_index::{CatalogIndex, CatalogItem, NewCatalogItem};
pub use filter::{translate, Comparator, Field, FilterPredicate, FilterValue, Record};
pub use query_parser::{parse, QueryParser};
pub use schema::{Comparison, Condition, ConditionKey, ConditionValue, ParseError, ParseResult, PeriodSource, TimeCode};
