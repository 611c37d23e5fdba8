//! Condition translator / 条件转换
//!
//! Combines parsed [`Condition`]s, a caller-supplied base filter and an
//! optional access-level ceiling into one conjunctive [`FilterPredicate`].
//! The predicate can be rendered as a parameterized SQL `WHERE` fragment or
//! evaluated in memory against a [`Record`].

use serde::{Deserialize, Serialize};

use super::schema::{Comparison, Condition, ConditionKey, ConditionValue};

/// Filterable catalog fields / 可过滤字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TimeCode,
    AccessLevel,
    Title,
    Description,
    Category,
    Listed,
}

impl Field {
    /// Column name in `catalog_items` / 对应数据库列
    pub fn column(&self) -> &'static str {
        match self {
            Field::TimeCode => "time_code",
            Field::AccessLevel => "access_level",
            Field::Title => "title",
            Field::Description => "description",
            Field::Category => "category",
            Field::Listed => "listed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Eq,
    Gte,
    Lte,
    /// Case-insensitive substring match / 不区分大小写的子串匹配
    Contains,
}

impl From<Comparison> for Comparator {
    fn from(opt: Comparison) -> Self {
        match opt {
            Comparison::Eq => Comparator::Eq,
            Comparison::Gte => Comparator::Gte,
            Comparison::Lte => Comparator::Lte,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

/// Predicate tree understood by the storage layer / 过滤谓词树
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPredicate {
    Leaf {
        field: Field,
        comparator: Comparator,
        value: FilterValue,
    },
    And(Vec<FilterPredicate>),
    Or(Vec<FilterPredicate>),
}

/// Row that a predicate can be evaluated against / 可被谓词求值的记录
pub trait Record {
    fn field(&self, field: Field) -> Option<FilterValue>;
}

impl FilterPredicate {
    pub fn leaf(field: Field, comparator: Comparator, value: FilterValue) -> Self {
        FilterPredicate::Leaf { field, comparator, value }
    }

    /// Matches everything (empty conjunction) / 恒真
    pub fn always() -> Self {
        FilterPredicate::And(Vec::new())
    }

    /// Base filter excluding unlisted/withdrawn items / 只包含上架条目
    pub fn listed_only() -> Self {
        Self::leaf(Field::Listed, Comparator::Eq, FilterValue::Int(1))
    }

    /// Render as a SQL fragment with `?` placeholders and ordered binds / 生成SQL条件
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut binds = Vec::new();
        let sql = self.write_sql(&mut binds);
        (sql, binds)
    }

    fn write_sql(&self, binds: &mut Vec<FilterValue>) -> String {
        match self {
            FilterPredicate::Leaf { field, comparator, value } => {
                let column = field.column();
                match comparator {
                    Comparator::Contains => {
                        let needle = match value {
                            FilterValue::Text(text) => text.to_lowercase(),
                            FilterValue::Int(n) => n.to_string(),
                        };
                        binds.push(FilterValue::Text(format!("%{}%", escape_like(&needle))));
                        format!("LOWER({}) LIKE ? ESCAPE '\\'", column)
                    }
                    cmp => {
                        binds.push(value.clone());
                        let op = match cmp {
                            Comparator::Gte => ">=",
                            Comparator::Lte => "<=",
                            _ => "=",
                        };
                        format!("{} {} ?", column, op)
                    }
                }
            }
            FilterPredicate::And(children) => join_sql(children, " AND ", "1 = 1", binds),
            FilterPredicate::Or(children) => join_sql(children, " OR ", "1 = 0", binds),
        }
    }

    /// Evaluate against an in-memory record / 内存求值
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            FilterPredicate::Leaf { field, comparator, value } => match (record.field(*field), value) {
                (Some(FilterValue::Int(actual)), FilterValue::Int(expected)) => match comparator {
                    Comparator::Eq => actual == *expected,
                    Comparator::Gte => actual >= *expected,
                    Comparator::Lte => actual <= *expected,
                    Comparator::Contains => actual.to_string().contains(&expected.to_string()),
                },
                (Some(FilterValue::Text(actual)), FilterValue::Text(expected)) => match comparator {
                    Comparator::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
                    Comparator::Eq => actual == *expected,
                    Comparator::Gte => actual.as_str() >= expected.as_str(),
                    Comparator::Lte => actual.as_str() <= expected.as_str(),
                },
                _ => false,
            },
            FilterPredicate::And(children) => children.iter().all(|p| p.matches(record)),
            FilterPredicate::Or(children) => children.iter().any(|p| p.matches(record)),
        }
    }
}

fn join_sql(children: &[FilterPredicate], sep: &str, empty: &str, binds: &mut Vec<FilterValue>) -> String {
    if children.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = children.iter().map(|c| c.write_sql(binds)).collect();
    format!("({})", parts.join(sep))
}

/// Escape `%`, `_` and `\` for a LIKE pattern / 转义LIKE通配符
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Translate parsed conditions into one conjunctive predicate / 将条件转换为过滤谓词
///
/// - every `Time` condition becomes a bound on `time_code`
/// - the last `AccessLevel` condition wins
/// - `Keywords` match title OR description by substring
/// - `Type` conditions produce nothing
///
/// `max_access_level` is always ANDed as an extra `access_level <= max`
/// clause, so a parsed access-level bound and the ceiling both apply.
pub fn translate(conditions: &[Condition], base_filter: FilterPredicate, max_access_level: Option<u32>) -> FilterPredicate {
    let mut time_clauses = Vec::new();
    let mut access_clause = None;
    let mut keyword_clauses = Vec::new();

    for cond in conditions {
        match (cond.key, &cond.value) {
            (ConditionKey::Time, ConditionValue::Time(code)) => {
                time_clauses.push(FilterPredicate::leaf(
                    Field::TimeCode,
                    cond.opt.into(),
                    FilterValue::Int(code.code()),
                ));
            }
            (ConditionKey::AccessLevel, ConditionValue::Level(level)) => {
                access_clause = Some(FilterPredicate::leaf(
                    Field::AccessLevel,
                    cond.opt.into(),
                    FilterValue::Int(i64::from(*level)),
                ));
            }
            (ConditionKey::Keywords, ConditionValue::Text(text)) => {
                keyword_clauses.push(FilterPredicate::Or(vec![
                    FilterPredicate::leaf(Field::Title, Comparator::Contains, FilterValue::Text(text.clone())),
                    FilterPredicate::leaf(Field::Description, Comparator::Contains, FilterValue::Text(text.clone())),
                ]));
            }
            (ConditionKey::Type, _) => {
                tracing::trace!("category condition {} not translated", cond.value);
            }
            (key, value) => {
                tracing::warn!("condition {:?} carries mismatched value {:?}, skipped", key, value);
            }
        }
    }

    let mut clauses = match base_filter {
        FilterPredicate::And(children) => children,
        other => vec![other],
    };
    clauses.extend(time_clauses);
    clauses.extend(access_clause);
    clauses.extend(keyword_clauses);

    if let Some(max) = max_access_level {
        clauses.push(FilterPredicate::leaf(
            Field::AccessLevel,
            Comparator::Lte,
            FilterValue::Int(i64::from(max)),
        ));
    }

    let predicate = FilterPredicate::And(clauses);
    tracing::debug!("translated {} conditions into {:?}", conditions.len(), predicate);
    predicate
}
