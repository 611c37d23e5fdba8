//! Parsed query condition types / 查询条件类型定义

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// What a condition constrains / 条件字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKey {
    Time,
    AccessLevel,
    Keywords,
    Type,
}

/// Comparison semantics / 比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Gte,
    Lte,
}

/// Which rule family produced the period of a time code / 时间码周期来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
    /// Calendar month 1..=12 / 月份
    Month,
    /// Periodical issue number / 期号
    Issue,
}

/// Year + period time code, compared as the integer `YYYYPP` / 时间码
///
/// Month and issue share the period slot; consumers only see `code()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCode {
    pub year: i32,
    pub period: u32,
    pub source: PeriodSource,
}

impl TimeCode {
    pub fn month(year: i32, month: u32) -> Self {
        Self { year, period: month, source: PeriodSource::Month }
    }

    pub fn issue(year: i32, issue: u32) -> Self {
        Self { year, period: issue, source: PeriodSource::Issue }
    }

    /// Integer form `YYYY * 100 + period` / 整数时间码
    pub fn code(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.period)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.year, self.period)
    }
}

impl Serialize for TimeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Condition payload / 条件值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Time(TimeCode),
    Level(u32),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Time(code) => write!(f, "{}", code),
            ConditionValue::Level(level) => write!(f, "{}", level),
            ConditionValue::Text(text) => f.write_str(text),
        }
    }
}

/// One typed unit of parsed intent / 查询条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub key: ConditionKey,
    pub opt: Comparison,
    pub value: ConditionValue,
}

impl Condition {
    pub fn time(opt: Comparison, code: TimeCode) -> Self {
        Self { key: ConditionKey::Time, opt, value: ConditionValue::Time(code) }
    }

    pub fn access_level(opt: Comparison, level: u32) -> Self {
        Self { key: ConditionKey::AccessLevel, opt, value: ConditionValue::Level(level) }
    }

    pub fn keywords(text: impl Into<String>) -> Self {
        Self {
            key: ConditionKey::Keywords,
            opt: Comparison::Eq,
            value: ConditionValue::Text(text.into()),
        }
    }

    pub fn category(text: impl Into<String>) -> Self {
        Self {
            key: ConditionKey::Type,
            opt: Comparison::Eq,
            value: ConditionValue::Text(text.into()),
        }
    }

    /// Time code, if this is a time condition
    pub fn time_code(&self) -> Option<&TimeCode> {
        match &self.value {
            ConditionValue::Time(code) => Some(code),
            _ => None,
        }
    }
}

/// Parse failure / 解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no valid query condition could be parsed")]
    Unparseable,
}

/// Ordered conditions, or `Unparseable` / 解析结果
pub type ParseResult = Result<Vec<Condition>, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_code_zero_padding() {
        assert_eq!(TimeCode::issue(2024, 5).to_string(), "202405");
        assert_eq!(TimeCode::month(2024, 12).to_string(), "202412");
        assert_eq!(TimeCode::issue(2024, 5).code(), 202405);
    }

    #[test]
    fn test_condition_serializes_flat() {
        let cond = Condition::time(Comparison::Gte, TimeCode::month(2024, 1));
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json, serde_json::json!({"key": "time", "opt": "gte", "value": "202401"}));

        let cond = Condition::access_level(Comparison::Eq, 3);
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["value"], serde_json::json!(3));
    }

    #[test]
    fn test_unparseable_message() {
        assert_eq!(
            ParseError::Unparseable.to_string(),
            "no valid query condition could be parsed"
        );
    }
}
