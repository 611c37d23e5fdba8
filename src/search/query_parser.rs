//! Free-text query parser / 自由文本查询解析器
//!
//! Turns a mixed Chinese/English phrase such as `2024年第10期3级以上意林`
//! into typed [`Condition`]s / 将自由文本解析为结构化条件
//!
//! Every rule is a pure step `(&str) -> Option<Extraction>`: on a match it
//! returns the produced conditions and the residual text with the matched
//! span replaced by a single space. [`QueryParser::parse`] threads the
//! residual through the rules in a fixed order, with early returns once the
//! residual is exhausted.

use std::ops::Range;
use std::sync::Arc;

use chrono::{Datelike, Duration, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::clock::{Clock, SystemClock};
use super::schema::{Comparison, Condition, ParseError, ParseResult, TimeCode};
use super::tokenizer::{is_range_separator, normalize, parse_count, strip_stop_words, CATEGORY_WORDS};

/// `2024年第10期`, `2024年5月`, `202410期`
static YEAR_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})年?第?([0-9]{1,2})(期|月份?)").expect("valid year-period regex"));

/// `2024年3月-2024年5月`, `2024年3-5月`, `2023年11月至2024年2月`
static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})年([0-9]{1,2})月?(?:-|－|~|～|—|至|到)(?:([0-9]{4})年)?([0-9]{1,2})月")
        .expect("valid time range regex")
});

/// `5月`, `11月份`
static BARE_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})月份?").expect("valid bare month regex"));

/// `202410` (normalized from `2024 10`)
static NUMERIC_SHORTHAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})([0-9]{1,2})").expect("valid shorthand regex"));

/// `第10期`, `3期`
static ISSUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"第?([0-9]{1,2})期").expect("valid issue regex"));

/// Any explicit `YYYY年` marker / 年份标记
static YEAR_MARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}年").expect("valid year mark regex"));

static NAMED_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"去年|今年").expect("valid named year regex"));

/// `最近3个月`, `最近两周`, `半年之内`
static RELATIVE_WINDOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"最近([0-9]+|[一二两三四五六七八九十])(天|周|个月|月|年)|半年之?内")
        .expect("valid relative window regex")
});

static BARE_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})(年)?").expect("valid bare year regex"));

/// Month or issue number right after `YYYY年`
static PERIOD_AFTER_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第?[0-9]{1,2}(期|月)").expect("valid period-after-year regex"));

/// `3级`, `3级以上`, `5级以下`
static ACCESS_LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)级(以上|以下)?").expect("valid access level regex"));

/// Result of one matching rule / 单条规则的匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub conditions: Vec<Condition>,
    /// Residual text with the matched span replaced by a space / 剩余文本
    pub rest: String,
}

impl Extraction {
    fn new(conditions: Vec<Condition>, text: &str, span: Range<usize>) -> Self {
        Self { conditions, rest: cut(text, span) }
    }
}

/// Replace a byte span with a single space / 用空格替换匹配片段
fn cut(text: &str, span: Range<usize>) -> String {
    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..span.start]);
    rest.push(' ');
    rest.push_str(&text[span.end..]);
    rest
}

fn char_before(text: &str, idx: usize) -> Option<char> {
    text[..idx].chars().next_back()
}

fn char_after(text: &str, idx: usize) -> Option<char> {
    text[idx..].chars().next()
}

fn preceded_by_digit(text: &str, idx: usize) -> bool {
    char_before(text, idx).is_some_and(|c| c.is_ascii_digit())
}

/// Capture group as a number, `None` on overflow
fn capture_num<T: std::str::FromStr>(caps: &Captures<'_>, group: usize) -> Option<T> {
    caps.get(group).and_then(|m| m.as_str().parse::<T>().ok())
}

fn is_month(n: u32) -> bool {
    (1..=12).contains(&n)
}

/// January..December of one year / 全年范围
fn whole_year(year: i32) -> Vec<Condition> {
    vec![
        Condition::time(Comparison::Gte, TimeCode::month(year, 1)),
        Condition::time(Comparison::Lte, TimeCode::month(year, 12)),
    ]
}

/// Rule 1: year + issue/month / 年份+期号或月份
pub fn extract_year_period(text: &str) -> Option<Extraction> {
    for caps in YEAR_PERIOD_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if char_before(text, m.start()).is_some_and(|c| c.is_ascii_digit() || is_range_separator(c)) {
            continue;
        }
        if char_after(text, m.end()).is_some_and(is_range_separator) {
            continue;
        }
        let (Some(year), Some(period)) = (capture_num::<i32>(&caps, 1), capture_num::<u32>(&caps, 2)) else {
            continue;
        };

        let code = if caps[3].starts_with('月') {
            if !is_month(period) {
                continue;
            }
            TimeCode::month(year, period)
        } else {
            if period == 0 {
                continue;
            }
            TimeCode::issue(year, period)
        };

        return Some(Extraction::new(vec![Condition::time(Comparison::Eq, code)], text, m.range()));
    }
    None
}

/// Rule 2: explicit month range / 明确的时间范围
pub fn extract_time_range(text: &str) -> Option<Extraction> {
    for caps in TIME_RANGE_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if preceded_by_digit(text, m.start()) {
            continue;
        }
        let (Some(start_year), Some(start_month), Some(end_month)) = (
            capture_num::<i32>(&caps, 1),
            capture_num::<u32>(&caps, 2),
            capture_num::<u32>(&caps, 4),
        ) else {
            continue;
        };
        // 第二个端点缺少年份时沿用第一个
        let end_year = capture_num::<i32>(&caps, 3).unwrap_or(start_year);
        if !is_month(start_month) || !is_month(end_month) {
            continue;
        }

        let conditions = vec![
            Condition::time(Comparison::Gte, TimeCode::month(start_year, start_month)),
            Condition::time(Comparison::Lte, TimeCode::month(end_year, end_month)),
        ];
        return Some(Extraction::new(conditions, text, m.range()));
    }
    None
}

/// Rule 3: month of the current year / 当年的月份
pub fn extract_bare_month(text: &str, today: NaiveDate) -> Option<Extraction> {
    for caps in BARE_MONTH_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if char_before(text, m.start()).is_some_and(|c| c.is_ascii_digit() || is_range_separator(c)) {
            continue;
        }
        if char_after(text, m.end()).is_some_and(is_range_separator) {
            continue;
        }
        // `最近3月` belongs to the relative window rule
        if text[..m.start()].ends_with("最近") {
            continue;
        }
        let Some(month) = capture_num::<u32>(&caps, 1).filter(|n| is_month(*n)) else {
            continue;
        };

        let code = TimeCode::month(today.year(), month);
        return Some(Extraction::new(vec![Condition::time(Comparison::Eq, code)], text, m.range()));
    }
    None
}

/// Rule 4: `YYYY NN` shorthand without any unit / 无单位的年份+期号简写
pub fn extract_numeric_shorthand(text: &str) -> Option<Extraction> {
    for caps in NUMERIC_SHORTHAND_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if preceded_by_digit(text, m.start()) {
            continue;
        }
        if char_after(text, m.end())
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '年' | '月' | '期') || is_range_separator(c))
        {
            continue;
        }
        let (Some(year), Some(period)) = (capture_num::<i32>(&caps, 1), capture_num::<u32>(&caps, 2)) else {
            continue;
        };
        if period == 0 {
            continue;
        }

        let code = TimeCode::issue(year, period);
        return Some(Extraction::new(vec![Condition::time(Comparison::Eq, code)], text, m.range()));
    }
    None
}

/// Rule 5: issue number of the current year / 当年期号
///
/// Defers to rule 10 whenever the text still carries a `YYYY年` marker.
pub fn extract_issue(text: &str, today: NaiveDate) -> Option<Extraction> {
    if YEAR_MARK_RE.is_match(text) {
        return None;
    }
    for caps in ISSUE_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if preceded_by_digit(text, m.start()) {
            continue;
        }
        let Some(issue) = capture_num::<u32>(&caps, 1).filter(|n| *n > 0) else {
            continue;
        };

        let code = TimeCode::issue(today.year(), issue);
        return Some(Extraction::new(vec![Condition::time(Comparison::Eq, code)], text, m.range()));
    }
    None
}

/// Rule 6: `去年` / `今年`
pub fn extract_named_year(text: &str, today: NaiveDate) -> Option<Extraction> {
    let m = NAMED_YEAR_RE.find(text)?;
    let year = match m.as_str() {
        "去年" => today.year() - 1,
        _ => today.year(),
    };
    Some(Extraction::new(whole_year(year), text, m.range()))
}

/// Rule 7: `最近 N 天/周/个月/年` and `半年之内` / 相对时间窗口
pub fn extract_relative_window(text: &str, today: NaiveDate) -> Option<Extraction> {
    let caps = RELATIVE_WINDOW_RE.captures(text)?;
    let m = caps.get(0)?;

    let Some(count) = caps.get(1) else {
        // 半年之内：只有下界
        let since = today.checked_sub_months(Months::new(6))?;
        let conditions = vec![Condition::time(
            Comparison::Gte,
            TimeCode::month(since.year(), since.month()),
        )];
        return Some(Extraction::new(conditions, text, m.range()));
    };

    let n = parse_count(count.as_str())?;
    let since = match caps.get(2).map(|u| u.as_str()) {
        Some("天") => today.checked_sub_signed(Duration::days(i64::from(n)))?,
        Some("周") => today.checked_sub_signed(Duration::weeks(i64::from(n)))?,
        Some("年") => today.checked_sub_months(Months::new(n.checked_mul(12)?))?,
        _ => today.checked_sub_months(Months::new(n))?,
    };

    let conditions = vec![
        Condition::time(Comparison::Gte, TimeCode::month(since.year(), since.month())),
        Condition::time(Comparison::Lte, TimeCode::month(today.year(), today.month())),
    ];
    Some(Extraction::new(conditions, text, m.range()))
}

/// Rule 8: category words / 类别词
pub fn extract_category(text: &str) -> Option<Extraction> {
    let mut conditions = Vec::new();
    let mut rest = text.to_string();
    for word in CATEGORY_WORDS {
        if rest.contains(word) {
            conditions.push(Condition::category(*word));
            rest = rest.replace(word, " ");
        }
    }
    if conditions.is_empty() {
        None
    } else {
        Some(Extraction { conditions, rest })
    }
}

/// Rule 10: bare year spanning January..December / 单独年份
pub fn extract_bare_year(text: &str) -> Option<Extraction> {
    for caps in BARE_YEAR_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if preceded_by_digit(text, m.start()) {
            continue;
        }
        let after = &text[m.end()..];
        if caps.get(2).is_some() {
            // `2024年3级` keeps the year, `2024年13月` does not
            if PERIOD_AFTER_YEAR_RE.is_match(after) {
                continue;
            }
        } else if after.starts_with(|c: char| c.is_ascii_digit() || c == '级') {
            continue;
        }
        let Some(year) = capture_num::<i32>(&caps, 1) else { continue };
        return Some(Extraction::new(whole_year(year), text, m.range()));
    }
    None
}

/// Rule 11: access level with optional `以上`/`以下` / 访问级别
pub fn extract_access_level(text: &str) -> Option<Extraction> {
    for caps in ACCESS_LEVEL_RE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let Some(level) = capture_num::<u32>(&caps, 1) else { continue };
        let opt = match caps.get(2).map(|s| s.as_str()) {
            Some("以上") => Comparison::Gte,
            Some("以下") => Comparison::Lte,
            _ => Comparison::Eq,
        };
        return Some(Extraction::new(vec![Condition::access_level(opt, level)], text, m.range()));
    }
    None
}

/// Rule 12: whatever survives the filler words becomes the keyword / 关键词残留
pub fn extract_keyword_residue(text: &str) -> Option<Condition> {
    let residue = strip_stop_words(text);
    if residue.is_empty() {
        None
    } else {
        Some(Condition::keywords(residue))
    }
}

/// Residual text and accumulated conditions threaded through the rules
struct ParseState {
    text: String,
    conditions: Vec<Condition>,
}

impl ParseState {
    /// Take a rule's result; returns whether the rule matched
    fn absorb(&mut self, rule: &str, extraction: Option<Extraction>) -> bool {
        match extraction {
            Some(ext) => {
                tracing::debug!("query rule {} matched: {:?}, rest={:?}", rule, ext.conditions, ext.rest);
                self.conditions.extend(ext.conditions);
                self.text = ext.rest;
                true
            }
            None => false,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn finish(self) -> ParseResult {
        if self.conditions.is_empty() {
            Err(ParseError::Unparseable)
        } else {
            Ok(self.conditions)
        }
    }
}

/// Query parser with an injected clock / 查询解析器
#[derive(Clone)]
pub struct QueryParser {
    clock: Arc<dyn Clock>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl QueryParser {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Parse free text into ordered conditions / 解析查询文本
    ///
    /// Empty or whitespace-only input yields an empty list; non-empty input
    /// that produces nothing yields [`ParseError::Unparseable`].
    pub fn parse(&self, input: &str) -> ParseResult {
        let original = input.trim();
        if original.is_empty() {
            return Ok(Vec::new());
        }

        let today = self.clock.today();
        let mut state = ParseState { text: normalize(original), conditions: Vec::new() };
        tracing::debug!("parsing query {:?} -> {:?}", original, state.text);

        let year_period = state.absorb("year_period", extract_year_period(&state.text));
        if year_period && state.is_exhausted() {
            return state.finish();
        }

        let range = state.absorb("time_range", extract_time_range(&state.text));
        if range && state.is_exhausted() {
            return state.finish();
        }

        if !year_period && !range
            && state.absorb("bare_month", extract_bare_month(&state.text, today))
            && state.is_exhausted()
        {
            return state.finish();
        }

        // 简写形式直接返回，不再解析访问级别与类别
        if let Some(ext) = extract_numeric_shorthand(&state.text) {
            state.absorb("numeric_shorthand", Some(ext));
            if let Some(keywords) = extract_keyword_residue(&state.text) {
                state.conditions.push(keywords);
            }
            return state.finish();
        }

        if state.absorb("issue", extract_issue(&state.text, today)) && state.is_exhausted() {
            return state.finish();
        }

        let named_year = state.absorb("named_year", extract_named_year(&state.text, today));
        if named_year && state.is_exhausted() {
            return state.finish();
        }

        let window = state.absorb("relative_window", extract_relative_window(&state.text, today));

        state.absorb("category", extract_category(&state.text));
        if state.is_exhausted() {
            return state.finish();
        }

        if !(year_period || range || named_year || window)
            && state.absorb("bare_year", extract_bare_year(&state.text))
            && state.is_exhausted()
        {
            return state.finish();
        }

        state.absorb("access_level", extract_access_level(&state.text));

        if let Some(keywords) = extract_keyword_residue(&state.text) {
            tracing::debug!("query keyword residue: {:?}", keywords.value);
            state.conditions.push(keywords);
        }

        state.finish()
    }
}

/// Parse with the system clock / 使用系统时钟解析
pub fn parse(input: &str) -> ParseResult {
    QueryParser::default().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::clock::FixedClock;
    use crate::search::schema::{ConditionKey, PeriodSource};

    fn parser_at(year: i32, month: u32, day: u32) -> QueryParser {
        QueryParser::new(Arc::new(FixedClock::ymd(year, month, day).unwrap()))
    }

    fn parser() -> QueryParser {
        parser_at(2025, 6, 15)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn time(opt: Comparison, year: i32, month: u32) -> Condition {
        Condition::time(opt, TimeCode::month(year, month))
    }

    fn issue(year: i32, n: u32) -> Condition {
        Condition::time(Comparison::Eq, TimeCode::issue(year, n))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parser().parse(""), Ok(vec![]));
        assert_eq!(parser().parse("   "), Ok(vec![]));
        assert_eq!(parser().parse("\u{3000}\t"), Ok(vec![]));
    }

    #[test]
    fn test_bare_year() {
        assert_eq!(
            parser().parse("2024年"),
            Ok(vec![time(Comparison::Gte, 2024, 1), time(Comparison::Lte, 2024, 12)])
        );
    }

    #[test]
    fn test_year_with_issue() {
        assert_eq!(parser().parse("2024年第10期"), Ok(vec![issue(2024, 10)]));
    }

    #[test]
    fn test_year_with_issue_zero_padded() {
        let conditions = parser().parse("2024年5期").unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].value.to_string(), "202405");
        assert_eq!(conditions[0].time_code().map(|c| c.source), Some(PeriodSource::Issue));
    }

    #[test]
    fn test_year_with_month() {
        let conditions = parser().parse("2024年5月份").unwrap();
        assert_eq!(conditions, vec![time(Comparison::Eq, 2024, 5)]);
        assert_eq!(conditions[0].time_code().map(|c| c.source), Some(PeriodSource::Month));
    }

    #[test]
    fn test_issue_uses_current_year() {
        assert_eq!(
            parser().parse("第10期意林"),
            Ok(vec![issue(2025, 10), Condition::keywords("意林")])
        );
    }

    #[test]
    fn test_access_level_with_keyword() {
        assert_eq!(
            parser().parse("3级以上意林"),
            Ok(vec![Condition::access_level(Comparison::Gte, 3), Condition::keywords("意林")])
        );
    }

    #[test]
    fn test_access_level_variants() {
        assert_eq!(
            parser().parse("5级以下"),
            Ok(vec![Condition::access_level(Comparison::Lte, 5)])
        );
        assert_eq!(parser().parse("2级"), Ok(vec![Condition::access_level(Comparison::Eq, 2)]));
    }

    #[test]
    fn test_full_phrase_order() {
        assert_eq!(
            parser().parse("2024年第10期3级以上意林"),
            Ok(vec![
                issue(2024, 10),
                Condition::access_level(Comparison::Gte, 3),
                Condition::keywords("意林"),
            ])
        );
    }

    #[test]
    fn test_only_filler_is_unparseable() {
        assert_eq!(parser().parse("请帮我找的"), Err(ParseError::Unparseable));
        assert_eq!(parser().parse("，。！"), Err(ParseError::Unparseable));
        assert_eq!(parser().parse("帮我 搜索, 所有的。"), Err(ParseError::Unparseable));
    }

    #[test]
    fn test_time_range_full_pairs() {
        assert_eq!(
            parser().parse("2024年3月-2024年5月"),
            Ok(vec![time(Comparison::Gte, 2024, 3), time(Comparison::Lte, 2024, 5)])
        );
        assert_eq!(
            parser().parse("2023年11月至2024年2月"),
            Ok(vec![time(Comparison::Gte, 2023, 11), time(Comparison::Lte, 2024, 2)])
        );
    }

    #[test]
    fn test_time_range_inherits_year() {
        assert_eq!(
            parser().parse("2024年3-5月读者"),
            Ok(vec![
                time(Comparison::Gte, 2024, 3),
                time(Comparison::Lte, 2024, 5),
                Condition::keywords("读者"),
            ])
        );
    }

    #[test]
    fn test_bare_month_uses_current_year() {
        assert_eq!(
            parser().parse("5月份意林"),
            Ok(vec![time(Comparison::Eq, 2025, 5), Condition::keywords("意林")])
        );
    }

    #[test]
    fn test_numeric_shorthand_skips_access_level() {
        // 简写路径不解析访问级别，残留全部作为关键词
        assert_eq!(
            parser().parse("2024 10 意林 3级"),
            Ok(vec![issue(2024, 10), Condition::keywords("意林3级")])
        );
        assert_eq!(parser().parse("2024 10"), Ok(vec![issue(2024, 10)]));
    }

    #[test]
    fn test_issue_defers_to_year_marker() {
        assert_eq!(
            parser().parse("第3期2024年"),
            Ok(vec![
                time(Comparison::Gte, 2024, 1),
                time(Comparison::Lte, 2024, 12),
                Condition::keywords("第3期"),
            ])
        );
    }

    #[test]
    fn test_named_year_with_category() {
        assert_eq!(
            parser().parse("去年的杂志"),
            Ok(vec![
                time(Comparison::Gte, 2024, 1),
                time(Comparison::Lte, 2024, 12),
                Condition::category("杂志"),
            ])
        );
        assert_eq!(
            parser().parse("今年"),
            Ok(vec![time(Comparison::Gte, 2025, 1), time(Comparison::Lte, 2025, 12)])
        );
    }

    #[test]
    fn test_relative_window() {
        assert_eq!(
            parser().parse("最近3个月"),
            Ok(vec![time(Comparison::Gte, 2025, 3), time(Comparison::Lte, 2025, 6)])
        );
        assert_eq!(
            parser().parse("最近一年的图书"),
            Ok(vec![
                time(Comparison::Gte, 2024, 6),
                time(Comparison::Lte, 2025, 6),
                Condition::category("图书"),
            ])
        );
        assert_eq!(
            parser_at(2025, 6, 5).parse("最近10天"),
            Ok(vec![time(Comparison::Gte, 2025, 5), time(Comparison::Lte, 2025, 6)])
        );
        assert_eq!(
            parser_at(2025, 1, 10).parse("最近两周"),
            Ok(vec![time(Comparison::Gte, 2024, 12), time(Comparison::Lte, 2025, 1)])
        );
    }

    #[test]
    fn test_recent_months_not_taken_as_bare_month() {
        assert_eq!(
            parser().parse("最近3月"),
            Ok(vec![time(Comparison::Gte, 2025, 3), time(Comparison::Lte, 2025, 6)])
        );
    }

    #[test]
    fn test_half_year_has_lower_bound_only() {
        assert_eq!(parser().parse("半年之内"), Ok(vec![time(Comparison::Gte, 2024, 12)]));
    }

    #[test]
    fn test_category_alone() {
        let conditions = parser().parse("期刊").unwrap();
        assert_eq!(conditions, vec![Condition::category("期刊")]);
        assert_eq!(conditions[0].key, ConditionKey::Type);
    }

    #[test]
    fn test_keyword_only() {
        assert_eq!(parser().parse("请帮我找读者文摘"), Ok(vec![Condition::keywords("读者文摘")]));
    }

    #[test]
    fn test_extract_year_period_rejects_range_endpoint() {
        assert!(extract_year_period("2024年3月-2024年5月").is_none());
        assert!(extract_year_period("2024年3-5月").is_none());
    }

    #[test]
    fn test_extract_rules_replace_span_with_space() {
        let ext = extract_year_period("2024年第10期意林").unwrap();
        assert_eq!(ext.rest, " 意林");

        let ext = extract_access_level("意林3级以上").unwrap();
        assert_eq!(ext.rest, "意林 ");
    }

    #[test]
    fn test_extract_bare_month_rejects_invalid_month() {
        assert!(extract_bare_month("13月", date(2025, 1, 1)).is_none());
        assert!(extract_bare_month("0月", date(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_bare_year_before_access_level() {
        assert_eq!(
            parser().parse("2024年3级以上意林"),
            Ok(vec![
                time(Comparison::Gte, 2024, 1),
                time(Comparison::Lte, 2024, 12),
                Condition::access_level(Comparison::Gte, 3),
                Condition::keywords("意林"),
            ])
        );
        assert_eq!(
            parser().parse("2024年5级以下"),
            Ok(vec![
                time(Comparison::Gte, 2024, 1),
                time(Comparison::Lte, 2024, 12),
                Condition::access_level(Comparison::Lte, 5),
            ])
        );
    }

    #[test]
    fn test_bare_year_skipped_after_named_year_or_window() {
        assert_eq!(
            parser().parse("去年2023"),
            Ok(vec![
                time(Comparison::Gte, 2024, 1),
                time(Comparison::Lte, 2024, 12),
                Condition::keywords("2023"),
            ])
        );
        assert_eq!(
            parser().parse("最近3个月2023"),
            Ok(vec![
                time(Comparison::Gte, 2025, 3),
                time(Comparison::Lte, 2025, 6),
                Condition::keywords("2023"),
            ])
        );
    }

    #[test]
    fn test_four_digit_access_level_is_not_a_year() {
        assert_eq!(parser().parse("1000级"), Ok(vec![Condition::access_level(Comparison::Eq, 1000)]));
        assert!(extract_bare_year("1000级").is_none());
    }

    #[test]
    fn test_numeric_shorthand_before_level_suffix() {
        // `2024 3级` 归一化为 `20243级`，按简写处理
        assert_eq!(
            parser().parse("2024 3级"),
            Ok(vec![issue(2024, 3), Condition::keywords("级")])
        );
    }

    #[test]
    fn test_extract_bare_year_rejects_following_period() {
        assert!(extract_bare_year("2024年13月").is_none());
        assert!(extract_bare_year("2024年第3期").is_none());
        assert!(extract_bare_year("20245").is_none());
        assert!(extract_bare_year("2024年3级").is_some());
    }

    #[test]
    fn test_extract_issue_requires_no_year_marker() {
        assert!(extract_issue("2024年 第3期", date(2025, 1, 1)).is_none());
        assert!(extract_issue("第3期", date(2025, 1, 1)).is_some());
    }
}
