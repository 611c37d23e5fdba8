//! Query text normalizer / 查询文本标准化
//!
//! Provides / 提供：
//! - Punctuation stripping and whitespace removal / 去除标点与空白
//! - Filler (stop) word removal for keyword residue / 去除停用词
//! - Chinese numeral conversion for relative windows / 中文数字转换
//!
//! The punctuation, stop-word and category tables are static data; the
//! parser never mutates them.

/// Punctuation replaced by a space before whitespace removal / 标点符号表
///
/// Range separators (see [`RANGE_SEPARATORS`]) are not included.
pub const PUNCTUATION: &[char] = &[
    // Chinese / 中文标点
    '，', '。', '、', '；', '：', '！', '？', '“', '”', '‘', '’', '（', '）', '【', '】', '《', '》',
    '「', '」', '…', '·',
    // English / 英文标点
    ',', '.', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', '<', '>', '/', '\\',
    '|', '#', '&', '*', '+', '=', '@', '$', '%', '^', '`',
];

/// Filler words removed from the keyword residue, longest first / 停用词表
pub const STOP_WORDS: &[&str] = &[
    "请帮我", "我想要", "请给我", "帮我找", "查找", "搜索", "查询", "寻找", "想要", "帮我", "给我",
    "我要", "我想", "所有", "全部", "一下", "相关", "请", "找", "的",
];

/// Category words recognised as a `Type` condition / 类别词表
pub const CATEGORY_WORDS: &[&str] = &["图书", "杂志", "期刊"];

/// Range separators between two time endpoints / 时间范围分隔符
pub const RANGE_SEPARATORS: &[char] = &['-', '－', '~', '～', '—', '至', '到'];

/// Normalize a raw query / 标准化查询文本
///
/// Punctuation becomes a space, full-width digits become ASCII, then every
/// whitespace character (including the ideographic space) is dropped.
/// Idempotent.
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| match c {
            c if PUNCTUATION.contains(&c) => ' ',
            '０'..='９' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect();

    spaced
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse runs of whitespace into one space and trim / 合并空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove filler words and collapse the leftover / 去除停用词
pub fn strip_stop_words(text: &str) -> String {
    let mut rest = text.to_string();
    for word in STOP_WORDS {
        if rest.contains(word) {
            rest = rest.replace(word, "");
        }
    }
    collapse_whitespace(&rest)
}

/// Check whether a char is a time range separator / 是否为范围分隔符
pub fn is_range_separator(c: char) -> bool {
    RANGE_SEPARATORS.contains(&c)
}

/// Parse a count written in ASCII digits or a single Chinese numeral / 解析数量
///
/// Chinese numerals 一..十 (and 两) map to 1..10.
pub fn parse_count(text: &str) -> Option<u32> {
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse::<u32>().ok();
    }

    let mut chars = text.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let n = match c {
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        '十' => 10,
        _ => return None,
    };
    Some(n)
}
