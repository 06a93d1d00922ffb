//! 题号标记扫描 - 业务能力层
//!
//! 从文本片段中提取题号，无副作用

use regex::Regex;

/// 在文本中查找第一个题号标记
///
/// 识别 "Q1" / "Question 1" 形式（大小写不敏感，Q 与数字间允许空白，
/// 整体必须是词边界分隔的独立 token），返回数字串
pub fn find_question_number(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)\bQ(?:uestion)?\s*([0-9]+)\b").ok()?;
    re.captures(text).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_short_and_long_forms() {
        assert_eq!(find_question_number("# Q1"), Some("1".to_string()));
        assert_eq!(find_question_number("Question 12"), Some("12".to_string()));
        assert_eq!(find_question_number("## q 3 部分"), Some("3".to_string()));
        assert_eq!(find_question_number("QUESTION7"), Some("7".to_string()));
    }

    #[test]
    fn only_first_match_is_used() {
        assert_eq!(
            find_question_number("Q1 续接 Q2 的讨论"),
            Some("1".to_string())
        );
    }

    #[test]
    fn requires_word_boundary() {
        // FAQ1 中的 Q 前没有词边界
        assert_eq!(find_question_number("FAQ1"), None);
        assert_eq!(find_question_number("unique5"), None);
    }

    #[test]
    fn no_match_without_digits() {
        assert_eq!(find_question_number("Question"), None);
        assert_eq!(find_question_number("普通说明文字"), None);
        assert_eq!(find_question_number(""), None);
    }
}
