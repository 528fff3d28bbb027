//! 试题切分 - 业务能力层
//!
//! 把整份试卷文本按 "可选换行 + 可选空白 + 数字 + 点 + 空白" 的边界切成若干道题

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::QuestionUnit;

static QUESTION_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?\s*(\d+)\.\s+").expect("question boundary pattern"));

/// 试题切分器
///
/// - 题号取边界中的数字串，按原文出现顺序输出，不排序、不校验连续性
/// - 第一个边界之前的内容（封面、说明等）丢弃
/// - 题干首尾空白去除，内部空白保留
#[derive(Debug, Default, Clone, Copy)]
pub struct QuestionParser;

impl QuestionParser {
    pub fn new() -> Self {
        Self
    }

    /// 切分试卷文本
    ///
    /// 空文本返回空列表；非空文本中找不到任何边界时返回 [`ParseError`]
    pub fn parse(&self, text: &str) -> Result<Vec<QuestionUnit>, ParseError> {
        let boundaries: Vec<_> = QUESTION_BOUNDARY.captures_iter(text).collect();

        if boundaries.is_empty() {
            if text.trim().is_empty() {
                warn!("⚠️ 试卷文本为空，没有可处理的题目");
                return Ok(Vec::new());
            }
            return Err(ParseError::NoQuestionBoundary {
                length: text.chars().count(),
            });
        }

        let mut questions = Vec::with_capacity(boundaries.len());
        for (i, caps) in boundaries.iter().enumerate() {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let body_end = boundaries
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());

            let body = text[whole.end()..body_end].trim();
            questions.push(QuestionUnit::new(number.as_str(), body));
        }

        debug!("试卷切分完成，共 {} 道题", questions.len());
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_questions() {
        let text = "Coding Exam\n1. Which code reports X?\nA) 41110 B) 41105\n2.  Second question\n   with two lines  \n";
        let questions = QuestionParser::new().parse(text).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "1");
        assert_eq!(questions[0].text, "Which code reports X?\nA) 41110 B) 41105");
        assert_eq!(questions[1].id, "2");
        assert_eq!(questions[1].text, "Second question\n   with two lines");
    }

    #[test]
    fn test_ids_keep_source_order() {
        let text = "3. third\n1. first\n10. tenth";
        let ids: Vec<_> = QuestionParser::new()
            .parse(text)
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "10"]);
    }

    #[test]
    fn test_count_matches_boundaries_and_reconstructs() {
        let text = "1. alpha beta\n2. gamma\n\n3. delta  epsilon";
        let questions = QuestionParser::new().parse(text).unwrap();
        assert_eq!(questions.len(), QUESTION_BOUNDARY.find_iter(text).count());

        let rebuilt: String = questions
            .iter()
            .map(|q| format!("{}. {}", q.id, q.text))
            .collect::<Vec<_>>()
            .join("\n");
        let reparsed = QuestionParser::new().parse(&rebuilt).unwrap();
        assert_eq!(reparsed, questions);
    }

    #[test]
    fn test_decimal_codes_are_not_boundaries() {
        let text = "1. Which diagnosis? A) M17.0 B) M17.1";
        let questions = QuestionParser::new().parse(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].text.ends_with("B) M17.1"));
    }

    #[test]
    fn test_no_boundary_is_an_error() {
        let err = QuestionParser::new().parse("no numbered questions here").unwrap_err();
        assert!(matches!(err, ParseError::NoQuestionBoundary { .. }));
    }

    #[test]
    fn test_empty_text_yields_no_questions() {
        assert!(QuestionParser::new().parse("  \n ").unwrap().is_empty());
    }
}
