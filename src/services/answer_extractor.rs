//! 答案提取 - 业务能力层
//!
//! 从推理服务的自由文本中确定性地提取 A-D 之一

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Answer;
use crate::services::prompt::FINAL_ANSWER_MARKER;

static STANDALONE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-D])\b").expect("standalone letter pattern"));

/// 答案是通过哪种方式得到的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// 最后一个终止标记之后的第一个 A-D 字符
    Marker,
    /// 无终止标记，全文最后一个独立的 A-D
    StandaloneLetter,
    /// 两种方式都失败
    NotFound,
}

/// 答案提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerExtractor;

impl AnswerExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取答案，失败时返回 [`Answer::Error`]，不会 panic
    pub fn extract(&self, output: &str) -> Answer {
        self.extract_with_strategy(output).0
    }

    pub fn extract_with_strategy(&self, output: &str) -> (Answer, ExtractionStrategy) {
        if let Some(pos) = output.rfind(FINAL_ANSWER_MARKER) {
            let after = &output[pos + FINAL_ANSWER_MARKER.len()..];
            return match after.chars().find_map(Answer::from_letter) {
                Some(answer) => (answer, ExtractionStrategy::Marker),
                None => (Answer::Error, ExtractionStrategy::NotFound),
            };
        }

        STANDALONE_LETTER
            .captures_iter(output)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().chars().next())
            .last()
            .and_then(Answer::from_letter)
            .map_or((Answer::Error, ExtractionStrategy::NotFound), |answer| {
                (answer, ExtractionStrategy::StandaloneLetter)
            })
    }
}
