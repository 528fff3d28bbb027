//! 评分 - 业务能力层
//!
//! 读取结果日志，与答案键按题号比对

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use regex::Regex;
use std::sync::LazyLock;

use crate::error::FileError;
use crate::models::{Answer, AnswerKey};

/// 与 `format_result_line` 互逆：题号 + 点 + 可选空白 + 字母
static RESULT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*([A-D])").expect("result line pattern"));

/// 解析结果日志内容，同一题号出现多次时以最后一次为准
pub fn parse_result_log(content: &str) -> BTreeMap<u32, Answer> {
    let mut answers = BTreeMap::new();
    for line in content.lines() {
        let Some(caps) = RESULT_LINE.captures(line.trim()) else {
            continue;
        };
        let id = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let answer = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .and_then(Answer::from_letter);
        if let (Some(id), Some(answer)) = (id, answer) {
            answers.insert(id, answer);
        }
    }
    answers
}

/// 读取并解析结果日志文件
pub async fn load_result_log(path: &Path) -> Result<BTreeMap<u32, Answer>, FileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read(path, e))?;
    Ok(parse_result_log(&content))
}

/// 单题评分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionScore {
    pub id: u32,
    pub expected: Answer,
    pub given: Answer,
}

impl QuestionScore {
    pub fn is_correct(&self) -> bool {
        self.expected == self.given
    }
}

/// 评分报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreReport {
    /// 双方都有的题号，按题号排序
    pub questions: Vec<QuestionScore>,
    /// 答案键中有但结果日志中没有的题号
    pub unanswered: Vec<u32>,
    /// 结果日志中有但答案键中没有的题号
    pub unknown: Vec<u32>,
}

impl ScoreReport {
    pub fn correct(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct()).count()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

impl Display for ScoreReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for q in &self.questions {
            if q.is_correct() {
                writeln!(f, "Question {}: correct ({})", q.id, q.expected)?;
            } else {
                writeln!(
                    f,
                    "Question {}: WRONG (answered {}, correct answer {})",
                    q.id, q.given, q.expected
                )?;
            }
        }
        if !self.unanswered.is_empty() {
            let ids: Vec<String> = self.unanswered.iter().map(u32::to_string).collect();
            writeln!(f, "Unanswered: {}", ids.join(", "))?;
        }
        write!(f, "Score: {} out of {}", self.correct(), self.total())
    }
}

/// 按题号比对，任一方缺失的题号跳过
pub fn score(answers: &BTreeMap<u32, Answer>, key: &AnswerKey) -> ScoreReport {
    let mut report = ScoreReport::default();

    for (&id, &expected) in key {
        match answers.get(&id) {
            Some(&given) => report.questions.push(QuestionScore { id, expected, given }),
            None => report.unanswered.push(id),
        }
    }
    report.unknown = answers.keys().filter(|id| !key.contains_key(id)).copied().collect();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::result_writer::{format_result_line, group_delimiter};

    #[test]
    fn test_parse_inverts_writer_format() {
        let content = format!(
            "{}\n{}\n{}\n{}\n",
            format_result_line("1", Answer::B),
            format_result_line("2", Answer::Error),
            group_delimiter(),
            format_result_line("10", Answer::D),
        );
        let answers = parse_result_log(&content);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[&1], Answer::B);
        assert_eq!(answers[&10], Answer::D);
        assert!(!answers.contains_key(&2));
    }

    #[test]
    fn test_parse_accepts_baseline_replies() {
        let answers = parse_result_log("  3.C\n4. A - because\nQuestion 5: B\n");
        assert_eq!(answers.get(&3), Some(&Answer::C));
        assert_eq!(answers.get(&4), Some(&Answer::A));
        assert_eq!(answers.get(&5), None);
    }

    #[test]
    fn test_score_by_identifier() {
        let answers = parse_result_log("2. C\n1. B\n9. A\n");
        let key: AnswerKey = [(1, Answer::B), (2, Answer::D), (3, Answer::A)].into_iter().collect();

        let report = score(&answers, &key);
        assert_eq!(report.correct(), 1);
        assert_eq!(report.total(), 2);
        assert_eq!(report.unanswered, vec![3]);
        assert_eq!(report.unknown, vec![9]);

        let text = report.to_string();
        assert!(text.contains("Question 1: correct (B)"));
        assert!(text.contains("Question 2: WRONG (answered C, correct answer D)"));
        assert!(text.ends_with("Score: 1 out of 2"));
    }

    #[test]
    fn test_single_question_end_to_end() {
        let key: AnswerKey = [(1, Answer::B)].into_iter().collect();
        let report = score(&parse_result_log("1. B\n"), &key);
        assert_eq!((report.correct(), report.total()), (1, 1));
    }
}
