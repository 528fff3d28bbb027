//! 答案与单题处理结果

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use serde::Serialize;

/// 选项字母，或无法提取时的错误哨兵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Answer {
    A,
    B,
    C,
    D,
    /// 无法从输出中得到合法字母
    #[serde(rename = "ERROR")]
    Error,
}

impl Answer {
    /// 合法答案字母表
    pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Answer::A),
            'B' => Some(Answer::B),
            'C' => Some(Answer::C),
            'D' => Some(Answer::D),
            _ => None,
        }
    }

    pub fn is_letter(&self) -> bool {
        *self != Answer::Error
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Answer::A => "A",
            Answer::B => "B",
            Answer::C => "C",
            Answer::D => "D",
            Answer::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// 单题处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Success,
    Error,
}

/// 推理循环的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopOutcome {
    /// 推理服务给出了终止决定
    Terminated,
    /// 达到迭代上限仍未终止
    Exhausted,
    /// 推理服务调用失败
    Failed,
}

/// 单题处理结果，创建后不再修改
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    pub answer: Answer,
    pub reasoning_trace: String,
    pub elapsed: Duration,
    pub status: ResolutionStatus,
    pub outcome: LoopOutcome,
}

impl ResolutionResult {
    /// 根据提取结果构造，错误哨兵记为 Error 状态
    pub fn new(answer: Answer, reasoning_trace: String, elapsed: Duration, outcome: LoopOutcome) -> Self {
        let status = if answer.is_letter() && outcome != LoopOutcome::Failed {
            ResolutionStatus::Success
        } else {
            ResolutionStatus::Error
        };
        Self {
            answer,
            reasoning_trace,
            elapsed,
            status,
            outcome,
        }
    }

    /// 推理服务本身失败时的结果
    pub fn failed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            answer: Answer::Error,
            reasoning_trace: format!("Error: {}", message.into()),
            elapsed,
            status: ResolutionStatus::Error,
            outcome: LoopOutcome::Failed,
        }
    }
}

/// 答案键：题号 -> 正确字母
pub type AnswerKey = BTreeMap<u32, Answer>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_sentinel_is_not_a_letter() {
        assert_eq!(Answer::Error.to_string(), "ERROR");
        assert!(!Answer::Error.is_letter());
        for letter in Answer::LETTERS {
            assert!(Answer::from_letter(letter).unwrap().is_letter());
        }
        assert_eq!(Answer::from_letter('E'), None);
        assert_eq!(Answer::from_letter('a'), None);
    }

    #[test]
    fn test_status_follows_answer() {
        let ok = ResolutionResult::new(Answer::C, String::new(), Duration::ZERO, LoopOutcome::Exhausted);
        assert_eq!(ok.status, ResolutionStatus::Success);

        let ambiguous =
            ResolutionResult::new(Answer::Error, String::new(), Duration::ZERO, LoopOutcome::Terminated);
        assert_eq!(ambiguous.status, ResolutionStatus::Error);

        let failed = ResolutionResult::failed("boom", Duration::ZERO);
        assert_eq!(failed.answer, Answer::Error);
        assert_eq!(failed.reasoning_trace, "Error: boom");
    }
}
