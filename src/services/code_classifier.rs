//! 编码识别 - 业务能力层
//!
//! 纯函数：只做模式匹配，不依赖任何外部服务

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::{CodeKind, CodeToken};

/// CPT：五位数字；HCPCS Level II：一个大写字母加四位数字
static PROCEDURAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{5}|[A-Z]\d{4})$").expect("procedural code pattern"));

/// ICD-10：字母 + 数字 + 点 + 字母数字，例如 M17.0、S72.001A
static DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]\d[0-9A-Z]*\.[0-9A-Z]+$").expect("diagnostic code pattern")
});

/// 判断单个记号的编码类别
pub fn classify(token: &str) -> CodeKind {
    let token = token.trim();
    if PROCEDURAL.is_match(token) {
        CodeKind::Procedural
    } else if DIAGNOSTIC.is_match(token) {
        CodeKind::Diagnostic
    } else {
        CodeKind::Unknown
    }
}

/// 题目中出现的编码，按类别分组，保持首次出现顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCodes {
    pub procedural: Vec<String>,
    pub diagnostic: Vec<String>,
}

impl QuestionCodes {
    pub fn is_empty(&self) -> bool {
        self.procedural.is_empty() && self.diagnostic.is_empty()
    }

    pub fn has_diagnostic(&self) -> bool {
        !self.diagnostic.is_empty()
    }

    pub fn has_procedural(&self) -> bool {
        !self.procedural.is_empty()
    }
}

/// 编码识别器
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeClassifier;

impl CodeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 切分文本并逐个分类，包括 Unknown 记号
    pub fn tokens(&self, text: &str) -> Vec<CodeToken> {
        text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
            .map(|piece| piece.trim_matches('.'))
            .filter(|piece| !piece.is_empty())
            .map(|piece| CodeToken {
                raw: piece.to_string(),
                kind: classify(piece),
            })
            .collect()
    }

    /// 提取题目中的操作编码与诊断编码（去重，忽略 Unknown）
    pub fn extract(&self, text: &str) -> QuestionCodes {
        let mut seen = HashSet::new();
        let mut codes = QuestionCodes::default();

        for token in self.tokens(text) {
            if token.kind == CodeKind::Unknown || !seen.insert(token.raw.clone()) {
                continue;
            }
            match token.kind {
                CodeKind::Procedural => codes.procedural.push(token.raw),
                CodeKind::Diagnostic => codes.diagnostic.push(token.raw),
                CodeKind::Unknown => {}
            }
        }

        codes
    }
}
