use std::fmt::Display;

/// 单道试题
///
/// 由 `QuestionParser` 从原始文本切分得到，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionUnit {
    /// 题号（原文中的数字串，保持出现顺序，不重新编号）
    pub id: String,
    /// 题干及选项，首尾空白已去除
    pub text: String,
}

impl QuestionUnit {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// 题号的数值形式，用于和答案键按编号比对
    pub fn number(&self) -> Option<u32> {
        self.id.parse().ok()
    }

    /// 发送给推理服务的题目上下文
    pub fn prompt_text(&self) -> String {
        format!("Question {}:\n{}", self.id, self.text)
    }
}

impl Display for QuestionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目#{}]", self.id)
    }
}
