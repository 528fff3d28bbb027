//! 医疗编码相关类型

use std::fmt::Display;

/// 本地对照表未收录时使用的固定描述
pub const DESCRIPTION_NOT_FOUND: &str = "Description Not Found";

/// 编码类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    /// 操作/服务编码（CPT/HCPCS）：五位数字，或一个大写字母加四位数字
    Procedural,
    /// 诊断编码（ICD-10）：中间带小数点的字母数字串
    Diagnostic,
    /// 其他
    Unknown,
}

/// 从题目文本中识别出的编码
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeToken {
    pub raw: String,
    pub kind: CodeKind,
}

/// 描述来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSource {
    Local,
    External,
    /// 已查询但未找到，描述为 [`DESCRIPTION_NOT_FOUND`]
    Unresolved,
}

/// 编码及其描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDescription {
    pub code: String,
    pub description: String,
    pub source: DescriptionSource,
}

impl CodeDescription {
    pub fn unresolved(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: DESCRIPTION_NOT_FOUND.to_string(),
            source: DescriptionSource::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.source != DescriptionSource::Unresolved
    }
}

impl Display for CodeDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.description)
    }
}
