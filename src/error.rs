use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 试题文本解析错误
    #[error("试题解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 编码对照表加载错误
    #[error("对照表加载错误: {0}")]
    Load(#[from] LoadError),
    /// 工具调用错误
    #[error("工具调用错误: {0}")]
    Tool(#[from] ToolError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 试题文本解析错误（致命，终止整个批次）
#[derive(Debug, Error)]
pub enum ParseError {
    /// 文本非空，但找不到任何 "数字. " 形式的题号
    #[error("未找到任何题号边界 (文本长度: {length} 字符)")]
    NoQuestionBoundary { length: usize },
}

/// 编码对照表加载错误（启动时致命）
#[derive(Debug, Error)]
pub enum LoadError {
    /// 文件不存在
    #[error("对照表文件不存在: {}", .path.display())]
    FileNotFound { path: PathBuf },
    /// CSV 读取失败
    #[error("读取CSV失败 ({}): {source}", .path.display())]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// 前 N 行内未找到同时包含两个列标记的表头
    #[error("前 {scanned} 行内未找到同时包含 HCPCS 与 DESCRIPTION 的表头 ({})", .path.display())]
    HeaderNotFound { path: PathBuf, scanned: usize },
    /// 表头中缺少必需的列
    #[error("表头中缺少 {column} 列 ({})", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// 工具调用错误（可恢复，转为观察结果交给推理循环）
#[derive(Debug, Error)]
pub enum ToolError {
    /// 本地查表失败
    #[error("Error in local lookup: {message}")]
    LocalLookup { message: String },
    /// 外部检索失败
    #[error("Error in web search: {source}")]
    ExternalSearch {
        #[source]
        source: anyhow::Error,
    },
    /// 外部检索返回空内容
    #[error("Error in web search: empty response")]
    EmptyExternalResponse,
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: anyhow::Error,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {}", .path.display())]
    NotFound { path: PathBuf },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 答案键内容不合法
    #[error("答案键内容不合法 ({}): {reason}", .path.display())]
    InvalidAnswerKey { path: PathBuf, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
}

// ========== 便捷构造函数 ==========

impl FileError {
    /// 创建文件读取错误（NotFound 单独区分）
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound { path }
        } else {
            FileError::ReadFailed { path, source }
        }
    }

    /// 创建文件写入错误
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_failed(model: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: source.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_reads_as_observation() {
        let err = ToolError::LocalLookup {
            message: "table unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Error in local lookup: table unavailable");

        let err = ToolError::ExternalSearch {
            source: anyhow::anyhow!("timeout"),
        };
        assert_eq!(err.to_string(), "Error in web search: timeout");
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            FileError::read("exam.txt", io),
            FileError::NotFound { .. }
        ));
    }

    #[test]
    fn test_load_error_wraps_into_app_error() {
        let err: AppError = LoadError::HeaderNotFound {
            path: PathBuf::from("table.csv"),
            scanned: 10,
        }
        .into();
        assert!(matches!(err, AppError::Load(_)));
        assert!(err.to_string().contains("10"));
    }
}
