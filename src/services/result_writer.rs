//! 结果日志写入服务 - 业务能力层
//!
//! 只负责"写结果日志"能力，不关心流程

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::FileError;
use crate::models::{Answer, LoopOutcome, ResolutionResult, ResolutionStatus};

/// 每组结果之后写入的分隔行
pub fn group_delimiter() -> String {
    "-".repeat(80)
}

/// 单题结果行，Scorer 按相同格式解析
pub fn format_result_line(id: &str, answer: Answer) -> String {
    format!("{}. {}", id, answer)
}

/// 结果日志写入服务
///
/// 职责：
/// - 创建（截断）结果日志
/// - 按组追加 `"<id>. <answer>"` 行和分隔行
/// - 每组写完立即 flush，保证中断后已完成的部分仍然保留
pub struct ResultWriter {
    path: PathBuf,
    file: File,
}

impl ResultWriter {
    /// 创建新的结果日志（已存在则清空）
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| FileError::write(&path, e))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一组结果行
    pub fn append_group(&mut self, lines: &[String]) -> Result<(), FileError> {
        self.append_text(&lines.join("\n"))
    }

    /// 追加一段原始文本（基线作答直接写模型回复）
    pub fn append_text(&mut self, text: &str) -> Result<(), FileError> {
        debug!("写入结果: {} 行 -> {}", text.lines().count(), self.path.display());

        let block = format!("{}\n{}\n", text, group_delimiter());
        self.file
            .write_all(block.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| FileError::write(&self.path, e))
    }
}

/// 推理过程记录（JSON Lines，每题一行）
#[derive(Debug, Serialize)]
pub struct TraceRecord<'a> {
    pub id: &'a str,
    pub answer: Answer,
    pub status: ResolutionStatus,
    pub outcome: LoopOutcome,
    pub elapsed_ms: u128,
    pub reasoning_trace: &'a str,
}

impl<'a> TraceRecord<'a> {
    pub fn new(id: &'a str, result: &'a ResolutionResult) -> Self {
        Self {
            id,
            answer: result.answer,
            status: result.status,
            outcome: result.outcome,
            elapsed_ms: result.elapsed.as_millis(),
            reasoning_trace: &result.reasoning_trace,
        }
    }
}

/// 推理过程写入服务
///
/// 与结果日志一样，创建时清空旧内容，避免混入上一次运行的记录
pub struct TraceWriter {
    path: PathBuf,
    file: File,
}

impl TraceWriter {
    /// 创建新的过程记录文件（已存在则清空）
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| FileError::write(&path, e))?;
        Ok(Self { path, file })
    }

    /// 追加一条记录
    pub fn write(&self, record: &TraceRecord<'_>) -> Result<(), FileError> {
        let line = serde_json::to_string(record)
            .map_err(|e| FileError::write(&self.path, std::io::Error::other(e)))?;

        let mut file = &self.file;
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|e| FileError::write(&self.path, e))
    }
}
