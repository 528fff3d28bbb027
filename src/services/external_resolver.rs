//! 外部检索 - 业务能力层
//!
//! 把本地查不到或区分度不够的编码交给带联网检索能力的模型补全描述

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::models::{CodeDescription, DescriptionSource};
use crate::services::prompt;

/// 外部知识检索服务
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    async fn retrieve(&self, prompt: &str) -> Result<String>;
}

/// 检索结果
///
/// `text` 原样交给推理服务，不做格式校验；`entries` 仅是尽力解析的结果
#[derive(Debug, Clone)]
pub struct ExternalResolution {
    pub text: String,
    pub entries: Vec<CodeDescription>,
}

/// 外部检索器
#[derive(Clone)]
pub struct ExternalResolver {
    retriever: Arc<dyn KnowledgeRetriever>,
}

impl ExternalResolver {
    pub fn new(retriever: Arc<dyn KnowledgeRetriever>) -> Self {
        Self { retriever }
    }

    /// 提交全部 "编码 - 描述" 行（或诊断编码行），返回改进后的文本
    pub async fn resolve(&self, code_lines: &str) -> Result<ExternalResolution, ToolError> {
        debug!("外部检索输入 {} 行", code_lines.lines().count());

        let text = self
            .retriever
            .retrieve(&prompt::external_search_prompt(code_lines.trim()))
            .await
            .map_err(|source| ToolError::ExternalSearch { source })?;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ToolError::EmptyExternalResponse);
        }

        let entries = parse_resolved_lines(&text);
        let retired = entries
            .iter()
            .filter(|e| e.description.eq_ignore_ascii_case("DOES NOT EXIST"))
            .count();
        info!("🌐 外部检索返回 {} 条描述 (作废编码 {} 条)", entries.len(), retired);

        Ok(ExternalResolution { text, entries })
    }
}

/// 尽力解析 `CODE - DESCRIPTION` 行，无法解析的行跳过
pub fn parse_resolved_lines(text: &str) -> Vec<CodeDescription> {
    text.lines()
        .filter_map(|line| {
            let (code, description) = line.trim().split_once(" - ")?;
            let code = code.trim().trim_start_matches(['-', '*']).trim();
            let description = description.trim();
            if code.is_empty() || description.is_empty() {
                return None;
            }
            Some(CodeDescription {
                code: code.to_string(),
                description: description.to_string(),
                source: DescriptionSource::External,
            })
        })
        .collect()
}
