//! LLM 服务 - 业务能力层
//!
//! 只负责"调用模型"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（Anthropic 的兼容端点、带联网检索的 search-preview 模型等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::services::external_resolver::KnowledgeRetriever;
use crate::services::prompt;

/// 推理服务可用的工具说明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// 一轮推理请求
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRequest<'a> {
    /// 题目上下文
    pub question: &'a str,
    /// 可用工具
    pub tools: &'a [ToolSpec],
    /// 已渲染的历史（Thought/Action/Observation）
    pub history: &'a str,
}

/// 推理服务
///
/// 每次调用对应推理循环中的一轮，返回自由文本：要么是工具调用指令，要么是终止决定
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn next_turn(&self, request: &ReasoningRequest<'_>) -> Result<String>;
}

/// 不带工具的单次问答（基线作答使用）
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system_message: &str, user_message: &str) -> Result<String>;
}

/// LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    /// 部分检索模型不接受 temperature 参数，此时为 None
    temperature: Option<f32>,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(api_key: &str, api_base_url: &str, model_name: &str) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.to_string(),
            temperature: Some(0.0),
            max_tokens: 2048,
        }
    }

    /// 不发送 temperature 参数
    pub fn without_temperature(mut self) -> Self {
        self.temperature = None;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(messages)
            .max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder.build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ReasoningService for LlmService {
    async fn next_turn(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        let system_message = prompt::reasoning_system_prompt(request.tools);
        let user_message = prompt::reasoning_turn_prompt(request);
        self.send_to_llm(&user_message, Some(&system_message)).await
    }
}

#[async_trait]
impl CompletionService for LlmService {
    async fn complete(&self, system_message: &str, user_message: &str) -> Result<String> {
        self.send_to_llm(user_message, Some(system_message)).await
    }
}

#[async_trait]
impl KnowledgeRetriever for LlmService {
    async fn retrieve(&self, prompt: &str) -> Result<String> {
        self.send_to_llm(prompt, None).await
    }
}
