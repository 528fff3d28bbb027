//! # Medcode Agent
//!
//! 回答医疗编码（CPT / HCPCS / ICD-10）单选题的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `QuestionParser` - 拆分题目文件
//! - `CodeClassifier` - 识别操作编码 / 诊断编码
//! - `LocalLookupTable` / `DescriptionEnricher` - 本地查表
//! - `ExternalResolver` - 外部检索补全描述
//! - `LlmService` - 推理 / 检索 / 基线作答模型调用
//! - `AnswerExtractor` - 从自由文本中提取答案字母
//! - `ResultWriter` / `Scorer` - 结果日志写入与评分
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `ReasoningOrchestrator` - 有上限的推理循环
//! - `RoutingPolicy` - 查表 / 检索的路由与升级策略
//! - `QuestionFlow` - 推理 → 提取答案 → 结果
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/app` - 命令分发与资源加载
//! - `orchestrator/batch_processor` - 顺序批处理，分组写入
//! - `orchestrator/baseline` - 不使用工具的基线作答
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Answer, AnswerKey, QuestionUnit, ResolutionResult};
pub use orchestrator::{App, BaselineOptions, BatchRunner, BatchSummary, RunOptions};
pub use workflow::{QuestionFlow, ReasoningOrchestrator};
