//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和命令分发，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 持有配置，进程内只构造一次外部服务客户端
//! - 加载对照表、题目文件、答案键（加载失败是致命的）
//! - 分发 run / baseline / score / lookup 命令
//!
//! ### `batch_processor` - 批量题目处理器
//! - 顺序处理所有题目，按组写入结果日志
//! - 每道题之后固定等待
//! - 输出统计信息
//!
//! ### `baseline` - 基线作答
//! - 不使用工具，每组题目一次请求
//!
//! ## 层次关系
//!
//! ```text
//! app (命令)
//!     ↓
//! batch_processor (处理 Vec<QuestionUnit>)
//!     ↓
//! workflow::QuestionFlow (处理单个 QuestionUnit)
//!     ↓
//! services (能力层：查表 / 检索 / 推理 / 提取 / 写入)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管资源，batch_processor 管批量
//! 2. **向下依赖**：编排层 → workflow → services
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;
pub mod baseline;
pub mod batch_processor;

// 重新导出主要类型
pub use app::{load_exam, App, BaselineOptions, RunOptions};
pub use baseline::BaselineRunner;
pub use batch_processor::{BatchRunner, BatchSummary, DEFAULT_BATCH_SIZE};
