//! 流程层（Workflow Layer）
//!
//! 定义"一道题"的完整处理流程：
//!
//! ```text
//! QuestionFlow (一道题: 推理 → 提取答案)
//!     ↓
//! ReasoningOrchestrator (有上限的推理循环)
//!     ├── RoutingPolicy (何时查表、何时检索)
//!     ├── react::parse_turn (解析推理服务输出)
//!     └── AgentState (历史与标记)
//! ```

pub mod agent;
pub mod agent_state;
pub mod question_flow;
pub mod react;
pub mod routing;

pub use agent::{LoopReport, ReasoningOrchestrator};
pub use agent_state::{AgentAction, AgentState, Step, StepOrigin};
pub use question_flow::QuestionFlow;
pub use routing::{Admission, EscalationPolicy, EscalationReason, RoutingPolicy};
