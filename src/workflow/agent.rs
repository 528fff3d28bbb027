//! 推理编排 - 流程层
//!
//! 推理服务与两个工具之间有上限的迭代对话：
//! 每一轮先看路由策略是否强制某个工具调用，没有则询问推理服务；
//! 推理服务请求的工具调用也要经过路由策略裁决。

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::models::{LoopOutcome, QuestionUnit};
use crate::services::code_classifier::CodeClassifier;
use crate::services::description_enricher::DescriptionEnricher;
use crate::services::external_resolver::ExternalResolver;
use crate::services::llm_service::{ReasoningRequest, ReasoningService};
use crate::services::prompt::REASONING_TOOLS;
use crate::workflow::agent_state::{AgentAction, AgentState, Step, StepOrigin};
use crate::workflow::react::{parse_turn, Directive};
use crate::workflow::routing::{Admission, RoutingPolicy};

/// 默认迭代上限
pub const DEFAULT_MAX_ITERATIONS: usize = 6;

/// 推理循环结束时的产出
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    /// 交给答案提取的文本：终止时为最后一轮输出，超限时为全部历史
    pub final_text: String,
    /// 完整推理记录（历史 + 最后一轮输出）
    pub trace: String,
    pub history: Vec<Step>,
    pub iterations: usize,
}

/// 推理编排器
pub struct ReasoningOrchestrator {
    reasoning: Arc<dyn ReasoningService>,
    enricher: DescriptionEnricher,
    resolver: ExternalResolver,
    policy: RoutingPolicy,
    classifier: CodeClassifier,
    max_iterations: usize,
}

impl ReasoningOrchestrator {
    pub fn new(
        reasoning: Arc<dyn ReasoningService>,
        enricher: DescriptionEnricher,
        resolver: ExternalResolver,
        policy: RoutingPolicy,
    ) -> Self {
        Self {
            reasoning,
            enricher,
            resolver,
            policy,
            classifier: CodeClassifier::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// 运行推理循环
    ///
    /// 只有推理服务本身调用失败时返回错误；工具失败会变成观察结果
    pub async fn run(&self, question: &QuestionUnit) -> Result<LoopReport> {
        let codes = self.classifier.extract(&question.text);
        debug!(
            "{} 操作编码: {:?}, 诊断编码: {:?}",
            question, codes.procedural, codes.diagnostic
        );
        let mut state = AgentState::new(question, codes);

        while state.iteration_count < self.max_iterations {
            state.iteration_count += 1;

            if let Some(action) = self.policy.plan_next(&state) {
                debug!("{} 第 {} 轮: 路由策略强制执行 {:?}", question, state.iteration_count, action.tool_name());
                // 策略只会强制工具调用
                self.execute(action, StepOrigin::Policy, None, &mut state).await;
                continue;
            }

            let history = state.render_history();
            let request = ReasoningRequest {
                question: &state.question,
                tools: &REASONING_TOOLS,
                history: &history,
            };
            let output = self.reasoning.next_turn(&request).await?;

            let (action, log) = match parse_turn(&output) {
                Directive::Final { text } => (AgentAction::Terminate { text }, None),
                Directive::Tool { name, input, log } => match self.policy.admit(&name, &input, &state) {
                    Admission::Run(action) => (action, Some(log)),
                    Admission::Decline(reason) => {
                        debug!("{} 工具请求 {} 被路由策略拒绝", question, name);
                        state.record(Step {
                            origin: StepOrigin::Model,
                            tool: name,
                            input,
                            log: Some(log),
                            observation: reason,
                        });
                        continue;
                    }
                },
                Directive::Malformed { log, reason } => {
                    warn!("{} ⚠️ 推理输出格式不合法: {}", question, reason);
                    state.record(Step {
                        origin: StepOrigin::Model,
                        tool: "_Exception".to_string(),
                        input: String::new(),
                        log: Some(log),
                        observation: format!("Invalid Format: {}", reason),
                    });
                    continue;
                }
            };

            if let Some(text) = self.execute(action, StepOrigin::Model, log, &mut state).await {
                info!("{} ✓ 推理在第 {} 轮给出最终答案", question, state.iteration_count);
                let trace = format!("{}Thought: {}", history, text);
                return Ok(LoopReport {
                    outcome: LoopOutcome::Terminated,
                    final_text: text,
                    trace,
                    history: state.history,
                    iterations: state.iteration_count,
                });
            }
        }

        warn!(
            "{} ⚠️ 达到迭代上限 {} 仍未给出最终答案，使用已有历史提取",
            question, self.max_iterations
        );
        let trace = state.render_history();
        Ok(LoopReport {
            outcome: LoopOutcome::Exhausted,
            final_text: trace.clone(),
            trace,
            history: state.history,
            iterations: state.iteration_count,
        })
    }

    /// 执行一个动作
    ///
    /// 终止动作返回最终文本，不进入历史；工具动作记录一步历史，失败转为观察结果
    async fn execute(
        &self,
        action: AgentAction,
        origin: StepOrigin,
        log: Option<String>,
        state: &mut AgentState,
    ) -> Option<String> {
        let tool = action.tool_name().unwrap_or_default().to_string();
        let (input, observation) = match action {
            AgentAction::InvokeLocal { input } => {
                state.local_attempted = true;
                let observation = match self.lookup_local(&input, state) {
                    Ok(text) => text,
                    Err(e) => e.to_string(),
                };
                (input, observation)
            }
            AgentAction::InvokeExternal { input } => {
                state.external_attempted = true;
                let observation = match self.resolver.resolve(&input).await {
                    Ok(resolution) => resolution.text,
                    Err(e) => {
                        warn!("⚠️ 外部检索失败: {}", e);
                        e.to_string()
                    }
                };
                (input, observation)
            }
            AgentAction::Terminate { text } => return Some(text),
        };

        state.record(Step {
            origin,
            tool,
            input,
            log,
            observation,
        });
        None
    }

    fn lookup_local(&self, input: &str, state: &mut AgentState) -> Result<String, ToolError> {
        let block = self.enricher.enrich(input);
        if block.is_empty() {
            return Err(ToolError::LocalLookup {
                message: "no valid CPT/HCPCS codes in input (expected one code per line)".to_string(),
            });
        }
        debug!("本地查表: {} 个编码, {} 个缺失描述", block.entries.len(), block.missing_count());
        let text = block.to_string();
        state.latest_enrichment = Some(block);
        Ok(text)
    }
}
