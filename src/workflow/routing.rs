//! 路由策略
//!
//! 决定推理循环中何时查本地表、何时升级到外部检索。
//! 1. 含诊断编码（带小数点）：跳过本地表，直接外部检索
//! 2. 含操作编码：总是先查本地表
//! 3. 只有描述全部近似重复，或缺失描述达到阈值时才升级到外部检索
//! 4. 升级时转发本地查表的完整输出（已找到和未找到的行都要）

use std::collections::HashSet;

use crate::models::CodeDescription;
use crate::services::description_enricher::EnrichedBlock;
use crate::services::prompt::{EXTERNAL_SEARCH_TOOL, LOCAL_LOOKUP_TOOL, REASONING_TOOLS};
use crate::workflow::agent_state::{AgentAction, AgentState};

/// 升级原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    /// 缺失描述的编码数量
    MissingDescriptions(usize),
    /// 已有描述彼此近似重复，无法区分选项
    NearDuplicateDescriptions,
}

/// 升级策略参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationPolicy {
    /// 缺失描述达到该数量时升级
    pub missing_threshold: usize,
    /// 两条描述的词集 Jaccard 相似度达到该值视为近似重复
    pub similarity_threshold: f64,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            missing_threshold: 3,
            similarity_threshold: 0.5,
        }
    }
}

impl EscalationPolicy {
    /// 判断本地查表结果是否需要升级到外部检索
    pub fn should_escalate(&self, entries: &[CodeDescription]) -> Option<EscalationReason> {
        if entries.is_empty() {
            return None;
        }

        let resolved: Vec<&CodeDescription> = entries.iter().filter(|e| e.is_resolved()).collect();
        let missing = entries.len() - resolved.len();

        if missing >= self.missing_threshold || resolved.is_empty() {
            return Some(EscalationReason::MissingDescriptions(missing));
        }

        let all_similar = resolved.len() >= 2
            && resolved.iter().enumerate().all(|(i, a)| {
                resolved[i + 1..].iter().all(|b| {
                    description_similarity(&a.description, &b.description) >= self.similarity_threshold
                })
            });
        if all_similar {
            return Some(EscalationReason::NearDuplicateDescriptions);
        }

        None
    }
}

/// 两条描述的词集 Jaccard 相似度（忽略大小写和标点）
pub fn description_similarity(a: &str, b: &str) -> f64 {
    let tokens = |s: &str| -> HashSet<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    };
    let (a, b) = (tokens(a), tokens(b));
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

/// 推理服务请求工具调用后的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// 执行该动作（输入可能已被替换）
    Run(AgentAction),
    /// 拒绝，原因作为观察结果返回给推理服务
    Decline(String),
}

/// 路由策略
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingPolicy {
    pub escalation: EscalationPolicy,
}

impl RoutingPolicy {
    pub fn new(escalation: EscalationPolicy) -> Self {
        Self { escalation }
    }

    /// 策略强制的下一步；返回 None 时由推理服务决定
    pub fn plan_next(&self, state: &AgentState) -> Option<AgentAction> {
        if state.codes.has_diagnostic() && !state.external_attempted {
            return Some(AgentAction::InvokeExternal {
                input: state.codes.diagnostic.join("\n"),
            });
        }

        if state.codes.has_procedural() && !state.local_attempted {
            return Some(AgentAction::InvokeLocal {
                input: state.codes.procedural.join("\n"),
            });
        }

        let block = state.latest_enrichment.as_ref()?;
        if !state.external_attempted && self.escalation.should_escalate(&block.entries).is_some() {
            return Some(AgentAction::InvokeExternal {
                input: block.to_string(),
            });
        }

        None
    }

    /// 裁决推理服务请求的工具调用
    pub fn admit(&self, tool: &str, input: &str, state: &AgentState) -> Admission {
        if tool == LOCAL_LOOKUP_TOOL.name {
            return self.admit_local(input, state);
        }
        if tool == EXTERNAL_SEARCH_TOOL.name {
            return self.admit_external(input, state);
        }

        let names: Vec<&str> = REASONING_TOOLS.iter().map(|t| t.name).collect();
        Admission::Decline(format!(
            "{} is not a valid tool, try one of [{}].",
            tool,
            names.join(", ")
        ))
    }

    fn admit_local(&self, input: &str, state: &AgentState) -> Admission {
        let only_diagnostic = state.codes.has_diagnostic() && !state.codes.has_procedural();
        if only_diagnostic {
            return Admission::Decline(format!(
                "ICD-10 codes are not in the local table. Use {} for them or answer from the observations above.",
                EXTERNAL_SEARCH_TOOL.name
            ));
        }
        Admission::Run(AgentAction::InvokeLocal {
            input: input.to_string(),
        })
    }

    fn admit_external(&self, input: &str, state: &AgentState) -> Admission {
        if state.external_attempted {
            return Admission::Decline(
                "The search has already been performed for this question. Answer from the observations above."
                    .to_string(),
            );
        }

        if state.codes.has_diagnostic() {
            let input = if input.trim().is_empty() {
                state.codes.diagnostic.join("\n")
            } else {
                input.to_string()
            };
            return Admission::Run(AgentAction::InvokeExternal { input });
        }

        match &state.latest_enrichment {
            Some(block) => self.admit_escalation(block),
            None if state.codes.has_procedural() => Admission::Decline(format!(
                "Look the codes up with {} before searching.",
                LOCAL_LOOKUP_TOOL.name
            )),
            None => Admission::Run(AgentAction::InvokeExternal {
                input: input.to_string(),
            }),
        }
    }

    fn admit_escalation(&self, block: &EnrichedBlock) -> Admission {
        match self.escalation.should_escalate(&block.entries) {
            // 无论模型传了什么，都转发完整的本地查表结果
            Some(_) => Admission::Run(AgentAction::InvokeExternal {
                input: block.to_string(),
            }),
            None => Admission::Decline(format!(
                "Search declined: {} of {} codes lack a local description and the available descriptions differ. Work with the descriptions you have; prefer the options that have one.",
                block.missing_count(),
                block.entries.len()
            )),
        }
    }
}
