//! 推理循环状态
//!
//! 封装"这道题目前做过哪些工具调用、看到了什么"这一信息

use crate::models::QuestionUnit;
use crate::services::code_classifier::QuestionCodes;
use crate::services::description_enricher::EnrichedBlock;
use crate::services::prompt::{EXTERNAL_SEARCH_TOOL, LOCAL_LOOKUP_TOOL};

/// 推理循环可执行的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// 本地查表
    InvokeLocal { input: String },
    /// 外部检索
    InvokeExternal { input: String },
    /// 终止，`text` 交给答案提取
    Terminate { text: String },
}

impl AgentAction {
    /// 动作对应的工具名，Terminate 没有
    pub fn tool_name(&self) -> Option<&'static str> {
        match self {
            AgentAction::InvokeLocal { .. } => Some(LOCAL_LOOKUP_TOOL.name),
            AgentAction::InvokeExternal { .. } => Some(EXTERNAL_SEARCH_TOOL.name),
            AgentAction::Terminate { .. } => None,
        }
    }
}

/// 这一步由谁发起
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrigin {
    /// 路由策略强制执行
    Policy,
    /// 推理服务请求
    Model,
}

/// 历史中的一步：动作 + 观察结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub origin: StepOrigin,
    pub tool: String,
    pub input: String,
    /// 推理服务本轮的原始输出（策略步骤没有）
    pub log: Option<String>,
    pub observation: String,
}

impl Step {
    fn render(&self) -> String {
        match &self.log {
            Some(log) => format!("Thought: {}\nObservation: {}\n", log, self.observation),
            None => format!(
                "Thought: The routing workflow requires this step.\nAction: {}\nAction Input: {}\nObservation: {}\n",
                self.tool, self.input, self.observation
            ),
        }
    }
}

/// 单题推理循环状态
#[derive(Debug, Clone)]
pub struct AgentState {
    pub question: String,
    pub codes: QuestionCodes,
    pub history: Vec<Step>,
    pub iteration_count: usize,
    /// 最近一次本地查表的完整结果
    pub latest_enrichment: Option<EnrichedBlock>,
    pub local_attempted: bool,
    pub external_attempted: bool,
}

impl AgentState {
    pub fn new(question: &QuestionUnit, codes: QuestionCodes) -> Self {
        Self {
            question: question.prompt_text(),
            codes,
            history: Vec::new(),
            iteration_count: 0,
            latest_enrichment: None,
            local_attempted: false,
            external_attempted: false,
        }
    }

    pub fn record(&mut self, step: Step) {
        self.history.push(step);
    }

    /// 渲染历史，供推理服务续写
    pub fn render_history(&self) -> String {
        self.history.iter().map(Step::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_policy_and_model_steps() {
        let mut state = AgentState::new(&QuestionUnit::new("1", "Which code?"), QuestionCodes::default());
        state.record(Step {
            origin: StepOrigin::Policy,
            tool: LOCAL_LOOKUP_TOOL.name.to_string(),
            input: "41110".to_string(),
            log: None,
            observation: "41110 - Excision".to_string(),
        });
        state.record(Step {
            origin: StepOrigin::Model,
            tool: EXTERNAL_SEARCH_TOOL.name.to_string(),
            input: "41110 - Excision".to_string(),
            log: Some("Need more detail\nAction: web_search_missing_codes\nAction Input: 41110 - Excision".to_string()),
            observation: "declined".to_string(),
        });

        let history = state.render_history();
        assert!(history.starts_with("Thought: The routing workflow requires this step.\nAction: lookup_codes_local\nAction Input: 41110\nObservation: 41110 - Excision\n"));
        assert!(history.ends_with("Action Input: 41110 - Excision\nObservation: declined\n"));
        assert_eq!(state.question, "Question 1:\nWhich code?");
    }

    #[test]
    fn test_tool_names() {
        let local = AgentAction::InvokeLocal { input: String::new() };
        let terminate = AgentAction::Terminate { text: String::new() };
        assert_eq!(local.tool_name(), Some("lookup_codes_local"));
        assert_eq!(terminate.tool_name(), None);
    }
}
