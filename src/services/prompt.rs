//! 提示词模板
//!
//! 推理服务、外部检索、基线作答三处用到的提示词都集中在这里

use crate::models::QuestionUnit;
use crate::services::llm_service::{ReasoningRequest, ToolSpec};

/// 终止标记，推理服务在给出最终答案时使用
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// 本地查表工具
pub const LOCAL_LOOKUP_TOOL: ToolSpec = ToolSpec {
    name: "lookup_codes_local",
    description: "Look up CPT/HCPCS code descriptions in the local fee schedule table. Input: one code per line.",
};

/// 外部检索工具
pub const EXTERNAL_SEARCH_TOOL: ToolSpec = ToolSpec {
    name: "web_search_missing_codes",
    description: "Search authoritative sources for codes whose local descriptions are missing, identical or unclear. Input: the complete `CODE - DESCRIPTION` lines from lookup_codes_local, or ICD-10 codes one per line.",
};

/// 推理循环中可用的全部工具
pub const REASONING_TOOLS: [ToolSpec; 2] = [LOCAL_LOOKUP_TOOL, EXTERNAL_SEARCH_TOOL];

/// 推理服务的系统提示词
pub fn reasoning_system_prompt(tools: &[ToolSpec]) -> String {
    let tool_lines = tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools.iter().map(|tool| tool.name).collect::<Vec<_>>().join(", ");

    format!(
        r#"You are an expert medical coding assistant. Each question asks you to pick the correct CPT, HCPCS or ICD-10 code from four options labelled A-D.

Available tools:
{tool_lines}

Workflow rules:
1. ICD-10 codes contain a period (for example M17.0). They are never in the local table; search for them.
2. CPT/HCPCS codes (five digits, or one letter followed by four digits) are always looked up locally first.
3. Search only when the local descriptions are identical or nearly identical for every option, or when three or more options have no local description. One or two missing descriptions are not a reason to search: prefer the options that do have descriptions.
4. When you search after a local lookup, pass the COMPLETE lookup output, found and missing lines alike.
5. If no option matches the procedure exactly, say so and still choose the closest option.

Use exactly this format:
Thought: your analysis
Action: one of [{tool_names}]
Action Input: the tool input
Observation: the tool result (provided to you, never write it yourself)
... (Thought/Action/Action Input/Observation may repeat)
Thought: I now know the final answer
{FINAL_ANSWER_MARKER} a single letter A, B, C or D and nothing else"#
    )
}

/// 推理服务每轮的用户消息：题目 + 已有历史，以 "Thought:" 结尾让模型续写
pub fn reasoning_turn_prompt(request: &ReasoningRequest<'_>) -> String {
    let mut prompt = format!("Question: {}\n", request.question.trim());
    let history = request.history.trim();
    if !history.is_empty() {
        prompt.push_str(history);
        prompt.push('\n');
    }
    prompt.push_str("Thought:");
    prompt
}

/// 外部检索的提示词：保留合格描述，替换缺失/笼统描述，作废编码标记 DOES NOT EXIST，行数和顺序不变
pub fn external_search_prompt(code_lines: &str) -> String {
    format!(
        r#"Below are medical codes paired with descriptions from a local lookup table:

{code_lines}

For every line:
1. If the description is specific and adequate, keep it exactly as it is.
2. If it is missing ("Description Not Found"), generic, unclear, or identical to the other lines, look up the official description and use it instead.
3. If the code has been deleted, retired or never existed, use the description DOES NOT EXIST.

Return exactly the same number of lines, in the same order, each formatted as:
CODE - DESCRIPTION

Example:
23454 - Excision of cyst

Return only those lines and nothing else."#
    )
}

/// 基线作答（不使用工具）的系统提示词
pub const BASELINE_INSTRUCTIONS: &str = "You are a highly knowledgeable medical coding assistant. You will be given multiple-choice questions about CPT, ICD-10 and HCPCS coding. Select the most accurate code for each question. Answer ONLY with the question number, a period, a space and the letter (A, B, C or D), one question per line.";

/// 基线作答的用户提示词：一组题目，空行分隔
pub fn baseline_prompt(questions: &[QuestionUnit]) -> String {
    questions
        .iter()
        .map(QuestionUnit::prompt_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_tools_and_marker() {
        let prompt = reasoning_system_prompt(&REASONING_TOOLS);
        assert!(prompt.contains("- lookup_codes_local:"));
        assert!(prompt.contains("[lookup_codes_local, web_search_missing_codes]"));
        assert!(prompt.contains(FINAL_ANSWER_MARKER));
    }

    #[test]
    fn test_turn_prompt_ends_with_thought() {
        let request = ReasoningRequest {
            question: "Question 1:\nWhich code?",
            tools: &REASONING_TOOLS,
            history: "Action: lookup_codes_local\nAction Input: 41110\nObservation: 41110 - Excision\n",
        };
        let prompt = reasoning_turn_prompt(&request);
        assert!(prompt.starts_with("Question: Question 1:\nWhich code?\nAction: lookup_codes_local"));
        assert!(prompt.ends_with("Observation: 41110 - Excision\nThought:"));
    }

    #[test]
    fn test_external_prompt_embeds_lines() {
        let prompt = external_search_prompt("41110 - Description Not Found\n41105 - Biopsy");
        assert!(prompt.contains("41110 - Description Not Found\n41105 - Biopsy"));
        assert!(prompt.contains("DOES NOT EXIST"));
    }

    #[test]
    fn test_baseline_prompt_groups_questions() {
        let questions = vec![
            QuestionUnit::new("1", "A) 41110 B) 41105"),
            QuestionUnit::new("2", "A) M17.0 B) M17.1"),
        ];
        assert_eq!(
            baseline_prompt(&questions),
            "Question 1:\nA) 41110 B) 41105\n\nQuestion 2:\nA) M17.0 B) M17.1"
        );
    }
}
